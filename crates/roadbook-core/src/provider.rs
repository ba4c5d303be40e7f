//! The pluggable routing-provider contract.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{Itinerary, Route, TransitMode};

/// Failure surfaced by a routing provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Structured failure; the message is shown to the user verbatim
    #[error("{0}")]
    Provider(String),
    /// Unstructured transport failure
    #[error("a network error occurs when calling the provider")]
    Network,
    /// The provider did not answer within the configured timeout
    #[error("the routing request timed out")]
    Timeout,
}

/// An external routing provider.
///
/// On success the provider returns a complete itinerary: polyline points
/// (with elevation when it has any) and turn maneuvers anchored to point
/// ids. Per-point distances, maneuver distances and route totals are rebuilt
/// by the router afterwards, so providers need not fill them in.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Name under which the provider is registered and referenced by
    /// `Itinerary::provider`.
    fn name(&self) -> &str;

    fn supports(&self, transit_mode: TransitMode) -> bool;

    async fn compute_itinerary(&self, route: &Route) -> Result<Itinerary, ProviderError>;
}

/// Name → provider map the router resolves `itinerary.provider` against.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Arc<DashMap<String, Arc<dyn RouteProvider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, provider: Arc<dyn RouteProvider>) {
        self.providers
            .insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RouteProvider>> {
        self.providers.get(name).map(|entry| entry.value().clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}
