//! Update notifications emitted after a routing pass, and the error-display
//! contract.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;
use crate::models::ObjId;

/// Notification dispatched to rendering collaborators after a routing pass.
///
/// The router only signals that something changed; how it is rendered is the
/// consumer's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteEvent {
    /// The route's map layers must be torn down and redrawn
    RouteUpdated {
        removed_route_obj_id: ObjId,
        added_route_obj_id: ObjId,
    },
    /// The roadbook must be re-rendered
    RoadbookUpdate,
    /// The itinerary panel must be re-rendered
    ShowItinerary { route_obj_id: ObjId },
    /// The route list must be re-rendered
    SetRoutesList,
    /// The map must zoom to the freshly routed route
    ZoomToRoute { bounds: BoundingBox },
    /// The elevation profile must be rebuilt
    ProfileUpdated { route_obj_id: ObjId },
}

/// Error-display collaborator. Receives a single display-ready message per
/// failure; the router never propagates provider errors past this call.
pub trait ErrorReporter: Send + Sync {
    fn show_error(&self, message: &str);
}

/// Default reporter that logs through tracing.
#[derive(Debug, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn show_error(&self, message: &str) {
        tracing::error!("{message}");
    }
}
