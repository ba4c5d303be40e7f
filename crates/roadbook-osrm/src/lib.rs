//! OSRM-compatible routing provider for roadbook.
//!
//! Talks to any OSRM `route` service (the public demo server or a
//! self-hosted instance) and translates its responses into the core
//! itinerary model.

pub mod icons;
pub mod polyline;
pub mod provider;

pub use provider::{OsrmProvider, PROVIDER_NAME};
