//! Route geometry, distance reprojection and routing orchestration for trip
//! planning applications.
//!
//! The crate owns the travel/route data model, the geometry engine that
//! projects arbitrary points onto a route polyline, and the single-flight
//! router that drives pluggable routing providers and rebuilds a route from
//! their responses. Rendering, persistence and map widgets are collaborator
//! concerns reached through the event and error-display contracts.

pub mod events;
pub mod geometry;
pub mod models;
pub mod profile;
pub mod provider;
pub mod router;
pub mod spatial;

pub use events::{ErrorReporter, RouteEvent, TracingErrorReporter};
pub use geometry::{BoundingBox, Geometry, LatLngDistance, LatLngElevOnRoute};
pub use models::{
    next_obj_id, EditionStatus, Itinerary, ItineraryPoint, Maneuver, Note, ObjId, Route,
    TransitMode, Travel, WayPoint,
};
pub use profile::{build_profile, ElevationProfile, ProfilePoint};
pub use provider::{ProviderError, ProviderRegistry, RouteProvider};
pub use router::{Router, RouterConfig};
pub use spatial::{haversine_distance, PlanarPoint, Projection, SphericalMercator};
