//! Core data model for travels, routes and their annotations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier for model objects. Maneuvers reference itinerary points by id.
pub type ObjId = u64;

static OBJ_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Allocate the next object identifier.
pub fn next_obj_id() -> ObjId {
    OBJ_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Travel modality for a route. Drives provider selection and snapping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitMode {
    Bike,
    Pedestrian,
    Car,
    Train,
    /// Straight lines between way points, no road network
    Line,
    /// Closed loop around the first way point
    Circle,
}

impl TransitMode {
    /// Circle routes are closed loops; way points keep their user position
    /// instead of being snapped to the polyline.
    pub fn is_circle(&self) -> bool {
        matches!(self, TransitMode::Circle)
    }
}

/// Edition state of a route. Gates hover-preview behaviour in the UI layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditionStatus {
    /// Not currently being edited
    #[default]
    NotEdited,
    /// Being edited, no pending modifications
    Edited,
    /// Being edited with unsaved modifications
    Modified,
}

/// One vertex of the detailed routing polyline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryPoint {
    pub obj_id: ObjId,
    pub lat: f64,
    pub lng: f64,
    /// Elevation in meters. 0 when the provider has no elevation data.
    #[serde(default)]
    pub elev: f64,
    /// Distance to the next itinerary point in meters. 0 for the last point.
    #[serde(default)]
    pub distance: f64,
}

impl ItineraryPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            obj_id: next_obj_id(),
            lat,
            lng,
            elev: 0.0,
            distance: 0.0,
        }
    }

    pub fn with_elev(lat: f64, lng: f64, elev: f64) -> Self {
        Self {
            elev,
            ..Self::new(lat, lng)
        }
    }
}

/// A turn instruction anchored to a specific itinerary point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maneuver {
    pub obj_id: ObjId,
    /// The itinerary point at which the maneuver occurs
    pub itinerary_point_obj_id: ObjId,
    pub icon_name: String,
    pub instruction: String,
    /// Distance consumed since the previous maneuver, in meters
    #[serde(default)]
    pub distance: f64,
    /// Duration of the maneuver leg in seconds
    #[serde(default)]
    pub duration: f64,
}

impl Maneuver {
    pub fn new(
        itinerary_point_obj_id: ObjId,
        icon_name: impl Into<String>,
        instruction: impl Into<String>,
        duration: f64,
    ) -> Self {
        Self {
            obj_id: next_obj_id(),
            itinerary_point_obj_id,
            icon_name: icon_name.into(),
            instruction: instruction.into(),
            distance: 0.0,
            duration,
        }
    }
}

/// The detailed path computed by a routing provider: polyline plus maneuvers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    /// Name of the provider that produced (or will produce) this itinerary
    pub provider: String,
    pub transit_mode: TransitMode,
    pub itinerary_points: Vec<ItineraryPoint>,
    pub maneuvers: Vec<Maneuver>,
    /// Total climb in meters, rebuilt on every routing pass
    #[serde(default)]
    pub ascent: f64,
    /// Total drop in meters, rebuilt on every routing pass
    #[serde(default)]
    pub descent: f64,
    /// True when the provider supplied elevation data
    #[serde(default)]
    pub has_profile: bool,
}

impl Itinerary {
    pub fn new(provider: impl Into<String>, transit_mode: TransitMode) -> Self {
        Self {
            provider: provider.into(),
            transit_mode,
            itinerary_points: Vec::new(),
            maneuvers: Vec::new(),
            ascent: 0.0,
            descent: 0.0,
            has_profile: false,
        }
    }
}

/// A user-placed via point or endpoint the route must pass through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WayPoint {
    pub obj_id: ObjId,
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl WayPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            obj_id: next_obj_id(),
            name: String::new(),
            lat,
            lng,
        }
    }

    pub fn named(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            ..Self::new(lat, lng)
        }
    }

    /// A way point is usable once it has real coordinates. (0, 0) is the
    /// placeholder position of a way point not yet dropped on the map.
    pub fn has_position(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && (self.lat != 0.0 || self.lng != 0.0)
    }
}

/// A point annotation attached to a route, positioned by along-route distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub obj_id: ObjId,
    pub lat: f64,
    pub lng: f64,
    /// Distance from the route start in meters, rebuilt on every routing pass
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub icon_name: String,
    #[serde(default)]
    pub tooltip: String,
}

impl Note {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            obj_id: next_obj_id(),
            lat,
            lng,
            distance: 0.0,
            icon_name: String::new(),
            tooltip: String::new(),
        }
    }
}

/// A planned path: ordered way points, the computed itinerary, attached
/// notes and cumulative totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub obj_id: ObjId,
    #[serde(default)]
    pub name: String,
    pub way_points: Vec<WayPoint>,
    #[serde(default)]
    pub notes: Vec<Note>,
    pub itinerary: Itinerary,
    /// Total route length in meters. Mutated only by the route recompute.
    #[serde(default)]
    pub distance: f64,
    /// Total route duration in seconds. Mutated only by the route recompute.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub edition_status: EditionStatus,
}

impl Route {
    pub fn new(provider: impl Into<String>, transit_mode: TransitMode) -> Self {
        Self {
            obj_id: next_obj_id(),
            name: String::new(),
            way_points: Vec::new(),
            notes: Vec::new(),
            itinerary: Itinerary::new(provider, transit_mode),
            distance: 0.0,
            duration: 0.0,
            edition_status: EditionStatus::default(),
        }
    }

    /// Routing precondition: at least two way points, all of them placed.
    pub fn has_valid_way_points(&self) -> bool {
        self.way_points.len() >= 2 && self.way_points.iter().all(WayPoint::has_position)
    }
}

/// The travel document: the aggregate that owns routes and travel notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Travel {
    pub obj_id: ObjId,
    pub name: String,
    pub routes: Vec<Route>,
    /// Notes attached to the travel itself rather than to a route
    #[serde(default)]
    pub travel_notes: Vec<Note>,
    /// Set when the document is written to disk
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Travel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            obj_id: next_obj_id(),
            name: name.into(),
            routes: Vec::new(),
            travel_notes: Vec::new(),
            saved_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obj_ids_are_unique_and_increasing() {
        let first = next_obj_id();
        let second = next_obj_id();
        assert!(second > first);
    }

    #[test]
    fn way_points_at_origin_are_placeholders() {
        let placed = WayPoint::new(48.85, 2.35);
        let placeholder = WayPoint::new(0.0, 0.0);
        assert!(placed.has_position());
        assert!(!placeholder.has_position());
    }

    #[test]
    fn route_needs_two_placed_way_points() {
        let mut route = Route::new("osrm", TransitMode::Car);
        assert!(!route.has_valid_way_points());

        route.way_points.push(WayPoint::new(48.85, 2.35));
        assert!(!route.has_valid_way_points());

        route.way_points.push(WayPoint::new(0.0, 0.0));
        assert!(!route.has_valid_way_points());

        route.way_points[1].lat = 45.76;
        route.way_points[1].lng = 4.83;
        assert!(route.has_valid_way_points());
    }

    #[test]
    fn travel_document_round_trips_through_json() {
        let mut travel = Travel::new("Summer tour");
        let mut route = Route::new("osrm", TransitMode::Bike);
        route.way_points.push(WayPoint::named("start", 48.85, 2.35));
        route.way_points.push(WayPoint::named("end", 45.76, 4.83));
        route.itinerary.itinerary_points.push(ItineraryPoint::with_elev(48.85, 2.35, 35.0));
        travel.routes.push(route);

        let json = serde_json::to_string(&travel).unwrap();
        let back: Travel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Summer tour");
        assert_eq!(back.routes.len(), 1);
        assert_eq!(back.routes[0].itinerary.transit_mode, TransitMode::Bike);
    }
}
