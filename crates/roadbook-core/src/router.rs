//! Single-flight route computation and re-derivation.
//!
//! The router asks the provider named by the edited route's itinerary for a
//! fresh polyline, rebuilds distances, durations and maneuver legs from it,
//! re-snaps way points and notes, and notifies the rendering collaborators.
//! At most one routing request is in flight at a time; overlapping calls are
//! dropped silently.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::events::{ErrorReporter, RouteEvent, TracingErrorReporter};
use crate::geometry::Geometry;
use crate::models::{Itinerary, Note, Route, WayPoint};
use crate::profile;
use crate::provider::{ProviderError, ProviderRegistry};
use crate::spatial::haversine_distance;

/// Router tuning.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Provider calls are abandoned after this long
    pub provider_timeout: Duration,
    /// Capacity of the route-event broadcast channel
    pub event_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(30),
            event_capacity: 64,
        }
    }
}

/// Totals produced by the distance/duration recompute.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct RouteTotals {
    distance: f64,
    duration: f64,
}

/// Orchestrates routing requests for the edited route. One instance per
/// application session; cheap to share behind an `Arc`.
pub struct Router {
    geometry: Geometry,
    providers: ProviderRegistry,
    error_reporter: Arc<dyn ErrorReporter>,
    events: broadcast::Sender<RouteEvent>,
    request_in_flight: AtomicBool,
    config: RouterConfig,
}

/// Clears the in-flight latch on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Router {
    pub fn new(geometry: Geometry, providers: ProviderRegistry) -> Self {
        Self::with_config(
            geometry,
            providers,
            Arc::new(TracingErrorReporter),
            RouterConfig::default(),
        )
    }

    pub fn with_config(
        geometry: Geometry,
        providers: ProviderRegistry,
        error_reporter: Arc<dyn ErrorReporter>,
        config: RouterConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            geometry,
            providers,
            error_reporter,
            events,
            request_in_flight: AtomicBool::new(false),
            config,
        }
    }

    /// Subscribe to the update notifications emitted after routing passes.
    pub fn subscribe(&self) -> broadcast::Receiver<RouteEvent> {
        self.events.subscribe()
    }

    /// True while a provider request is outstanding.
    pub fn is_routing(&self) -> bool {
        self.request_in_flight.load(Ordering::Acquire)
    }

    /// Request a route from the provider named by the route's itinerary and
    /// rebuild the route from the response.
    ///
    /// A call while another request is outstanding is dropped silently, as is
    /// a call on a route without usable way points. Provider failures are
    /// reported through the error-display collaborator; `start_routing`
    /// itself never fails.
    pub async fn start_routing(&self, route: &mut Route) {
        if !route.has_valid_way_points() {
            tracing::debug!(route = route.obj_id, "routing skipped: way points not usable");
            return;
        }
        if self
            .request_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(route = route.obj_id, "routing skipped: request in flight");
            return;
        }
        let _guard = InFlightGuard(&self.request_in_flight);

        // Zoom only on first-time routing
        let zoom_after = route.itinerary.itinerary_points.is_empty();

        let provider_name = route.itinerary.provider.clone();
        let Some(provider) = self.providers.get(&provider_name) else {
            self.error_reporter
                .show_error(&format!("no provider named {provider_name} is available"));
            return;
        };
        if !provider.supports(route.itinerary.transit_mode) {
            self.error_reporter.show_error(&format!(
                "provider {provider_name} does not support the {:?} transit mode",
                route.itinerary.transit_mode
            ));
            return;
        }

        tracing::info!(route = route.obj_id, provider = %provider_name, "routing started");
        let response =
            tokio::time::timeout(self.config.provider_timeout, provider.compute_itinerary(route))
                .await;
        let itinerary = match response {
            Ok(Ok(itinerary)) => itinerary,
            Ok(Err(error)) => {
                tracing::warn!(route = route.obj_id, %error, "routing failed");
                self.error_reporter.show_error(&error.to_string());
                return;
            }
            Err(_elapsed) => {
                tracing::warn!(route = route.obj_id, "routing timed out");
                self.error_reporter
                    .show_error(&ProviderError::Timeout.to_string());
                return;
            }
        };

        self.apply_routing_response(route, itinerary, zoom_after);
        tracing::info!(
            route = route.obj_id,
            distance_m = route.distance,
            duration_s = route.duration,
            "routing finished"
        );
    }

    /// Install a provider response on the route: recompute distances,
    /// durations and maneuver legs, snap way points and notes, emit the
    /// update notifications. The candidate is built completely before the
    /// route is touched, so a failure cannot leave it half-updated.
    fn apply_routing_response(&self, route: &mut Route, mut itinerary: Itinerary, zoom_after: bool) {
        let totals = recompute_distances(&mut itinerary);
        if itinerary.has_profile {
            let (ascent, descent) = profile::ascent_descent(&itinerary.itinerary_points);
            itinerary.ascent = ascent;
            itinerary.descent = descent;
        } else {
            itinerary.ascent = 0.0;
            itinerary.descent = 0.0;
        }
        let way_points = self.snap_way_points(&route.way_points, &itinerary);
        let notes = self.snap_notes(&route.notes, &itinerary);

        route.itinerary = itinerary;
        route.distance = totals.distance;
        route.duration = totals.duration;
        route.way_points = way_points;
        route.notes = notes;

        if zoom_after {
            if let Some(bounds) = self.geometry.route_bounds(route) {
                self.emit(RouteEvent::ZoomToRoute { bounds });
            }
        }
        self.emit(RouteEvent::ProfileUpdated {
            route_obj_id: route.obj_id,
        });
        self.emit(RouteEvent::RouteUpdated {
            removed_route_obj_id: route.obj_id,
            added_route_obj_id: route.obj_id,
        });
        self.emit(RouteEvent::RoadbookUpdate);
        self.emit(RouteEvent::ShowItinerary {
            route_obj_id: route.obj_id,
        });
        self.emit(RouteEvent::SetRoutesList);
    }

    /// Pin the first and last way points to the polyline ends and snap the
    /// intermediate ones to their closest point on it. Circle routes keep
    /// the user's positions.
    fn snap_way_points(&self, way_points: &[WayPoint], itinerary: &Itinerary) -> Vec<WayPoint> {
        let mut snapped: Vec<WayPoint> = way_points.to_vec();
        if itinerary.transit_mode.is_circle() {
            return snapped;
        }
        let points = &itinerary.itinerary_points;
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return snapped;
        };
        let last_index = snapped.len().saturating_sub(1);
        for (index, way_point) in snapped.iter_mut().enumerate() {
            if index == 0 {
                way_point.lat = first.lat;
                way_point.lng = first.lng;
            } else if index == last_index {
                way_point.lat = last.lat;
                way_point.lng = last.lng;
            } else if let Some(closest) =
                self.geometry
                    .closest_on_points(points, way_point.lat, way_point.lng)
            {
                way_point.lat = closest.lat;
                way_point.lng = closest.lng;
            }
        }
        snapped
    }

    /// Re-snap every note onto the polyline, updating coordinates and
    /// along-route distance, then sort by distance ascending.
    fn snap_notes(&self, notes: &[Note], itinerary: &Itinerary) -> Vec<Note> {
        let mut snapped: Vec<Note> = notes.to_vec();
        for note in &mut snapped {
            if let Some(closest) =
                self.geometry
                    .closest_on_points(&itinerary.itinerary_points, note.lat, note.lng)
            {
                note.lat = closest.lat;
                note.lng = closest.lng;
                note.distance = closest.distance;
            }
        }
        snapped.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        snapped
    }

    fn emit(&self, event: RouteEvent) {
        // A send without subscribers is not an error
        let _ = self.events.send(event);
    }
}

/// Rebuild per-point distances, maneuver distances and route totals from the
/// raw polyline. Maneuver legs are walked in lockstep with the points: a
/// maneuver's distance is the distance consumed since the previous maneuver,
/// and two maneuvers anchored on the same point are merged by dropping the
/// first and carrying its accumulated distance over to the survivor.
fn recompute_distances(itinerary: &mut Itinerary) -> RouteTotals {
    let mut totals = RouteTotals::default();

    let points = &mut itinerary.itinerary_points;
    let count = points.len();
    for index in 0..count {
        let to_next = if index + 1 < count {
            haversine_distance(
                points[index].lat,
                points[index].lng,
                points[index + 1].lat,
                points[index + 1].lng,
            )
        } else {
            0.0
        };
        points[index].distance = to_next;
    }

    let maneuvers = &mut itinerary.maneuvers;
    if let Some(first) = maneuvers.first_mut() {
        first.distance = 0.0;
    }
    let mut keep = vec![true; maneuvers.len()];
    let mut current = 0usize;

    for index in 0..count {
        let point_obj_id = points[index].obj_id;

        // Close every maneuver anchored on this point
        while current < maneuvers.len()
            && maneuvers[current].itinerary_point_obj_id == point_obj_id
        {
            totals.duration += maneuvers[current].duration;
            let next = current + 1;
            if next < maneuvers.len() {
                if maneuvers[next].itinerary_point_obj_id == point_obj_id {
                    // Zero-length leg: merge into the follower
                    maneuvers[next].distance = maneuvers[current].distance;
                    keep[current] = false;
                } else {
                    maneuvers[next].distance = 0.0;
                }
            }
            current = next;
        }

        let to_next = points[index].distance;
        totals.distance += to_next;
        if current < maneuvers.len() {
            maneuvers[current].distance += to_next;
        }
    }

    let mut keep_flags = keep.into_iter();
    maneuvers.retain(|_| keep_flags.next().unwrap_or(true));

    totals
}
