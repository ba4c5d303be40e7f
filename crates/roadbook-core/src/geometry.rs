//! Geometry queries over a route's itinerary polyline: closest-point
//! projection with along-route distance, point-at-distance interpolation and
//! bounds computation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{ItineraryPoint, Route};
use crate::spatial::{closest_point_on_segment, haversine_distance, Projection};

/// Result of a closest-point query: the nearest point of the polyline and
/// its along-route distance in meters. Created fresh per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngDistance {
    pub lat: f64,
    pub lng: f64,
    pub distance: f64,
}

/// Result of a point-at-distance query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngElevOnRoute {
    pub lat: f64,
    pub lng: f64,
    pub distance: f64,
    pub elev: f64,
    /// Instantaneous grade at the query point, in percent
    pub ascent_percent: f64,
}

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    fn around(lat: f64, lng: f64) -> Self {
        Self {
            min_lat: lat,
            min_lng: lng,
            max_lat: lat,
            max_lng: lng,
        }
    }

    fn extend(&mut self, lat: f64, lng: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.min_lng = self.min_lng.min(lng);
        self.max_lat = self.max_lat.max(lat);
        self.max_lng = self.max_lng.max(lng);
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Stateless geometry engine. Holds the projection supplied by the host map.
#[derive(Clone)]
pub struct Geometry {
    projection: Arc<dyn Projection>,
}

impl Geometry {
    pub fn new(projection: Arc<dyn Projection>) -> Self {
        Self { projection }
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    /// Nearest point of the route polyline to `(lat, lng)`, with its
    /// along-route distance. `None` when the route has no itinerary points.
    pub fn closest_latlng_distance(
        &self,
        route: &Route,
        lat: f64,
        lng: f64,
    ) -> Option<LatLngDistance> {
        self.closest_on_points(&route.itinerary.itinerary_points, lat, lng)
    }

    /// Slice-level variant of [`Self::closest_latlng_distance`], used while
    /// snapping against a candidate itinerary not yet installed on a route.
    pub(crate) fn closest_on_points(
        &self,
        points: &[ItineraryPoint],
        lat: f64,
        lng: f64,
    ) -> Option<LatLngDistance> {
        let first = points.first()?;
        if points.len() == 1 {
            return Some(LatLngDistance {
                lat: first.lat,
                lng: first.lng,
                distance: 0.0,
            });
        }

        let target = self.projection.project(lat, lng);
        let mut previous = first;
        let mut previous_projected = self.projection.project(previous.lat, previous.lng);
        // Distance from the route start to the end of the current segment
        let mut distance_at_segment_end = 0.0;
        let mut best: Option<(f64, LatLngDistance)> = None;

        for current in &points[1..] {
            let current_projected = self.projection.project(current.lat, current.lng);
            distance_at_segment_end += previous.distance;

            let (closest_projected, planar_distance) =
                closest_point_on_segment(target, previous_projected, current_projected);
            let improves = match &best {
                Some((min_planar, _)) => planar_distance < *min_planar,
                None => true,
            };
            if improves {
                let (closest_lat, closest_lng) = self.projection.unproject(closest_projected);
                let along = distance_at_segment_end
                    - haversine_distance(closest_lat, closest_lng, current.lat, current.lng);
                best = Some((
                    planar_distance,
                    LatLngDistance {
                        lat: closest_lat,
                        lng: closest_lng,
                        distance: along,
                    },
                ));
            }

            previous = current;
            previous_projected = current_projected;
        }

        best.map(|(_, result)| result)
    }

    /// Point, elevation and grade at `distance` meters from the route start.
    /// `None` unless `0 < distance < route.distance`.
    pub fn latlng_elev_at_distance(
        &self,
        route: &Route,
        distance: f64,
    ) -> Option<LatLngElevOnRoute> {
        at_distance_on_points(&route.itinerary.itinerary_points, route.distance, distance)
    }

    /// Bounding box over the route's itinerary points, way points and notes.
    /// `None` when the route has no located content.
    pub fn route_bounds(&self, route: &Route) -> Option<BoundingBox> {
        let mut bounds: Option<BoundingBox> = None;
        let mut add = |lat: f64, lng: f64| match &mut bounds {
            Some(bounds) => bounds.extend(lat, lng),
            None => bounds = Some(BoundingBox::around(lat, lng)),
        };

        for point in &route.itinerary.itinerary_points {
            add(point.lat, point.lng);
        }
        for way_point in route.way_points.iter().filter(|wp| wp.has_position()) {
            add(way_point.lat, way_point.lng);
        }
        for note in &route.notes {
            add(note.lat, note.lng);
        }
        bounds
    }
}

fn at_distance_on_points(
    points: &[ItineraryPoint],
    total_distance: f64,
    distance: f64,
) -> Option<LatLngElevOnRoute> {
    if !(distance > 0.0 && distance < total_distance) {
        return None;
    }
    if points.len() < 2 {
        return None;
    }

    // Walk the points accumulating distance-to-next until the running total
    // reaches the request
    let mut accumulated = 0.0;
    let mut index = None;
    for (i, point) in points[..points.len() - 1].iter().enumerate() {
        accumulated += point.distance;
        if accumulated >= distance {
            index = Some(i);
            break;
        }
    }
    let index = index?;

    let previous = &points[index];
    let current = &points[index + 1];

    // Duplicate consecutive points: report the duplicated position flat
    if previous.distance <= f64::EPSILON {
        return Some(LatLngElevOnRoute {
            lat: previous.lat,
            lng: previous.lng,
            distance,
            elev: previous.elev,
            ascent_percent: 0.0,
        });
    }

    let scale = (previous.distance - accumulated + distance) / previous.distance;
    Some(LatLngElevOnRoute {
        lat: previous.lat + (current.lat - previous.lat) * scale,
        lng: previous.lng + (current.lng - previous.lng) * scale,
        distance,
        elev: previous.elev + (current.elev - previous.elev) * scale,
        ascent_percent: 100.0 * (current.elev - previous.elev) / previous.distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Note, TransitMode, WayPoint};
    use crate::spatial::{SphericalMercator, EARTH_RADIUS_M};
    use std::f64::consts::PI;

    fn geometry() -> Geometry {
        Geometry::new(Arc::new(SphericalMercator))
    }

    /// Degrees of latitude spanning exactly `meters` great-circle meters.
    fn lat_span(meters: f64) -> f64 {
        meters * 180.0 / (PI * EARTH_RADIUS_M)
    }

    /// A due-north route made of segments of the given lengths, starting at
    /// (0, 0), with per-point distances filled in.
    fn northbound_route(segment_lengths: &[f64]) -> Route {
        let mut route = Route::new("osrm", TransitMode::Car);
        let mut lat = 0.0;
        for (i, length) in segment_lengths.iter().enumerate() {
            let mut point = ItineraryPoint::new(lat, 0.0);
            point.distance = *length;
            point.elev = 10.0 * i as f64;
            route.itinerary.itinerary_points.push(point);
            lat += lat_span(*length);
            route.distance += *length;
        }
        let mut last = ItineraryPoint::new(lat, 0.0);
        last.elev = 10.0 * segment_lengths.len() as f64;
        route.itinerary.itinerary_points.push(last);
        route
    }

    #[test]
    fn closest_point_on_empty_route_is_none() {
        let route = Route::new("osrm", TransitMode::Car);
        assert!(geometry()
            .closest_latlng_distance(&route, 1.0, 1.0)
            .is_none());
    }

    #[test]
    fn closest_point_at_segment_midpoint() {
        let route = northbound_route(&[1000.0]);
        let midpoint_lat = lat_span(500.0);

        let closest = geometry()
            .closest_latlng_distance(&route, midpoint_lat, 0.0)
            .unwrap();
        assert!((closest.distance - 500.0).abs() < 1.0);
        assert!((closest.lat - midpoint_lat).abs() < 1e-6);
        assert!(closest.lng.abs() < 1e-9);
    }

    #[test]
    fn closest_point_projects_offset_targets_onto_the_polyline() {
        let route = northbound_route(&[1000.0, 1000.0]);
        let target_lat = lat_span(1500.0);

        // Target sits east of the polyline; the projection lands back on it
        let closest = geometry()
            .closest_latlng_distance(&route, target_lat, 0.01)
            .unwrap();
        assert!(closest.lng.abs() < 1e-9);
        assert!((closest.distance - 1500.0).abs() < 2.0);
    }

    #[test]
    fn first_minimal_segment_wins_ties() {
        // An out-and-back polyline: both halves overlap, the query point is
        // equally close to segment 0 and segment 1
        let mut route = Route::new("osrm", TransitMode::Car);
        let top = lat_span(1000.0);
        let mut p0 = ItineraryPoint::new(0.0, 0.0);
        p0.distance = 1000.0;
        let mut p1 = ItineraryPoint::new(top, 0.0);
        p1.distance = 1000.0;
        let p2 = ItineraryPoint::new(0.0, 0.0);
        route.itinerary.itinerary_points = vec![p0, p1, p2];
        route.distance = 2000.0;

        let closest = geometry()
            .closest_latlng_distance(&route, lat_span(250.0), 0.0)
            .unwrap();
        assert!((closest.distance - 250.0).abs() < 1.0);
    }

    #[test]
    fn at_distance_rejects_boundaries() {
        let route = northbound_route(&[1000.0, 500.0]);
        let geometry = geometry();
        assert!(geometry.latlng_elev_at_distance(&route, 0.0).is_none());
        assert!(geometry.latlng_elev_at_distance(&route, -5.0).is_none());
        assert!(geometry
            .latlng_elev_at_distance(&route, route.distance)
            .is_none());
        assert!(geometry
            .latlng_elev_at_distance(&route, route.distance + 1.0)
            .is_none());
    }

    #[test]
    fn at_distance_interpolates_position_and_elevation() {
        let route = northbound_route(&[1000.0]);
        let result = geometry()
            .latlng_elev_at_distance(&route, 250.0)
            .unwrap();
        assert!((result.lat - lat_span(250.0)).abs() < 1e-9);
        assert!((result.elev - 2.5).abs() < 1e-9);
        // 10m climb over 1000m
        assert!((result.ascent_percent - 1.0).abs() < 1e-9);
    }

    #[test]
    fn at_distance_is_monotonic_along_the_route() {
        let route = northbound_route(&[400.0, 600.0, 1000.0]);
        let geometry = geometry();
        let mut last_lat = f64::NEG_INFINITY;
        for distance in [50.0, 350.0, 420.0, 980.0, 1100.0, 1900.0] {
            let result = geometry.latlng_elev_at_distance(&route, distance).unwrap();
            assert!(
                result.lat > last_lat,
                "position went backwards at {distance}"
            );
            last_lat = result.lat;
        }
    }

    #[test]
    fn at_distance_with_inconsistent_totals_is_none() {
        // Declared total longer than the per-point distances can cover
        let mut route = northbound_route(&[100.0]);
        route.distance = 500.0;
        assert!(geometry().latlng_elev_at_distance(&route, 400.0).is_none());
    }

    #[test]
    fn route_bounds_cover_points_way_points_and_notes() {
        let mut route = northbound_route(&[1000.0]);
        route.way_points.push(WayPoint::new(-0.001, 0.002));
        route.way_points.push(WayPoint::new(0.0, 0.0)); // placeholder, ignored
        let mut note = Note::new(0.005, -0.003);
        note.tooltip = "viewpoint".to_string();
        route.notes.push(note);

        let bounds = geometry().route_bounds(&route).unwrap();
        assert!((bounds.min_lat - -0.001).abs() < 1e-12);
        assert!((bounds.min_lng - -0.003).abs() < 1e-12);
        assert!((bounds.max_lng - 0.002).abs() < 1e-12);
        assert!(bounds.max_lat >= lat_span(1000.0) - 1e-12);
    }

    #[test]
    fn empty_route_has_no_bounds() {
        let route = Route::new("osrm", TransitMode::Car);
        assert!(geometry().route_bounds(&route).is_none());
    }

    #[test]
    fn single_point_polyline_projects_to_that_point() {
        let mut route = Route::new("osrm", TransitMode::Car);
        route
            .itinerary
            .itinerary_points
            .push(ItineraryPoint::new(1.0, 2.0));
        let closest = geometry()
            .closest_latlng_distance(&route, 5.0, 5.0)
            .unwrap();
        assert_eq!(closest.lat, 1.0);
        assert_eq!(closest.lng, 2.0);
        assert_eq!(closest.distance, 0.0);
    }

    #[test]
    fn bounding_box_center() {
        let bounds = BoundingBox {
            min_lat: 10.0,
            min_lng: 20.0,
            max_lat: 12.0,
            max_lng: 26.0,
        };
        assert_eq!(bounds.center(), (11.0, 23.0));
    }
}
