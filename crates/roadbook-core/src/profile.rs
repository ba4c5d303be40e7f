//! Elevation profile derived from a route's itinerary.

use serde::{Deserialize, Serialize};

use crate::models::{ItineraryPoint, ObjId, Route};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Distance from the route start in meters
    pub distance: f64,
    /// Elevation in meters
    pub elev: f64,
}

/// Cumulative-distance/elevation series of a route, ready for a profile
/// window to draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationProfile {
    pub route_obj_id: ObjId,
    pub points: Vec<ProfilePoint>,
    pub ascent: f64,
    pub descent: f64,
}

impl ElevationProfile {
    pub fn min_elev(&self) -> f64 {
        self.points
            .iter()
            .map(|point| point.elev)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max_elev(&self) -> f64 {
        self.points
            .iter()
            .map(|point| point.elev)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Build the elevation profile of a route. `None` when the provider supplied
/// no elevation data.
pub fn build_profile(route: &Route) -> Option<ElevationProfile> {
    if !route.itinerary.has_profile || route.itinerary.itinerary_points.is_empty() {
        return None;
    }

    let mut points = Vec::with_capacity(route.itinerary.itinerary_points.len());
    let mut distance = 0.0;
    for point in &route.itinerary.itinerary_points {
        points.push(ProfilePoint {
            distance,
            elev: point.elev,
        });
        distance += point.distance;
    }

    let (ascent, descent) = ascent_descent(&route.itinerary.itinerary_points);
    Some(ElevationProfile {
        route_obj_id: route.obj_id,
        points,
        ascent,
        descent,
    })
}

/// Total climb and drop along a point sequence, in meters.
pub(crate) fn ascent_descent(points: &[ItineraryPoint]) -> (f64, f64) {
    let mut ascent = 0.0;
    let mut descent = 0.0;
    for pair in points.windows(2) {
        let delta = pair[1].elev - pair[0].elev;
        if delta > 0.0 {
            ascent += delta;
        } else {
            descent -= delta;
        }
    }
    (ascent, descent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransitMode;

    fn point(elev: f64, distance: f64) -> ItineraryPoint {
        let mut point = ItineraryPoint::with_elev(0.0, 0.0, elev);
        point.distance = distance;
        point
    }

    #[test]
    fn ascent_and_descent_accumulate_separately() {
        let points = vec![
            point(100.0, 10.0),
            point(130.0, 10.0),
            point(120.0, 10.0),
            point(150.0, 0.0),
        ];
        let (ascent, descent) = ascent_descent(&points);
        assert!((ascent - 60.0).abs() < 1e-9);
        assert!((descent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn profile_is_none_without_elevation_data() {
        let mut route = Route::new("osrm", TransitMode::Bike);
        route.itinerary.itinerary_points.push(point(0.0, 100.0));
        route.itinerary.itinerary_points.push(point(0.0, 0.0));
        assert!(build_profile(&route).is_none());
    }

    #[test]
    fn profile_series_uses_cumulative_distances() {
        let mut route = Route::new("graphhopper", TransitMode::Bike);
        route.itinerary.has_profile = true;
        route.itinerary.itinerary_points = vec![
            point(100.0, 250.0),
            point(140.0, 750.0),
            point(110.0, 0.0),
        ];

        let profile = build_profile(&route).unwrap();
        assert_eq!(profile.points.len(), 3);
        assert_eq!(profile.points[0].distance, 0.0);
        assert_eq!(profile.points[1].distance, 250.0);
        assert_eq!(profile.points[2].distance, 1000.0);
        assert!((profile.ascent - 40.0).abs() < 1e-9);
        assert!((profile.descent - 30.0).abs() < 1e-9);
        assert_eq!(profile.min_elev(), 100.0);
        assert_eq!(profile.max_elev(), 140.0);
    }
}
