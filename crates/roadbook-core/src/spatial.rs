//! Spherical trigonometry and the planar projection used by the geometry
//! engine.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Latitude beyond which the spherical Mercator projection degenerates.
const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Great-circle distance between two points in meters (Haversine formula).
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lng2 - lng1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lng(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Convert a north/south offset in meters to degrees latitude.
pub fn meters_to_lat(meters: f64, ref_lat_deg: f64) -> f64 {
    let meters_per_deg = meters_per_deg_lat(ref_lat_deg).max(1e-9);
    meters / meters_per_deg
}

/// Convert an east/west offset in meters to degrees longitude at a given
/// latitude.
pub fn meters_to_lng(meters: f64, ref_lat_deg: f64) -> f64 {
    let meters_per_deg = meters_per_deg_lng(ref_lat_deg).max(1e-9);
    meters / meters_per_deg
}

/// A point in the planar projected space, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: PlanarPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Map projection capability supplied by the hosting map widget.
///
/// The host projects lat/lng into a planar space where Euclidean distance
/// comparisons are valid, and back. The pixel methods are the screen
/// passthroughs used when placing markers from pointer events.
pub trait Projection: Send + Sync {
    fn project(&self, lat: f64, lng: f64) -> PlanarPoint;
    fn unproject(&self, point: PlanarPoint) -> (f64, f64);

    /// Screen pixel of a lat/lng at the given zoom level.
    fn pixel_of(&self, lat: f64, lng: f64, zoom: f64) -> PlanarPoint {
        let scale = 256.0 * zoom.exp2();
        let world = 2.0 * PI * EARTH_RADIUS_M;
        let point = self.project(lat, lng);
        PlanarPoint::new(
            (point.x / world + 0.5) * scale,
            (0.5 - point.y / world) * scale,
        )
    }

    /// Lat/lng under a screen pixel at the given zoom level.
    fn latlng_of_pixel(&self, pixel: PlanarPoint, zoom: f64) -> (f64, f64) {
        let scale = 256.0 * zoom.exp2();
        let world = 2.0 * PI * EARTH_RADIUS_M;
        self.unproject(PlanarPoint::new(
            (pixel.x / scale - 0.5) * world,
            (0.5 - pixel.y / scale) * world,
        ))
    }
}

/// Spherical Mercator projection (EPSG:3857 style), the projection used by
/// the usual web map hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalMercator;

impl Projection for SphericalMercator {
    fn project(&self, lat: f64, lng: f64) -> PlanarPoint {
        let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
        let x = EARTH_RADIUS_M * lng.to_radians();
        let y = EARTH_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        PlanarPoint::new(x, y)
    }

    fn unproject(&self, point: PlanarPoint) -> (f64, f64) {
        let lng = (point.x / EARTH_RADIUS_M).to_degrees();
        let lat = (2.0 * (point.y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
        (lat, lng)
    }
}

/// Closest point on segment [a, b] to p in planar space, together with the
/// planar distance from p to it.
pub fn closest_point_on_segment(
    p: PlanarPoint,
    a: PlanarPoint,
    b: PlanarPoint,
) -> (PlanarPoint, f64) {
    let sx = b.x - a.x;
    let sy = b.y - a.y;
    let seg_len_sq = sx * sx + sy * sy;

    // Degenerate segment: both ends coincide
    if seg_len_sq < 1e-12 {
        return (a, p.distance_to(a));
    }

    let t = (((p.x - a.x) * sx + (p.y - a.y) * sy) / seg_len_sq).clamp(0.0, 1.0);
    let closest = PlanarPoint::new(a.x + t * sx, a.y + t * sy);
    let distance = p.distance_to(closest);
    (closest, distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn haversine_same_point() {
        let dist = haversine_distance(48.85, 2.35, 48.85, 2.35);
        assert!(dist < 0.001);
    }

    #[test]
    fn degree_scaling_agrees_with_haversine() {
        let ref_lat = 45.0;
        let north = meters_to_lat(5000.0, ref_lat);
        let east = meters_to_lng(5000.0, ref_lat);

        let north_measured = haversine_distance(ref_lat, 0.0, ref_lat + north, 0.0);
        let east_measured = haversine_distance(ref_lat, 0.0, ref_lat, east);
        // WGS84 series vs spherical haversine, ~1% agreement is expected
        assert!((north_measured - 5000.0).abs() < 50.0);
        assert!((east_measured - 5000.0).abs() < 50.0);
    }

    #[test]
    fn mercator_round_trips() {
        let projection = SphericalMercator;
        let point = projection.project(45.188, 5.724);
        let (lat, lng) = projection.unproject(point);
        assert!((lat - 45.188).abs() < 1e-9);
        assert!((lng - 5.724).abs() < 1e-9);
    }

    #[test]
    fn pixel_passthrough_round_trips() {
        let projection = SphericalMercator;
        let pixel = projection.pixel_of(48.85, 2.35, 13.0);
        let (lat, lng) = projection.latlng_of_pixel(pixel, 13.0);
        assert!((lat - 48.85).abs() < 1e-6);
        assert!((lng - 2.35).abs() < 1e-6);
    }

    #[test]
    fn closest_point_falls_inside_segment() {
        let a = PlanarPoint::new(0.0, 0.0);
        let b = PlanarPoint::new(10.0, 0.0);
        let (closest, distance) = closest_point_on_segment(PlanarPoint::new(4.0, 3.0), a, b);
        assert!((closest.x - 4.0).abs() < 1e-9);
        assert!(closest.y.abs() < 1e-9);
        assert!((distance - 3.0).abs() < 1e-9);
    }

    #[test]
    fn closest_point_clamps_to_segment_ends() {
        let a = PlanarPoint::new(0.0, 0.0);
        let b = PlanarPoint::new(10.0, 0.0);
        let (closest, distance) = closest_point_on_segment(PlanarPoint::new(-3.0, 4.0), a, b);
        assert_eq!(closest, a);
        assert!((distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_segment_measures_to_its_point() {
        let a = PlanarPoint::new(2.0, 2.0);
        let (closest, distance) = closest_point_on_segment(PlanarPoint::new(2.0, 5.0), a, a);
        assert_eq!(closest, a);
        assert!((distance - 3.0).abs() < 1e-9);
    }
}
