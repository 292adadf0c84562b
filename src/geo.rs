//! Great-circle distance between site coordinates.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_meters(*self, *other)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// Haversine surface distance in meters.
///
/// Ranges are not checked; latitudes beyond ±90° give meaningless results.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAIPUR: Coordinate = Coordinate {
        lat: 26.9124,
        lng: 75.7873,
    };

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(distance_meters(JAIPUR, JAIPUR), 0.0);
        let origin = Coordinate::new(0.0, 0.0);
        assert_eq!(origin.distance_to(&origin), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let udaipur = Coordinate::new(24.5854, 73.7125);
        let ab = distance_meters(JAIPUR, udaipur);
        let ba = distance_meters(udaipur, JAIPUR);
        assert!((ab - ba).abs() < 1e-6);
        // Jaipur to Udaipur is roughly 330 km as the crow flies
        assert!(ab > 300_000.0 && ab < 360_000.0, "got {}", ab);
    }

    #[test]
    fn test_hundredth_degree_latitude() {
        let shifted = Coordinate::new(JAIPUR.lat + 0.01, JAIPUR.lng);
        let d = distance_meters(JAIPUR, shifted);
        assert!((d - 1112.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_antipodal_points() {
        let d = distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((d - half_circumference).abs() < 1.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(JAIPUR.to_string(), "(26.9124, 75.7873)");
    }
}
