//! Geographic coordinates and distances.

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether the coordinate lies within the valid WGS84 ranges.
    pub fn is_valid(self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Computes the haversine distance between two coordinates in meters.
///
/// The distance is symmetric and zero for identical coordinates.
pub fn haversine_distance(c1: Coord, c2: Coord) -> f64 {
    /// Earth's radius for WGS84 in meters
    const EARTH_RADIUS_IN_METERS: f64 = 6_372_797.560_856;

    debug_assert!(c1.is_valid() && c2.is_valid());

    let mut lonh = ((c1.lon - c2.lon).to_radians() * 0.5).sin();
    lonh *= lonh;
    let mut lath = ((c1.lat - c2.lat).to_radians() * 0.5).sin();
    lath *= lath;
    let tmp = c1.lat.to_radians().cos() * c2.lat.to_radians().cos();
    2.0 * EARTH_RADIUS_IN_METERS * (lath + tmp * lonh).sqrt().asin()
}
