//! Geographic utilities: great-circle distance and coordinate validity.

use geo::Coord;

/// Earth radius in meters used for all track distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two `(x = lng, y = lat)` coordinates.
///
/// # Example
/// ```
/// use geo::Coord;
/// use gradepace::geo_utils::haversine_distance;
///
/// let a = Coord { x: 0.0, y: 0.0 };
/// let b = Coord { x: 0.0, y: 1.0 };
/// let d = haversine_distance(a, b);
/// assert!((d - 111_195.0).abs() < 1.0);
/// ```
pub fn haversine_distance(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let lat1 = from.y.to_radians();
    let lat2 = to.y.to_radians();
    let dlat = (to.y - from.y).to_radians();
    let dlon = (to.x - from.x).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Check that a latitude/longitude pair is finite and in range.
pub fn is_valid_lat_lng(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

/// Total length in meters of a polyline of `(lng, lat)` coordinates.
pub fn polyline_length(coords: &[Coord<f64>]) -> f64 {
    coords
        .windows(2)
        .map(|w| haversine_distance(w[0], w[1]))
        .sum()
}

/// Convert a distance in meters to approximate degrees of latitude.
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / (EARTH_RADIUS_M.to_radians())
}
