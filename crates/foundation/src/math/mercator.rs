use super::EARTH_RADIUS_KM;

/// Edge length of a Web-Mercator tile in pixels.
pub const TILE_SIZE_PX: f64 = 256.0;

/// Ground distance covered by one screen pixel (kilometers).
///
/// Standard Web-Mercator relationship: the equator spans `256 * 2^zoom`
/// pixels, and horizontal scale shrinks with `cos(lat)`.
///
/// The result is not guarded: non-finite inputs produce non-finite output and
/// callers decide what that means.
pub fn ground_resolution_km(lat_deg: f64, zoom: f64) -> f64 {
    let circumference = 2.0 * std::f64::consts::PI * EARTH_RADIUS_KM;
    circumference * lat_deg.to_radians().cos().abs() / (TILE_SIZE_PX * zoom.exp2())
}
