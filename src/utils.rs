// src/utils.rs
use crate::analysis::Coordinates;

/// Earth's mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Degrees with hemisphere letters, e.g. `33.870000°S, 151.210000°E`
pub fn format_coordinates(coords: &Coordinates) -> String {
    let lat_dir = if coords.lat >= 0.0 { 'N' } else { 'S' };
    let lng_dir = if coords.lng >= 0.0 { 'E' } else { 'W' };

    format!(
        "{:.6}°{}, {:.6}°{}",
        coords.lat.abs(),
        lat_dir,
        coords.lng.abs(),
        lng_dir
    )
}

/// Signed four-decimal pair used for list rows and fallback addresses
pub fn short_coordinates(coords: &Coordinates) -> String {
    format!("{:.4}, {:.4}", coords.lat, coords.lng)
}

pub fn is_valid_coordinates(coords: &Coordinates) -> bool {
    (-90.0..=90.0).contains(&coords.lat) && (-180.0..=180.0).contains(&coords.lng)
}

/// Haversine great-circle distance in kilometers
pub fn calculate_distance(a: &Coordinates, b: &Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
