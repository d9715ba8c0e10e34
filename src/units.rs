//! Unit conversions and small numeric helpers shared across the engine.

use nalgebra::Vector2;

use crate::constants::KM_TO_M;

/// Convert kilometers to meters.
pub fn km_to_meters(km: f64) -> f64 {
    km * KM_TO_M
}

/// Convert meters to kilometers.
pub fn meters_to_km(m: f64) -> f64 {
    m / KM_TO_M
}

/// Magnitude of a horizontal wind vector (m/s).
pub fn vector_magnitude(u: f64, v: f64) -> f64 {
    Vector2::new(u, v).norm()
}

/// Round to two decimal places.
///
/// Applied only at result assembly; intermediate state stays full-precision
/// so rounding error never compounds across timesteps.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
