/// Physical and numerical constants used in descent simulation.

/// Integration timestep (seconds)
///
/// Fixed at one second: descent rates are a few m/s, so the position error
/// of forward Euler at this step is well below the wind model's own
/// uncertainty.
pub const DT_S: f64 = 1.0;

/// Meters per kilometer
pub const KM_TO_M: f64 = 1000.0;

/// Zonal perturbation floor for Monte Carlo sampling (m/s)
///
/// A model reporting zero uncertainty would collapse every stochastic run
/// onto the deterministic trajectory; the floor keeps the ensemble spread
/// physically meaningful.
pub const U_STD_FLOOR_MPS: f64 = 0.5;

/// Meridional perturbation floor for Monte Carlo sampling (m/s)
pub const V_STD_FLOOR_MPS: f64 = 0.3;

/// Default RBF length scale for the wind smoother (km)
///
/// Stratospheric wind regimes change over tens of kilometers of altitude;
/// 15 km matches the correlation length used when the training profile was
/// generated from reanalysis patterns.
pub const DEFAULT_LENGTH_SCALE_KM: f64 = 15.0;

/// Default predictive std ceiling under full extrapolation (m/s)
pub const DEFAULT_SIGNAL_STD_MPS: f64 = 8.0;

/// Minimum total kernel weight before prediction falls back to the nearest
/// training sample instead of dividing by a vanishing sum
pub const MIN_KERNEL_WEIGHT: f64 = 1e-12;
