//! Altitude-indexed wind estimation.
//!
//! Fits one Gaussian-kernel locally weighted regression per wind component
//! (zonal `u`, meridional `v`) against altitude, and answers point queries
//! anywhere on the altitude axis. The predictive standard deviation combines
//! the model's leave-one-out residual dispersion with a kernel-support term,
//! so it is small on top of the training data and grows toward a ceiling
//! under extrapolation.

use crate::constants::{DEFAULT_LENGTH_SCALE_KM, DEFAULT_SIGNAL_STD_MPS, MIN_KERNEL_WEIGHT};
use crate::error::DescentError;
use crate::wind_data::{validate_samples, WindSample};

/// Wind estimate at a single altitude.
///
/// Both std fields are non-negative. Every field is a scalar by
/// construction; there is no array-shaped output to extract from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindEstimate {
    /// Zonal mean (m/s)
    pub u_mean_mps: f64,
    /// Meridional mean (m/s)
    pub v_mean_mps: f64,
    /// Zonal predictive std (m/s)
    pub u_std_mps: f64,
    /// Meridional predictive std (m/s)
    pub v_std_mps: f64,
}

/// Source of wind estimates for the descent simulator.
///
/// The estimator is read-only after fitting, so implementations are expected
/// to be safe for concurrent queries from parallel simulation runs.
pub trait WindField {
    /// Estimate wind at the given altitude (km).
    fn predict(&self, altitude_km: f64) -> Result<WindEstimate, DescentError>;
}

/// Hyperparameters for the kernel smoother.
///
/// Tunables, not contracts: the engine's interface behavior is identical for
/// any valid setting.
#[derive(Debug, Clone, Copy)]
pub struct KernelConfig {
    /// RBF length scale (km)
    pub length_scale_km: f64,
    /// Predictive std ceiling under full extrapolation (m/s)
    pub signal_std_mps: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            length_scale_km: DEFAULT_LENGTH_SCALE_KM,
            signal_std_mps: DEFAULT_SIGNAL_STD_MPS,
        }
    }
}

/// One fitted component: training values plus residual dispersion.
#[derive(Debug, Clone)]
struct ComponentModel {
    values: Vec<f64>,
    residual_std_mps: f64,
}

/// Regression model mapping altitude to wind components with uncertainty.
///
/// Immutable once fitted; `predict` is a pure function of the fitted state
/// and the query altitude. Fitting is deterministic: the smoother is
/// closed-form and uses no randomized optimizer.
#[derive(Debug, Clone)]
pub struct WindEstimator {
    altitudes_km: Vec<f64>,
    u: ComponentModel,
    v: ComponentModel,
    config: KernelConfig,
}

impl WindEstimator {
    /// Fit the estimator to a sample set.
    ///
    /// Fails with `Data` on empty input, non-finite values, or a
    /// variance-free altitude column, and with `InvalidParameter` on an
    /// unusable kernel configuration.
    pub fn fit(samples: &[WindSample], config: KernelConfig) -> Result<Self, DescentError> {
        if !config.length_scale_km.is_finite() || config.length_scale_km <= 0.0 {
            return Err(DescentError::InvalidParameter(
                "length_scale_km must be finite and > 0".to_string(),
            ));
        }
        if !config.signal_std_mps.is_finite() || config.signal_std_mps < 0.0 {
            return Err(DescentError::InvalidParameter(
                "signal_std_mps must be finite and >= 0".to_string(),
            ));
        }
        validate_samples(samples)?;

        let altitudes_km: Vec<f64> = samples.iter().map(|s| s.altitude_km).collect();
        let u_values: Vec<f64> = samples.iter().map(|s| s.u_wind_mps).collect();
        let v_values: Vec<f64> = samples.iter().map(|s| s.v_wind_mps).collect();

        let u = ComponentModel {
            residual_std_mps: loo_residual_std(&altitudes_km, &u_values, config.length_scale_km),
            values: u_values,
        };
        let v = ComponentModel {
            residual_std_mps: loo_residual_std(&altitudes_km, &v_values, config.length_scale_km),
            values: v_values,
        };

        Ok(Self { altitudes_km, u, v, config })
    }

    /// Estimate wind at the given altitude (km).
    ///
    /// Accepts any finite altitude, including values outside the training
    /// range; physical-range validation belongs to the caller.
    pub fn predict(&self, altitude_km: f64) -> Result<WindEstimate, DescentError> {
        if !altitude_km.is_finite() {
            return Err(DescentError::InvalidParameter(
                "altitude_km must be finite".to_string(),
            ));
        }

        let (u_mean_mps, u_std_mps) = self.predict_component(&self.u, altitude_km);
        let (v_mean_mps, v_std_mps) = self.predict_component(&self.v, altitude_km);

        let estimate = WindEstimate { u_mean_mps, v_mean_mps, u_std_mps, v_std_mps };
        if !estimate.u_mean_mps.is_finite()
            || !estimate.v_mean_mps.is_finite()
            || !estimate.u_std_mps.is_finite()
            || !estimate.v_std_mps.is_finite()
        {
            return Err(DescentError::Numeric(format!(
                "non-finite wind estimate at {} km",
                altitude_km
            )));
        }
        Ok(estimate)
    }

    fn predict_component(&self, component: &ComponentModel, altitude_km: f64) -> (f64, f64) {
        let scale = self.config.length_scale_km;
        let mut mass = 0.0;
        let mut weighted_sum = 0.0;
        let mut peak_weight: f64 = 0.0;
        let mut nearest = (f64::INFINITY, 0usize);

        for (i, (&a, &y)) in self.altitudes_km.iter().zip(&component.values).enumerate() {
            let distance = (altitude_km - a) / scale;
            let weight = (-0.5 * distance * distance).exp();
            mass += weight;
            weighted_sum += weight * y;
            peak_weight = peak_weight.max(weight);
            let abs_distance = (altitude_km - a).abs();
            if abs_distance < nearest.0 {
                nearest = (abs_distance, i);
            }
        }

        // Far outside the data every weight underflows; pin the mean to the
        // nearest sample rather than dividing a vanishing sum.
        let mean = if mass < MIN_KERNEL_WEIGHT {
            component.values[nearest.1]
        } else {
            weighted_sum / mass
        };

        let support = peak_weight.min(1.0);
        let variance = component.residual_std_mps.powi(2)
            + self.config.signal_std_mps.powi(2) * (1.0 - support);
        (mean, variance.sqrt())
    }
}

impl WindField for WindEstimator {
    fn predict(&self, altitude_km: f64) -> Result<WindEstimate, DescentError> {
        WindEstimator::predict(self, altitude_km)
    }
}

/// Leave-one-out residual dispersion of the kernel smoother (m/s).
///
/// For each training altitude, predict from the other samples and collect
/// the residual; the root mean square of those residuals is the noise-level
/// analog of the fitted model.
fn loo_residual_std(altitudes_km: &[f64], values: &[f64], length_scale_km: f64) -> f64 {
    let n = altitudes_km.len();
    let mut sum_sq = 0.0;
    for i in 0..n {
        let mut mass = 0.0;
        let mut weighted_sum = 0.0;
        let mut nearest = (f64::INFINITY, i);
        for j in 0..n {
            if j == i {
                continue;
            }
            let distance = (altitudes_km[i] - altitudes_km[j]) / length_scale_km;
            let weight = (-0.5 * distance * distance).exp();
            mass += weight;
            weighted_sum += weight * values[j];
            let abs_distance = (altitudes_km[i] - altitudes_km[j]).abs();
            if abs_distance < nearest.0 {
                nearest = (abs_distance, j);
            }
        }
        let prediction = if mass < MIN_KERNEL_WEIGHT {
            values[nearest.1]
        } else {
            weighted_sum / mass
        };
        sum_sq += (values[i] - prediction).powi(2);
    }
    (sum_sq / n as f64).sqrt()
}
