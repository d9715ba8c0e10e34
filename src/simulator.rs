//! Payload descent simulation.
//!
//! Time-stepped integration of payload position under wind forcing from a
//! [`WindField`], either once (deterministic) or as a Monte Carlo ensemble
//! in which every wind query is perturbed by a normal draw. Runs are
//! independent, so the ensemble fans out over a Rayon pool with one seeded
//! RNG stream per run.

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

use crate::constants::{DT_S, U_STD_FLOOR_MPS, V_STD_FLOOR_MPS};
use crate::error::DescentError;
use crate::units::{km_to_meters, meters_to_km, round2};
use crate::wind_model::WindField;

/// Drop scenario parameters.
#[derive(Debug, Clone, Copy)]
pub struct DropParams {
    /// Release altitude (km), must be > 0
    pub drop_altitude_km: f64,
    /// Payload mass (kg). Accepted for interface compatibility; the
    /// parachute approximation treats descent rate as externally fixed, so
    /// mass does not enter the physics.
    pub payload_mass_kg: f64,
    /// Constant descent rate (m/s), must be > 0
    pub descent_rate_mps: f64,
}

impl Default for DropParams {
    fn default() -> Self {
        Self {
            drop_altitude_km: 30.0,
            payload_mass_kg: 5.0,
            descent_rate_mps: 5.0,
        }
    }
}

/// One recorded timestep of a simulated descent.
///
/// Altitude is taken at the start of the step, drift after the update, so a
/// run's sequence starts at the release altitude and decreases strictly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    /// Altitude (km)
    pub altitude_km: f64,
    /// Eastward drift (m)
    pub x_drift_m: f64,
    /// Northward drift (m)
    pub y_drift_m: f64,
}

/// Terminal state of one simulated run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingPoint {
    /// Eastward drift at touchdown (m)
    pub x_drift_m: f64,
    /// Northward drift at touchdown (m)
    pub y_drift_m: f64,
}

/// Population statistics over a landing ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingStatistics {
    /// Mean eastward drift (m)
    pub mean_x_m: f64,
    /// Mean northward drift (m)
    pub mean_y_m: f64,
    /// Eastward dispersion, 1 sigma (m)
    pub std_x_m: f64,
    /// Northward dispersion, 1 sigma (m)
    pub std_y_m: f64,
}

impl LandingStatistics {
    /// Population mean/std over a non-empty set of landing points.
    fn from_points(points: &[LandingPoint]) -> Self {
        let n = points.len() as f64;
        let mean_x_m = points.iter().map(|p| p.x_drift_m).sum::<f64>() / n;
        let mean_y_m = points.iter().map(|p| p.y_drift_m).sum::<f64>() / n;
        let std_x_m = (points
            .iter()
            .map(|p| (p.x_drift_m - mean_x_m).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();
        let std_y_m = (points
            .iter()
            .map(|p| (p.y_drift_m - mean_y_m).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();
        Self { mean_x_m, mean_y_m, std_x_m, std_y_m }
    }
}

/// Result of one simulated descent, full precision.
#[derive(Debug, Clone)]
pub struct SingleRun {
    pub landing: LandingPoint,
    pub trajectory: Vec<TrajectoryPoint>,
}

/// Result of a Monte Carlo ensemble, rounded to presentation precision.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Terminal state of every run, in run order
    pub landing_points: Vec<LandingPoint>,
    /// Population mean/std over all runs
    pub landing_statistics: LandingStatistics,
    /// Trajectory of the final run. One plausible realization, nothing
    /// more: not a median or mean path.
    pub representative_trajectory: Vec<TrajectoryPoint>,
}

/// Time-stepped descent integrator over a wind field.
pub struct DescentSimulator<W: WindField> {
    wind: W,
    dt_s: f64,
    u_floor_mps: f64,
    v_floor_mps: f64,
}

impl<W: WindField + Sync> DescentSimulator<W> {
    /// Create a simulator over an explicitly supplied wind field.
    pub fn new(wind: W) -> Self {
        Self {
            wind,
            dt_s: DT_S,
            u_floor_mps: U_STD_FLOOR_MPS,
            v_floor_mps: V_STD_FLOOR_MPS,
        }
    }

    /// Override the integration timestep (seconds).
    pub fn set_timestep(&mut self, dt_s: f64) -> Result<(), DescentError> {
        if !dt_s.is_finite() || dt_s <= 0.0 {
            return Err(DescentError::InvalidParameter(
                "timestep must be finite and > 0".to_string(),
            ));
        }
        self.dt_s = dt_s;
        Ok(())
    }

    /// Override the Monte Carlo perturbation floors (m/s).
    pub fn set_perturbation_floors(&mut self, u_floor_mps: f64, v_floor_mps: f64) {
        self.u_floor_mps = u_floor_mps.max(0.0);
        self.v_floor_mps = v_floor_mps.max(0.0);
    }

    /// Simulate one descent using mean winds only.
    pub fn run_once(&self, params: &DropParams) -> Result<SingleRun, DescentError> {
        self.integrate(params, None)
    }

    /// Simulate one descent with normal wind perturbation drawn from `rng`.
    pub fn run_once_stochastic(
        &self,
        params: &DropParams,
        rng: &mut StdRng,
    ) -> Result<SingleRun, DescentError> {
        self.integrate(params, Some(rng))
    }

    /// Run `run_count` independent stochastic descents and aggregate them.
    ///
    /// Every run draws from its own `StdRng` stream, seeded from the master
    /// seed plus the run index, so results are reproducible and streams stay
    /// uncorrelated under parallel execution. Runs are collected in index
    /// order; the representative trajectory belongs to the final run.
    pub fn run_monte_carlo(
        &self,
        params: &DropParams,
        run_count: usize,
        seed: u64,
    ) -> Result<SimulationResult, DescentError> {
        if run_count < 1 {
            return Err(DescentError::InvalidParameter(
                "run_count must be >= 1".to_string(),
            ));
        }
        validate_params(params)?;

        let runs: Vec<Result<SingleRun, DescentError>> = (0..run_count)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                self.integrate(params, Some(&mut rng))
            })
            .collect();

        let mut singles = Vec::with_capacity(run_count);
        for run in runs {
            singles.push(run?);
        }

        // Statistics reduce the full-precision landing coordinates; rounding
        // happens once, here at the assembly boundary.
        let raw_points: Vec<LandingPoint> = singles.iter().map(|run| run.landing).collect();
        let stats = LandingStatistics::from_points(&raw_points);

        let landing_points = raw_points
            .iter()
            .map(|p| LandingPoint {
                x_drift_m: round2(p.x_drift_m),
                y_drift_m: round2(p.y_drift_m),
            })
            .collect();
        let landing_statistics = LandingStatistics {
            mean_x_m: round2(stats.mean_x_m),
            mean_y_m: round2(stats.mean_y_m),
            std_x_m: round2(stats.std_x_m),
            std_y_m: round2(stats.std_y_m),
        };
        let representative_trajectory = singles
            .last()
            .map(|run| {
                run.trajectory
                    .iter()
                    .map(|p| TrajectoryPoint {
                        altitude_km: round2(p.altitude_km),
                        x_drift_m: round2(p.x_drift_m),
                        y_drift_m: round2(p.y_drift_m),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(SimulationResult {
            landing_points,
            landing_statistics,
            representative_trajectory,
        })
    }

    fn integrate(
        &self,
        params: &DropParams,
        mut rng: Option<&mut StdRng>,
    ) -> Result<SingleRun, DescentError> {
        validate_params(params)?;

        let mut position = Vector3::new(0.0, 0.0, km_to_meters(params.drop_altitude_km));
        // Descent rate is strictly positive and constant, so the run is
        // bounded by this step count; exceeding it means the state went bad.
        let max_steps = (position.z / (params.descent_rate_mps * self.dt_s)).ceil() as u64 + 1;
        let mut trajectory = Vec::new();
        let mut steps: u64 = 0;

        while position.z > 0.0 {
            if steps >= max_steps {
                return Err(DescentError::Numeric(
                    "descent failed to reach the ground within the step bound".to_string(),
                ));
            }
            let altitude_km = meters_to_km(position.z);
            let estimate = self.wind.predict(altitude_km)?;

            let (u_mps, v_mps) = match rng.as_deref_mut() {
                Some(rng) => {
                    let u_dist =
                        Normal::new(estimate.u_mean_mps, estimate.u_std_mps.max(self.u_floor_mps))
                            .map_err(|e| DescentError::Numeric(format!("bad u draw: {}", e)))?;
                    let v_dist =
                        Normal::new(estimate.v_mean_mps, estimate.v_std_mps.max(self.v_floor_mps))
                            .map_err(|e| DescentError::Numeric(format!("bad v draw: {}", e)))?;
                    (u_dist.sample(rng), v_dist.sample(rng))
                }
                None => (estimate.u_mean_mps, estimate.v_mean_mps),
            };

            position += Vector3::new(u_mps, v_mps, -params.descent_rate_mps) * self.dt_s;
            if !position.x.is_finite() || !position.y.is_finite() || !position.z.is_finite() {
                return Err(DescentError::Numeric(format!(
                    "non-finite position at {} km",
                    altitude_km
                )));
            }

            trajectory.push(TrajectoryPoint {
                altitude_km,
                x_drift_m: position.x,
                y_drift_m: position.y,
            });
            steps += 1;
        }

        Ok(SingleRun {
            landing: LandingPoint {
                x_drift_m: position.x,
                y_drift_m: position.y,
            },
            trajectory,
        })
    }
}

fn validate_params(params: &DropParams) -> Result<(), DescentError> {
    if !params.drop_altitude_km.is_finite() || params.drop_altitude_km <= 0.0 {
        return Err(DescentError::InvalidParameter(
            "drop_altitude_km must be finite and > 0".to_string(),
        ));
    }
    if !params.descent_rate_mps.is_finite() || params.descent_rate_mps <= 0.0 {
        return Err(DescentError::InvalidParameter(
            "descent_rate must be finite and > 0".to_string(),
        ));
    }
    if !params.payload_mass_kg.is_finite() {
        return Err(DescentError::InvalidParameter(
            "payload_mass_kg must be finite".to_string(),
        ));
    }
    Ok(())
}
