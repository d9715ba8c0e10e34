//! Command-line interface for the descent engine.
//!
//! This is the presentation collaborator: it validates the expected input
//! domains, rounds values for display, and maps engine errors to exit codes
//! (1 for data/numeric failures, 2 for invalid parameters). The library core
//! below it performs no rounding and no domain clamping.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::f64::consts::PI;
use std::path::PathBuf;
use std::process;

use descent_engine::units::{round2, vector_magnitude};
use descent_engine::{
    builtin_profile, load_wind_samples, DescentError, DescentSimulator, DropParams, KernelConfig,
    SimulationResult, WindEstimator, WindSample,
};

/// Expected physical domain for wind queries (km).
const ALTITUDE_DOMAIN_KM: (f64, f64) = (20.0, 80.0);
/// Expected physical domain for release altitudes (km).
const DROP_DOMAIN_KM: (f64, f64) = (20.0, 50.0);
/// Expected domain for ensemble size.
const RUNS_DOMAIN: (usize, usize) = (10, 200);

#[derive(Parser)]
#[command(name = "descent-cli")]
#[command(version = "0.1.0")]
#[command(about = "Stratospheric wind estimation and HAPS payload drop simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the fitted wind model at one altitude, or sweep a range
    WindProfile {
        /// Altitude to query (km)
        #[arg(short = 'a', long)]
        altitude: Option<f64>,

        /// Sweep start altitude (km)
        #[arg(long)]
        from: Option<f64>,

        /// Sweep end altitude (km)
        #[arg(long)]
        to: Option<f64>,

        /// Sweep step (km)
        #[arg(long, default_value = "2.0")]
        step: f64,

        /// Wind sample CSV (columns altitude_km,u_wind,v_wind); built-in
        /// profile when omitted
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Run a Monte Carlo payload drop simulation
    Simulate {
        /// Release altitude (km)
        #[arg(short = 'd', long)]
        drop_altitude: f64,

        /// Payload mass (kg)
        #[arg(short = 'm', long, default_value = "5.0")]
        payload_mass: f64,

        /// Descent rate (m/s)
        #[arg(short = 'r', long, default_value = "5.0")]
        descent_rate: f64,

        /// Number of Monte Carlo runs
        #[arg(short = 'n', long, default_value = "100")]
        runs: usize,

        /// Master random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Wind sample CSV (columns altitude_km,u_wind,v_wind); built-in
        /// profile when omitted
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Wind profile wire shape, one row per queried altitude.
#[derive(Serialize)]
struct WindProfileResponse {
    altitude_km: f64,
    u_wind: f64,
    v_wind: f64,
    u_uncertainty: f64,
    v_uncertainty: f64,
    wind_speed: f64,
}

#[derive(Serialize)]
struct LandingPointResponse {
    x_drift_m: f64,
    y_drift_m: f64,
}

#[derive(Serialize)]
struct LandingStatisticsResponse {
    mean_x_drift_m: f64,
    mean_y_drift_m: f64,
    std_x_drift_m: f64,
    std_y_drift_m: f64,
}

#[derive(Serialize)]
struct TrajectoryPointResponse {
    altitude_km: f64,
    x_drift_m: f64,
    y_drift_m: f64,
}

#[derive(Serialize)]
struct SimulateResponse {
    monte_carlo_runs: usize,
    landing_points: Vec<LandingPointResponse>,
    landing_statistics: LandingStatisticsResponse,
    representative_trajectory: Vec<TrajectoryPointResponse>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        let code = match e {
            DescentError::InvalidParameter(_) => 2,
            DescentError::Data(_) | DescentError::Numeric(_) => 1,
        };
        process::exit(code);
    }
}

fn run(cli: Cli) -> Result<(), DescentError> {
    match cli.command {
        Commands::WindProfile { altitude, from, to, step, data, output } => {
            let model = fit_model(data.as_deref())?;
            let altitudes = resolve_altitudes(altitude, from, to, step)?;
            let rows: Vec<WindProfileResponse> = altitudes
                .into_iter()
                .map(|altitude_km| profile_row(&model, altitude_km))
                .collect::<Result<_, _>>()?;
            match output {
                OutputFormat::Json => print_json(&rows),
                OutputFormat::Table => print_profile_table(&rows),
            }
            Ok(())
        }
        Commands::Simulate {
            drop_altitude,
            payload_mass,
            descent_rate,
            runs,
            seed,
            data,
            output,
        } => {
            check_domain("drop altitude (km)", drop_altitude, DROP_DOMAIN_KM)?;
            if !(descent_rate > 0.0) {
                return Err(DescentError::InvalidParameter(
                    "descent rate must be > 0".to_string(),
                ));
            }
            if runs < RUNS_DOMAIN.0 || runs > RUNS_DOMAIN.1 {
                return Err(DescentError::InvalidParameter(format!(
                    "monte carlo runs must be within {}-{}",
                    RUNS_DOMAIN.0, RUNS_DOMAIN.1
                )));
            }

            let model = fit_model(data.as_deref())?;
            let simulator = DescentSimulator::new(model);
            let params = DropParams {
                drop_altitude_km: drop_altitude,
                payload_mass_kg: payload_mass,
                descent_rate_mps: descent_rate,
            };
            let result = simulator.run_monte_carlo(&params, runs, seed)?;
            match output {
                OutputFormat::Json => print_json(&simulate_response(runs, &result)),
                OutputFormat::Table => print_simulate_table(&params, runs, seed, &result),
            }
            Ok(())
        }
    }
}

/// Fit the wind model from a CSV file, or from the built-in profile.
fn fit_model(data: Option<&std::path::Path>) -> Result<WindEstimator, DescentError> {
    let samples: Vec<WindSample> = match data {
        Some(path) => load_wind_samples(path)?,
        None => builtin_profile(),
    };
    WindEstimator::fit(&samples, KernelConfig::default())
}

/// Expand the altitude arguments into the list of query altitudes.
fn resolve_altitudes(
    altitude: Option<f64>,
    from: Option<f64>,
    to: Option<f64>,
    step: f64,
) -> Result<Vec<f64>, DescentError> {
    match (altitude, from, to) {
        (Some(altitude_km), None, None) => {
            check_domain("altitude (km)", altitude_km, ALTITUDE_DOMAIN_KM)?;
            Ok(vec![altitude_km])
        }
        (None, Some(start), Some(end)) => {
            check_domain("sweep start (km)", start, ALTITUDE_DOMAIN_KM)?;
            check_domain("sweep end (km)", end, ALTITUDE_DOMAIN_KM)?;
            if !(step > 0.0) || end < start {
                return Err(DescentError::InvalidParameter(
                    "sweep requires --to >= --from and --step > 0".to_string(),
                ));
            }
            let mut altitudes = Vec::new();
            let mut altitude_km = start;
            while altitude_km <= end + 1e-9 {
                altitudes.push(altitude_km.min(end));
                altitude_km += step;
            }
            Ok(altitudes)
        }
        _ => Err(DescentError::InvalidParameter(
            "provide either --altitude or both --from and --to".to_string(),
        )),
    }
}

fn check_domain(name: &str, value: f64, (lo, hi): (f64, f64)) -> Result<(), DescentError> {
    if !value.is_finite() || value < lo || value > hi {
        return Err(DescentError::InvalidParameter(format!(
            "{} must be within {}-{}",
            name, lo, hi
        )));
    }
    Ok(())
}

fn profile_row(
    model: &WindEstimator,
    altitude_km: f64,
) -> Result<WindProfileResponse, DescentError> {
    let estimate = model.predict(altitude_km)?;
    Ok(WindProfileResponse {
        altitude_km: round2(altitude_km),
        u_wind: round2(estimate.u_mean_mps),
        v_wind: round2(estimate.v_mean_mps),
        u_uncertainty: round2(estimate.u_std_mps),
        v_uncertainty: round2(estimate.v_std_mps),
        wind_speed: round2(vector_magnitude(estimate.u_mean_mps, estimate.v_mean_mps)),
    })
}

fn simulate_response(runs: usize, result: &SimulationResult) -> SimulateResponse {
    SimulateResponse {
        monte_carlo_runs: runs,
        landing_points: result
            .landing_points
            .iter()
            .map(|p| LandingPointResponse {
                x_drift_m: p.x_drift_m,
                y_drift_m: p.y_drift_m,
            })
            .collect(),
        landing_statistics: LandingStatisticsResponse {
            mean_x_drift_m: result.landing_statistics.mean_x_m,
            mean_y_drift_m: result.landing_statistics.mean_y_m,
            std_x_drift_m: result.landing_statistics.std_x_m,
            std_y_drift_m: result.landing_statistics.std_y_m,
        },
        representative_trajectory: result
            .representative_trajectory
            .iter()
            .map(|p| TrajectoryPointResponse {
                altitude_km: p.altitude_km,
                x_drift_m: p.x_drift_m,
                y_drift_m: p.y_drift_m,
            })
            .collect(),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Warning: failed to serialize output: {}", e),
    }
}

fn print_profile_table(rows: &[WindProfileResponse]) {
    println!("=== WIND PROFILE ===");
    println!();
    println!(
        "{:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Altitude", "U wind", "V wind", "Speed", "±U", "±V"
    );
    println!(
        "{:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "(km)", "(m/s)", "(m/s)", "(m/s)", "(m/s)", "(m/s)"
    );
    for row in rows {
        println!(
            "{:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            row.altitude_km,
            row.u_wind,
            row.v_wind,
            row.wind_speed,
            row.u_uncertainty,
            row.v_uncertainty
        );
    }
}

fn print_simulate_table(params: &DropParams, runs: usize, seed: u64, result: &SimulationResult) {
    let stats = &result.landing_statistics;
    println!("=== MONTE CARLO DROP SIMULATION ===");
    println!();
    println!("Drop altitude:  {:.1} km", params.drop_altitude_km);
    println!("Descent rate:   {:.1} m/s", params.descent_rate_mps);
    println!("Payload mass:   {:.1} kg", params.payload_mass_kg);
    println!("Runs:           {} (seed {})", runs, seed);
    println!();
    println!("Landing statistics:");
    println!("  Mean drift:   x {:.2} m, y {:.2} m", stats.mean_x_m, stats.mean_y_m);
    println!("  Dispersion:   σx {:.2} m, σy {:.2} m", stats.std_x_m, stats.std_y_m);
    println!();

    // Search radii follow the dashboard convention: the 68% zone is one
    // sigma of the wider axis, the 95% zone two.
    let radius_1sigma = stats.std_x_m.max(stats.std_y_m);
    println!("Recovery search guidance:");
    println!(
        "  68% zone:     within {:.0} m of the mean landing point",
        radius_1sigma
    );
    println!("  95% zone:     within {:.0} m", 2.0 * radius_1sigma);
    println!(
        "  1σ ellipse:   {:.0} m² dispersion area",
        PI * stats.std_x_m * stats.std_y_m
    );
    println!();
    println!(
        "Representative trajectory: {} points (final run)",
        result.representative_trajectory.len()
    );
}
