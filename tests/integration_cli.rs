use std::path::PathBuf;
use std::process::Command;

fn get_cli_binary() -> PathBuf {
    // Try to find the built binary
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("target");
    path.push("debug");
    path.push("descent-cli");

    if !path.exists() {
        // Try release build
        path.pop();
        path.pop();
        path.push("release");
        path.push("descent-cli");
    }

    path
}

#[test]
fn test_cli_wind_profile_single_altitude() {
    let output = Command::new(get_cli_binary())
        .args(["wind-profile", "--altitude", "30"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("WIND PROFILE") && stdout.contains("30.00"),
        "Should contain the profile table"
    );
}

#[test]
fn test_cli_wind_profile_json_wire_shape() {
    let output = Command::new(get_cli_binary())
        .args(["wind-profile", "--altitude", "42.5", "--output", "json"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    for field in [
        "altitude_km",
        "u_wind",
        "v_wind",
        "u_uncertainty",
        "v_uncertainty",
        "wind_speed",
    ] {
        assert!(stdout.contains(field), "JSON should carry {}", field);
    }
}

#[test]
fn test_cli_wind_profile_sweep() {
    let output = Command::new(get_cli_binary())
        .args(["wind-profile", "--from", "20", "--to", "30", "--step", "5"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("20.00") && stdout.contains("25.00") && stdout.contains("30.00"));
}

#[test]
fn test_cli_wind_profile_rejects_out_of_domain_altitude() {
    let output = Command::new(get_cli_binary())
        .args(["wind-profile", "--altitude", "200"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2), "Invalid parameter exits 2");
}

#[test]
fn test_cli_simulate_table() {
    let output = Command::new(get_cli_binary())
        .args([
            "simulate",
            "--drop-altitude", "30",
            "--descent-rate", "10",
            "--runs", "10",
            "--seed", "42",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("MONTE CARLO DROP SIMULATION"));
    assert!(stdout.contains("Landing statistics"));
    assert!(stdout.contains("Recovery search guidance"));
}

#[test]
fn test_cli_simulate_json_wire_shape() {
    let output = Command::new(get_cli_binary())
        .args([
            "simulate",
            "--drop-altitude", "25",
            "--descent-rate", "10",
            "--runs", "10",
            "--output", "json",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    for field in [
        "monte_carlo_runs",
        "landing_points",
        "landing_statistics",
        "mean_x_drift_m",
        "std_y_drift_m",
        "representative_trajectory",
    ] {
        assert!(stdout.contains(field), "JSON should carry {}", field);
    }
}

#[test]
fn test_cli_simulate_rejects_zero_descent_rate() {
    let output = Command::new(get_cli_binary())
        .args([
            "simulate",
            "--drop-altitude", "30",
            "--descent-rate", "0",
            "--runs", "10",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2), "Invalid parameter exits 2");
}

#[test]
fn test_cli_simulate_reads_wind_csv() {
    let mut data = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    data.push("data");
    data.push("wind_sample.csv");

    let output = Command::new(get_cli_binary())
        .args([
            "simulate",
            "--drop-altitude", "30",
            "--descent-rate", "10",
            "--runs", "10",
            "--data", data.to_str().expect("utf-8 path"),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command should succeed");
}

#[test]
fn test_cli_simulate_missing_data_file_is_startup_failure() {
    let output = Command::new(get_cli_binary())
        .args([
            "simulate",
            "--drop-altitude", "30",
            "--descent-rate", "10",
            "--runs", "10",
            "--data", "/nonexistent/wind.csv",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1), "Data error exits 1");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("data error"));
}
