//! Wind sample ingestion.
//!
//! Loads altitude/u/v triples from a CSV table with columns
//! `altitude_km,u_wind,v_wind` and validates them for regression. A missing
//! or malformed file is a fatal [`DescentError::Data`] so the host fails at
//! startup rather than fitting a model to garbage.

use std::path::Path;

use crate::error::DescentError;

/// One row of wind training data. Immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSample {
    /// Altitude above ground (km)
    pub altitude_km: f64,
    /// Zonal wind component, positive eastward (m/s)
    pub u_wind_mps: f64,
    /// Meridional wind component, positive northward (m/s)
    pub v_wind_mps: f64,
}

/// Synthetic stratospheric profile, 20-80 km in 2 km steps.
///
/// Values follow mid-latitude reanalysis patterns: westerlies strengthening
/// through the middle stratosphere, peaking near the stratopause, then
/// decaying toward the mesosphere, with a weaker meridional component that
/// reverses sign above ~68 km. Same rows as `data/wind_sample.csv`.
const BUILTIN_PROFILE: &[(f64, f64, f64)] = &[
    (20.0, 4.2, -1.3),
    (22.0, 6.8, -0.8),
    (24.0, 9.1, 0.4),
    (26.0, 12.5, 1.1),
    (28.0, 15.9, 1.8),
    (30.0, 17.9, 2.9),
    (32.0, 21.7, 3.5),
    (34.0, 24.3, 4.8),
    (36.0, 26.9, 5.2),
    (38.0, 29.8, 6.1),
    (40.0, 32.4, 6.8),
    (42.0, 35.1, 7.3),
    (44.0, 37.9, 7.9),
    (46.0, 40.9, 8.6),
    (48.0, 42.8, 9.0),
    (50.0, 44.5, 9.4),
    (52.0, 45.9, 9.1),
    (54.0, 46.8, 8.7),
    (56.0, 47.2, 8.2),
    (58.0, 46.9, 7.4),
    (60.0, 45.8, 6.5),
    (62.0, 43.9, 5.3),
    (64.0, 41.2, 4.0),
    (66.0, 37.8, 2.6),
    (68.0, 33.9, 1.2),
    (70.0, 29.4, -0.3),
    (72.0, 24.6, -1.9),
    (74.0, 19.3, -3.4),
    (76.0, 13.8, -5.0),
    (78.0, 8.1, -6.7),
    (80.0, 2.4, -8.2),
];

/// Built-in synthetic wind profile, for use when no CSV file is supplied.
pub fn builtin_profile() -> Vec<WindSample> {
    BUILTIN_PROFILE
        .iter()
        .map(|&(altitude_km, u_wind_mps, v_wind_mps)| WindSample {
            altitude_km,
            u_wind_mps,
            v_wind_mps,
        })
        .collect()
}

/// Load wind samples from a CSV file with columns `altitude_km,u_wind,v_wind`.
///
/// Header names are matched after trimming whitespace; column order in the
/// file does not matter. Every failure mode (unreadable file, missing
/// column, unparseable cell, validation) is a descriptive `Data` error.
pub fn load_wind_samples(path: &Path) -> Result<Vec<WindSample>, DescentError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        DescentError::Data(format!(
            "cannot open wind sample file {}: {}",
            path.display(),
            e
        ))
    })?;

    let headers = reader
        .headers()
        .map_err(|e| DescentError::Data(format!("cannot read CSV header: {}", e)))?
        .clone();
    let column = |name: &str| -> Result<usize, DescentError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DescentError::Data(format!("missing column '{}'", name)))
    };
    let alt_idx = column("altitude_km")?;
    let u_idx = column("u_wind")?;
    let v_idx = column("v_wind")?;

    let mut samples = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| DescentError::Data(format!("bad CSV row {}: {}", row + 1, e)))?;
        let cell = |idx: usize| -> Result<f64, DescentError> {
            record
                .get(idx)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .ok_or_else(|| {
                    DescentError::Data(format!("row {} has an unparseable value", row + 1))
                })
        };
        samples.push(WindSample {
            altitude_km: cell(alt_idx)?,
            u_wind_mps: cell(u_idx)?,
            v_wind_mps: cell(v_idx)?,
        });
    }

    validate_samples(&samples)?;
    Ok(samples)
}

/// Check that a sample set is usable as regression input.
pub(crate) fn validate_samples(samples: &[WindSample]) -> Result<(), DescentError> {
    if samples.is_empty() {
        return Err(DescentError::Data("wind sample set is empty".to_string()));
    }
    for (i, s) in samples.iter().enumerate() {
        if !s.altitude_km.is_finite() || !s.u_wind_mps.is_finite() || !s.v_wind_mps.is_finite() {
            return Err(DescentError::Data(format!(
                "sample {} contains a non-finite value",
                i
            )));
        }
    }
    // Duplicate altitudes are fine; a variance-free regressor is not.
    let first = samples[0].altitude_km;
    if samples.iter().all(|s| s.altitude_km == first) {
        return Err(DescentError::Data(
            "all sample altitudes are identical".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).expect("create temp csv");
        file.write_all(contents.as_bytes()).expect("write temp csv");
        path
    }

    #[test]
    fn test_builtin_profile_is_valid() {
        let samples = builtin_profile();
        assert_eq!(samples.len(), 31);
        assert!(validate_samples(&samples).is_ok());
        assert_eq!(samples[0].altitude_km, 20.0);
        assert_eq!(samples.last().unwrap().altitude_km, 80.0);
    }

    #[test]
    fn test_load_csv() {
        let path = write_temp_csv(
            "descent_engine_ok.csv",
            "altitude_km, u_wind, v_wind\n20.0,4.2,-1.3\n22.0,6.8,-0.8\n",
        );
        let samples = load_wind_samples(&path).expect("load");
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].u_wind_mps, 6.8);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_wind_samples(Path::new("/nonexistent/wind.csv")).unwrap_err();
        assert!(matches!(err, DescentError::Data(_)));
    }

    #[test]
    fn test_load_missing_column() {
        let path = write_temp_csv(
            "descent_engine_nocol.csv",
            "altitude_km,u_wind\n20.0,4.2\n",
        );
        let err = load_wind_samples(&path).unwrap_err();
        assert!(err.to_string().contains("v_wind"));
    }

    #[test]
    fn test_load_unparseable_cell() {
        let path = write_temp_csv(
            "descent_engine_badcell.csv",
            "altitude_km,u_wind,v_wind\n20.0,four,0.0\n",
        );
        let err = load_wind_samples(&path).unwrap_err();
        assert!(matches!(err, DescentError::Data(_)));
    }

    #[test]
    fn test_validate_empty() {
        let err = validate_samples(&[]).unwrap_err();
        assert!(matches!(err, DescentError::Data(_)));
    }

    #[test]
    fn test_validate_non_finite() {
        let samples = vec![
            WindSample { altitude_km: 20.0, u_wind_mps: f64::NAN, v_wind_mps: 0.0 },
            WindSample { altitude_km: 25.0, u_wind_mps: 1.0, v_wind_mps: 0.0 },
        ];
        assert!(validate_samples(&samples).is_err());
    }

    #[test]
    fn test_validate_identical_altitudes() {
        let samples = vec![
            WindSample { altitude_km: 30.0, u_wind_mps: 1.0, v_wind_mps: 0.0 },
            WindSample { altitude_km: 30.0, u_wind_mps: 2.0, v_wind_mps: 0.5 },
        ];
        let err = validate_samples(&samples).unwrap_err();
        assert!(err.to_string().contains("identical"));
    }

    #[test]
    fn test_duplicate_altitudes_allowed() {
        let samples = vec![
            WindSample { altitude_km: 30.0, u_wind_mps: 1.0, v_wind_mps: 0.0 },
            WindSample { altitude_km: 30.0, u_wind_mps: 2.0, v_wind_mps: 0.5 },
            WindSample { altitude_km: 35.0, u_wind_mps: 3.0, v_wind_mps: 1.0 },
        ];
        assert!(validate_samples(&samples).is_ok());
    }
}
