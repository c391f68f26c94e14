//! JSON configuration and report helpers.

use std::{fs, path::Path};

use fringe_calib_core::{BoardGeometry, CalibrationResult};
use fringe_calib_phase::UnwrapParams;
use serde::{Deserialize, Serialize};

use crate::{AcquisitionMode, AcquisitionParams};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_requested_samples() -> usize {
    5
}

/// Everything a calibration run needs besides the devices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub board: BoardGeometry,
    /// Poses used for the intrinsic solve; one more is taken for the pose.
    #[serde(default = "default_requested_samples")]
    pub requested_samples: usize,
    #[serde(default)]
    pub acquisition: AcquisitionParams,
    #[serde(default)]
    pub unwrap: UnwrapParams,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            board: BoardGeometry::default(),
            requested_samples: default_requested_samples(),
            acquisition: AcquisitionParams::default(),
            unwrap: UnwrapParams::default(),
        }
    }
}

impl CalibrationConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Outcome of a run, ready to be persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub mode: AcquisitionMode,
    pub board: BoardGeometry,
    pub samples: usize,
    pub result: CalibrationResult,
}

impl CalibrationReport {
    pub fn new(
        mode: AcquisitionMode,
        config: &CalibrationConfig,
        result: CalibrationResult,
    ) -> Self {
        Self {
            mode,
            board: config.board,
            samples: config.requested_samples,
            result,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fringe_calib_core::{Distortion, Intrinsics, PlanarPose};
    use nalgebra::Vector3;

    #[test]
    fn partial_config_fills_defaults() {
        let json = r#"{ "requested_samples": 8, "acquisition": { "settle_delay_ms": 120 } }"#;
        let config: CalibrationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.requested_samples, 8);
        assert_eq!(config.acquisition.settle_delay_ms, 120);
        assert_eq!(config.acquisition.poll_interval_ms, 15);
        assert_eq!(config.acquisition.pitches, [70.0, 75.0]);
        assert_eq!(config.board, BoardGeometry::default());
        assert_eq!(config.unwrap, UnwrapParams::default());
    }

    #[test]
    fn config_and_report_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let config = CalibrationConfig {
            board: BoardGeometry::new(5, 7, 2.0).unwrap(),
            ..CalibrationConfig::default()
        };
        config.write_json(&config_path).unwrap();
        assert_eq!(CalibrationConfig::load_json(&config_path).unwrap(), config);

        let result = CalibrationResult::new(
            Intrinsics::new(900.0, 910.0, 320.0, 240.0, 0.0, Distortion::NONE),
            PlanarPose {
                rotation: Vector3::new(0.1, -0.2, 0.05),
                translation: Vector3::new(1.0, 2.0, 30.0),
            },
        );
        let report = CalibrationReport::new(AcquisitionMode::Projector, &config, result);
        let report_path = dir.path().join("report.json");
        report.write_json(&report_path).unwrap();
        let raw = std::fs::read_to_string(&report_path).unwrap();
        assert!(raw.contains("\"projector\""));
        assert_eq!(CalibrationReport::load_json(&report_path).unwrap(), report);
    }

    #[test]
    fn invalid_board_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let json = r#"{ "board": { "marker_rows": 4, "marker_cols": 0, "marker_spacing": 1.0 } }"#;
        std::fs::write(&path, json).unwrap();
        assert!(matches!(
            CalibrationConfig::load_json(&path),
            Err(ConfigIoError::Json(_))
        ));
    }
}
