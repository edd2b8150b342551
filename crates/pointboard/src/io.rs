//! JSON configuration and calibration persistence.

use pointboard_calib::{CalibrationSet, MapperParams};
use pointboard_detect::DetectorParams;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::layout::GridLayout;

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Everything needed to build a [`TrackingLoop`](crate::TrackingLoop).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub detector: DetectorParams,
    #[serde(default)]
    pub mapper: MapperParams,
    /// Only used by presentation layers; tracking itself ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<GridLayout>,
}

impl TrackerConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Saved calibration, so a restarted tracker can skip the corner captures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationFile {
    /// Corners in capture order (TL, TR, BL, BR), normalized.
    pub corners: CalibrationSet,
}

impl CalibrationFile {
    pub fn new(corners: CalibrationSet) -> Self {
        Self { corners }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointboard_calib::MappingModel;
    use pointboard_detect::ColorChannel;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: TrackerConfig = serde_json::from_str(
            r#"{"detector":{"threshold":{"channel":"green"}},"mapper":{"model":"projective"}}"#,
        )
        .expect("parse");
        assert_eq!(cfg.detector.threshold.channel, ColorChannel::Green);
        assert_eq!(cfg.detector.threshold.min_brightness, 150);
        assert_eq!(cfg.detector.stride, 3);
        assert_eq!(cfg.mapper.model, MappingModel::Projective);
        assert_eq!(cfg.mapper.tolerance, 0.05);
        assert_eq!(cfg.layout, None);

        let empty: TrackerConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(empty, TrackerConfig::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TrackerConfig::load_json("/nonexistent/pointboard.json").unwrap_err();
        assert!(matches!(err, IoError::Io(_)), "{err:?}");
    }
}
