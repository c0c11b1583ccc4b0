// src/config.rs
use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::analysis::error::AnalysisError;
use crate::analysis::peaks::ScanSchedule;
use crate::analysis::plot::Scalebar;
/// Acquisition sample period of the rig (20 kHz).
pub const DEFAULT_SAMPLE_PERIOD_SECS: f64 = 5e-5;
/// Minimum distance (samples) between two reported peaks of one polarity.
pub const DEFAULT_MIN_PEAK_SPACING: usize = 100;
/// Neighbourhood divisor for unscheduled whole-sweep searches.
pub const EXPLORATORY_DIVISOR: usize = 25;
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakSettings {
    pub sample_period_secs: f64,
    /// Neighbourhood half-width is `window_len / window_divisor`.
    pub window_divisor: usize,
    pub min_peak_spacing: usize,
}
impl Default for PeakSettings {
    fn default() -> Self {
        Self {
            sample_period_secs: DEFAULT_SAMPLE_PERIOD_SECS,
            window_divisor: 1,
            min_peak_spacing: DEFAULT_MIN_PEAK_SPACING,
        }
    }
}
impl PeakSettings {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.sample_period_secs.is_finite() && self.sample_period_secs > 0.0) {
            return Err(AnalysisError::InvalidInput(format!(
                "sample period must be positive, got {}",
                self.sample_period_secs
            )));
        }
        if self.window_divisor == 0 {
            return Err(AnalysisError::InvalidInput(
                "window divisor must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
/// Everything an analysis run can be tuned with. Fields missing from a
/// config file keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub peaks: PeakSettings,
    pub schedule: ScanSchedule,
    /// Search the whole sweep instead of following `schedule`.
    pub exploratory: bool,
    pub y_limits: Option<(f64, f64)>,
    pub scalebar: Option<Scalebar>,
}
impl AnalysisConfig {
    pub fn from_json_str(text: &str) -> Result<Self, AnalysisError> {
        let config: AnalysisConfig = serde_json::from_str(text)?;
        config.peaks.validate()?;
        Ok(config)
    }
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
