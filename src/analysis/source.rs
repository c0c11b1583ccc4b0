use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use log::debug;
use crate::analysis::{AnalysisError, SweepSet};
/// One recording: every sweep of a single experiment file.
#[derive(Clone, Debug)]
pub struct Recording {
    pub label: String,
    pub sweeps: SweepSet,
}
/// Trait representing something that can yield recordings on demand.
pub trait SweepSource {
    fn next_recording(&mut self) -> Result<Option<Recording>, AnalysisError>;
}
/// In-memory source useful for tests and deterministic playback.
pub struct ManualSource {
    queue: VecDeque<Recording>,
}
impl ManualSource {
    pub fn new(recordings: impl IntoIterator<Item = Recording>) -> Self {
        Self {
            queue: recordings.into_iter().collect(),
        }
    }
}
impl SweepSource for ManualSource {
    fn next_recording(&mut self) -> Result<Option<Recording>, AnalysisError> {
        Ok(self.queue.pop_front())
    }
}
/// Reads exported wave data: a JSON array of rows, one row per time point
/// with one value per sweep. `null` marks a missing sample.
pub struct JsonRowsSource {
    paths: VecDeque<PathBuf>,
    sample_period_secs: f64,
}
impl JsonRowsSource {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>, sample_period_secs: f64) -> Self {
        Self {
            paths: paths.into_iter().collect(),
            sample_period_secs,
        }
    }
}
impl SweepSource for JsonRowsSource {
    fn next_recording(&mut self) -> Result<Option<Recording>, AnalysisError> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };
        let rows = read_rows_json(&path)?;
        debug!("{}: {} rows", path.display(), rows.len());
        Ok(Some(Recording {
            label: recording_label(&path),
            sweeps: SweepSet::from_rows(&rows, self.sample_period_secs)?,
        }))
    }
}
/// Parse a rows file; `null` cells come back as NaN.
pub fn read_rows_json(path: &Path) -> Result<Vec<Vec<f64>>, AnalysisError> {
    let reader = BufReader::new(File::open(path)?);
    let rows: Vec<Vec<Option<f64>>> = serde_json::from_reader(reader)?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        .collect())
}
fn recording_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_owned())
}
