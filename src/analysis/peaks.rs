use std::fmt;
use std::str::FromStr;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use crate::analysis::error::AnalysisError;
use crate::analysis::table::count_spaced_peaks;
use crate::config::{PeakSettings, EXPLORATORY_DIVISOR};
/// One entry per input sample: the extremum found there, or `None`.
pub type MarkerSequence = Vec<Option<f64>>;
/// Which kind of extremum a scan is looking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    Maxima,
    Minima,
}
impl Polarity {
    /// `value >= other` for maxima, `value <= other` for minima.
    pub fn holds(self, value: f64, other: f64) -> bool {
        match self {
            Polarity::Maxima => value >= other,
            Polarity::Minima => value <= other,
        }
    }
}
impl FromStr for Polarity {
    type Err = AnalysisError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maxima" | "greater_equal" => Ok(Polarity::Maxima),
            "min" | "minima" | "less_equal" => Ok(Polarity::Minima),
            other => Err(AnalysisError::InvalidInput(format!(
                "unknown polarity `{other}`, expected `max` or `min`"
            ))),
        }
    }
}
impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Maxima => write!(f, "maxima"),
            Polarity::Minima => write!(f, "minima"),
        }
    }
}
/// Window schedule for [`PeakExtractor::scan`].
///
/// `start`, `step` and `interval` are fractions of *half* the sequence length.
/// This is a fixed legacy unit kept for compatibility with existing analysis
/// parameters (e.g. `start = 0.2` on a 20 000 sample sweep is sample 2 000).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSchedule {
    pub start: f64,
    pub step: f64,
    pub interval: f64,
    /// Windows to attempt; `0` keeps going until the sequence ends.
    pub num_intervals: usize,
}
impl Default for ScanSchedule {
    fn default() -> Self {
        // Monosynaptic input: first 10 responses, 200 ms in, every 100 ms.
        Self {
            start: 0.2,
            step: 0.1,
            interval: 0.002,
            num_intervals: 10,
        }
    }
}
impl ScanSchedule {
    /// A single window covering the whole sequence.
    pub fn whole_sequence() -> Self {
        Self {
            start: 0.0,
            step: 2.0,
            interval: 2.0,
            num_intervals: 1,
        }
    }
    pub fn resolve(&self, len: usize) -> ResolvedSchedule {
        ResolvedSchedule {
            start_idx: to_sample_count(self.start, len),
            step_idx: to_sample_count(self.step, len),
            interval_idx: to_sample_count(self.interval, len),
            num_intervals: self.num_intervals,
        }
    }
}
/// Schedule converted to sample counts for a concrete sequence length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedSchedule {
    pub start_idx: usize,
    pub step_idx: usize,
    pub interval_idx: usize,
    pub num_intervals: usize,
}
// Truncates toward zero; negative and NaN fractions saturate to 0.
fn to_sample_count(fraction: f64, len: usize) -> usize {
    (fraction * len as f64 / 2.0) as usize
}
/// Locate relative extrema in `window` and keep those on the polarity's side
/// of the window mean.
///
/// The neighbourhood half-width is `window.len() / divisor`; indices beyond the
/// window edges are clipped to the edge sample. Inside a run of equal
/// extrema only the first sample is reported. Windows shorter than two
/// samples never contain a peak.
pub fn extract_window_peaks(window: &[f64], polarity: Polarity, divisor: usize) -> MarkerSequence {
    let mut markers = vec![None; window.len()];
    if window.len() < 2 {
        return markers;
    }
    let order = window.len() / divisor.max(1);
    if order == 0 {
        return markers;
    }
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    let mut last_extremum: Option<usize> = None;
    for (i, &value) in window.iter().enumerate() {
        if !is_relative_extremum(window, i, order, polarity) {
            continue;
        }
        let continues_tie = i > 0 && last_extremum == Some(i - 1) && window[i - 1] == value;
        last_extremum = Some(i);
        if continues_tie {
            continue;
        }
        if polarity.holds(value, mean) {
            markers[i] = Some(value);
        }
    }
    markers
}
fn is_relative_extremum(window: &[f64], i: usize, order: usize, polarity: Polarity) -> bool {
    let lo = i.saturating_sub(order);
    let hi = (i + order).min(window.len() - 1);
    let center = window[i];
    window[lo..=hi]
        .iter()
        .all(|&neighbour| polarity.holds(center, neighbour))
}
/// Windowed extremum search over a whole sweep.
#[derive(Clone, Debug)]
pub struct PeakExtractor {
    settings: PeakSettings,
}
impl PeakExtractor {
    pub fn new(settings: PeakSettings) -> Self {
        Self { settings }
    }
    pub fn settings(&self) -> &PeakSettings {
        &self.settings
    }
    /// Run the windowed search described by `schedule`.
    ///
    /// The result always has `samples.len()` entries. Windows that would run
    /// past the end are skipped but still count towards `num_intervals`.
    /// Overlapping windows (`step < interval`) are written in order, so the
    /// later window owns the shared samples.
    pub fn scan(
        &self,
        samples: &[f64],
        schedule: &ScanSchedule,
        polarity: Polarity,
    ) -> Result<MarkerSequence, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "cannot scan an empty sample sequence".into(),
            ));
        }
        let resolved = schedule.resolve(samples.len());
        let mut markers: MarkerSequence = vec![None; samples.len()];
        let mut attempted = 0usize;
        let mut start = resolved.start_idx;
        while start < samples.len() {
            let end = start.saturating_add(resolved.interval_idx);
            if end <= samples.len() {
                let window = extract_window_peaks(
                    &samples[start..end],
                    polarity,
                    self.settings.window_divisor,
                );
                markers[start..end].copy_from_slice(&window);
            } else {
                debug!("window {start}..{end} exceeds {} samples, skipped", samples.len());
            }
            attempted += 1;
            // A zero step would revisit the same window forever.
            if attempted == resolved.num_intervals || resolved.step_idx == 0 {
                break;
            }
            match start.checked_add(resolved.step_idx) {
                Some(next) => start = next,
                None => break,
            }
        }
        let found = count_spaced_peaks(&markers, self.settings.min_peak_spacing);
        info!(
            "scan {polarity}: start={}, step={}, interval={}, found {found} peaks",
            resolved.start_idx, resolved.step_idx, resolved.interval_idx
        );
        Ok(markers)
    }
    /// Unscheduled search over the whole sequence with the coarse
    /// exploratory neighbourhood (`len / 25`).
    pub fn explore(&self, samples: &[f64], polarity: Polarity) -> Result<MarkerSequence, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "cannot scan an empty sample sequence".into(),
            ));
        }
        let markers = extract_window_peaks(samples, polarity, EXPLORATORY_DIVISOR);
        let found = count_spaced_peaks(&markers, self.settings.min_peak_spacing);
        info!(
            "explore {polarity}: order={}, found {found} peaks",
            samples.len() / EXPLORATORY_DIVISOR
        );
        Ok(markers)
    }
}
