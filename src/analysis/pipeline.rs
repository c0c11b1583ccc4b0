use std::fmt;
use std::str::FromStr;
use log::info;
use crate::analysis::alternation::enforce_alternation;
use crate::analysis::error::AnalysisError;
use crate::analysis::integral::{baseline_area, first_response_area, ResponseArea};
use crate::analysis::peaks::{MarkerSequence, PeakExtractor, Polarity};
use crate::analysis::source::SweepSource;
use crate::analysis::table::{PeakTable, PeakTableBuilder};
use crate::analysis::SweepSet;
use crate::config::AnalysisConfig;
/// How the sweeps of a recording are combined before analysis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Every sweep overlaid.
    Stacked,
    /// Sweeps concatenated into one long trace.
    InARow,
    FirstLast,
    /// Point-wise average with peak extraction.
    #[default]
    Average,
}
impl FromStr for ViewMode {
    type Err = AnalysisError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "stacked" => Ok(ViewMode::Stacked),
            "in-a-row" => Ok(ViewMode::InARow),
            "first-last" => Ok(ViewMode::FirstLast),
            "average" => Ok(ViewMode::Average),
            other => Err(AnalysisError::InvalidInput(format!("unknown view mode `{other}`"))),
        }
    }
}
impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewMode::Stacked => "stacked",
            ViewMode::InARow => "in-a-row",
            ViewMode::FirstLast => "first-last",
            ViewMode::Average => "average",
        };
        f.write_str(name)
    }
}
/// Alternating markers of one trace plus the paired amplitude table.
#[derive(Clone, Debug, PartialEq)]
pub struct TracePeaks {
    pub minima: MarkerSequence,
    pub maxima: MarkerSequence,
    pub table: PeakTable,
}
/// Result of analysing one recording.
#[derive(Clone, Debug)]
pub struct AnalysisReport {
    pub label: String,
    pub mode: ViewMode,
    pub sweeps: SweepSet,
    /// Traces to display, in the order they should be drawn.
    pub traces: Vec<Vec<f64>>,
    /// Present in [`ViewMode::Average`] only; belongs to `traces[0]`.
    pub peaks: Option<TracePeaks>,
    /// Baseline-corrected area per analysed trace.
    pub baseline_areas: Vec<f64>,
    pub first_response: Option<ResponseArea>,
}
impl AnalysisReport {
    pub fn sample_period_secs(&self) -> f64 {
        self.sweeps.sample_period_secs()
    }
}
/// Maxima scan, minima scan, alternation and pairing for a single trace.
pub fn detect_peaks(samples: &[f64], config: &AnalysisConfig) -> Result<TracePeaks, AnalysisError> {
    let extractor = PeakExtractor::new(config.peaks);
    let scan = |polarity| {
        if config.exploratory {
            extractor.explore(samples, polarity)
        } else {
            extractor.scan(samples, &config.schedule, polarity)
        }
    };
    let maxima = scan(Polarity::Maxima)?;
    let minima = scan(Polarity::Minima)?;
    let (minima, maxima) = enforce_alternation(minima, maxima);
    let table = PeakTableBuilder::new(&config.peaks).build_table(&maxima, &minima);
    Ok(TracePeaks {
        minima,
        maxima,
        table,
    })
}
/// High level pipeline that pulls recordings and produces reports.
pub struct AnalysisPipeline<S: SweepSource> {
    source: S,
    config: AnalysisConfig,
    mode: ViewMode,
}
impl<S: SweepSource> AnalysisPipeline<S> {
    pub fn new(source: S, config: AnalysisConfig, mode: ViewMode) -> Result<Self, AnalysisError> {
        config.peaks.validate()?;
        Ok(Self {
            source,
            config,
            mode,
        })
    }
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
    pub fn pump_once(&mut self) -> Result<Option<AnalysisReport>, AnalysisError> {
        let Some(recording) = self.source.next_recording()? else {
            return Ok(None);
        };
        let report = self.analyze(recording.label, recording.sweeps)?;
        Ok(Some(report))
    }
    pub fn analyze(&self, label: String, sweeps: SweepSet) -> Result<AnalysisReport, AnalysisError> {
        info!(
            "{label}: {} sweeps x {} samples, {:.3} s per sweep",
            sweeps.num_sweeps(),
            sweeps.samples_per_sweep(),
            sweeps.recording_time_secs()
        );
        let mut peaks = None;
        let mut baseline_areas = Vec::new();
        let mut first_response = None;
        let traces = match self.mode {
            ViewMode::Stacked => sweeps.to_sweeps(),
            ViewMode::InARow => vec![sweeps.joined()],
            ViewMode::FirstLast => {
                let traces = vec![sweeps.first(), sweeps.last()];
                baseline_areas = traces.iter().map(|t| baseline_area(t)).collect();
                traces
            }
            ViewMode::Average => {
                let average = sweeps.average();
                let detected = detect_peaks(&average, &self.config)?;
                info!("{label}: {} peak pairs", detected.table.len());
                baseline_areas.push(baseline_area(&average));
                first_response = Some(first_response_area(&average, self.config.schedule.start));
                peaks = Some(detected);
                vec![average]
            }
        };
        for (i, area) in baseline_areas.iter().enumerate() {
            info!("{label}: baseline area of trace {i}: {area:.3}");
        }
        Ok(AnalysisReport {
            label,
            mode: self.mode,
            sweeps,
            traces,
            peaks,
            baseline_areas,
            first_response,
        })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::peaks::ScanSchedule;
    use crate::analysis::source::{ManualSource, Recording};
    const DT: f64 = 5e-5;
    /// Resting at -60 mV with a dip then a rise every 400 samples.
    fn evoked_sweep(offset: f64) -> Vec<f64> {
        let mut samples = vec![-60.0 + offset; 4_096];
        for start in (800..4_096).step_by(400) {
            samples[start + 10] = -70.0 + offset;
            samples[start + 30] = -45.0 + offset;
        }
        samples
    }
    fn recording(label: &str) -> Recording {
        let sweeps = vec![evoked_sweep(0.0), evoked_sweep(1.0), evoked_sweep(2.0)];
        Recording {
            label: label.into(),
            sweeps: SweepSet::from_sweeps(&sweeps, DT).unwrap(),
        }
    }
    fn config() -> AnalysisConfig {
        AnalysisConfig {
            // start 800, step 400, interval 64 samples on a 4096 sample sweep
            schedule: ScanSchedule {
                start: 0.390625,
                step: 0.1953125,
                interval: 0.03125,
                num_intervals: 5,
            },
            ..AnalysisConfig::default()
        }
    }
    #[test]
    fn average_mode_pairs_every_response() {
        let source = ManualSource::new(vec![recording("cell")]);
        let mut pipeline = AnalysisPipeline::new(source, config(), ViewMode::Average).unwrap();
        let report = pipeline.pump_once().unwrap().unwrap();
        assert_eq!(report.traces.len(), 1);
        let peaks = report.peaks.unwrap();
        assert_eq!(peaks.table.len(), 5);
        for (i, row) in peaks.table.rows.iter().enumerate() {
            let min = row.minimum.unwrap();
            assert_eq!(min.index, 800 + 400 * i + 10);
            assert_eq!(row.maximum.index, 800 + 400 * i + 30);
            assert!((row.amplitude.unwrap() - 25.0).abs() < 1e-9);
        }
        assert_eq!(report.baseline_areas.len(), 1);
        assert!(report.first_response.is_some());
        assert!(pipeline.pump_once().unwrap().is_none());
    }
    #[test]
    fn other_modes_skip_peak_extraction() {
        let source = ManualSource::new(vec![recording("a"), recording("b"), recording("c")]);
        let mut pipeline = AnalysisPipeline::new(source, config(), ViewMode::Stacked).unwrap();
        let stacked = pipeline.pump_once().unwrap().unwrap();
        assert_eq!(stacked.traces.len(), 3);
        assert!(stacked.peaks.is_none());
        let joined = AnalysisPipeline::new(ManualSource::new(vec![]), config(), ViewMode::InARow)
            .unwrap()
            .analyze("b".into(), recording("b").sweeps)
            .unwrap();
        assert_eq!(joined.traces, vec![recording("b").sweeps.joined()]);
        let first_last =
            AnalysisPipeline::new(ManualSource::new(vec![]), config(), ViewMode::FirstLast)
                .unwrap()
                .analyze("c".into(), recording("c").sweeps)
                .unwrap();
        assert_eq!(first_last.traces.len(), 2);
        assert_eq!(first_last.baseline_areas.len(), 2);
    }
    #[test]
    fn view_mode_names_parse() {
        assert_eq!("in_a_row".parse::<ViewMode>().unwrap(), ViewMode::InARow);
        assert_eq!("First-Last".parse::<ViewMode>().unwrap(), ViewMode::FirstLast);
        assert_eq!(ViewMode::Average.to_string(), "average");
        assert!("overlay".parse::<ViewMode>().is_err());
    }
}
