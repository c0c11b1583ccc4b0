// src/analysis/mod.rs
pub mod alternation;
pub mod error;
pub mod export;
pub mod integral;
pub mod peaks;
pub mod pipeline;
pub mod plot;
pub mod source;
pub mod sweeps;
pub mod table;
pub use alternation::enforce_alternation;
pub use error::AnalysisError;
pub use integral::{baseline_area, first_response_area, simpson, ResponseArea};
pub use peaks::{extract_window_peaks, MarkerSequence, PeakExtractor, Polarity, ResolvedSchedule, ScanSchedule};
pub use pipeline::{detect_peaks, AnalysisPipeline, AnalysisReport, TracePeaks, ViewMode};
pub use plot::{
    render_report_png, render_report_svg, render_traces_png, render_traces_svg, AxisStyle,
    PlotStyle, Scalebar,
};
pub use source::{JsonRowsSource, ManualSource, Recording, SweepSource};
pub use sweeps::SweepSet;
pub use table::{count_spaced_peaks, PeakPoint, PeakRow, PeakTable, PeakTableBuilder};
