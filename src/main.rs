// src/main.rs
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use evoked_peaks::analysis::export::{
    output_path, save_png, save_svg, save_sweeps_json, save_table_csv, save_table_json,
};
use evoked_peaks::analysis::{
    render_report_png, render_report_svg, AnalysisPipeline, AnalysisReport, AxisStyle,
    JsonRowsSource, PeakTable, PlotStyle, ViewMode,
};
use evoked_peaks::config::AnalysisConfig;
/// Extract evoked response peaks from exported sweep recordings.
#[derive(Parser)]
#[command(name = "evoked-peaks")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Recording files (JSON rows: one row per time point, one value per sweep)
    #[arg(short, long, value_name = "FILE", required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// How sweeps are combined: stacked, in-a-row, first-last, average
    #[arg(short, long, default_value = "average")]
    mode: ViewMode,

    /// JSON config file; command line values override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start of the first peak window (fraction of half a sweep)
    #[arg(long)]
    start: Option<f64>,

    /// Distance between peak windows (fraction of half a sweep)
    #[arg(long)]
    step: Option<f64>,

    /// Width of each peak window (fraction of half a sweep)
    #[arg(long)]
    interval: Option<f64>,

    /// Number of peak windows, 0 for all
    #[arg(long)]
    num_intervals: Option<usize>,

    /// Search whole sweeps instead of scheduled windows
    #[arg(long)]
    explore: bool,

    /// Directory for plots and tables
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Skip rendering plots
    #[arg(long)]
    no_plot: bool,

    /// Also store the cleaned sweep data as JSON
    #[arg(long)]
    store: bool,

    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}
impl Cli {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };
        if let Some(start) = self.start {
            config.schedule.start = start;
        }
        if let Some(step) = self.step {
            config.schedule.step = step;
        }
        if let Some(interval) = self.interval {
            config.schedule.interval = interval;
        }
        if let Some(num_intervals) = self.num_intervals {
            config.schedule.num_intervals = num_intervals;
        }
        config.exploratory |= self.explore;
        Ok(config)
    }
}
fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
    let config = cli.analysis_config()?;
    let style = plot_style(&config);
    let source = JsonRowsSource::new(cli.input.clone(), config.peaks.sample_period_secs);
    let mut pipeline = AnalysisPipeline::new(source, config, cli.mode)?;
    while let Some(report) = pipeline.pump_once().context("failed to analyze recording")? {
        print_summary(&report);
        write_outputs(&cli, &report, &style)
            .with_context(|| format!("failed to write outputs for {}", report.label))?;
    }
    Ok(())
}
fn plot_style(config: &AnalysisConfig) -> PlotStyle {
    PlotStyle {
        y_limits: config.y_limits,
        axes: config
            .scalebar
            .map(AxisStyle::Scalebar)
            .unwrap_or(AxisStyle::Ticks),
        ..PlotStyle::default()
    }
}
fn print_summary(report: &AnalysisReport) {
    println!(
        "{}: {} sweeps, {} samples per sweep, recording time {:.4} s",
        report.label,
        report.sweeps.num_sweeps(),
        report.sweeps.samples_per_sweep(),
        report.sweeps.recording_time_secs()
    );
    if let Some(peaks) = &report.peaks {
        print_table(&peaks.table);
    }
    for (i, area) in report.baseline_areas.iter().enumerate() {
        println!("integral [{i}]: {area:.3}");
    }
    if let Some(response) = report.first_response {
        println!(
            "first response: samples {}..{}, area {:.3}",
            response.start, response.end, response.area
        );
    }
}
fn print_table(table: &PeakTable) {
    if table.is_empty() {
        warn!("no peaks found");
        return;
    }
    println!("{}", PeakTable::HEADER.join("\t"));
    for row in &table.rows {
        println!("{}", row.to_record().join("\t"));
    }
}
fn write_outputs(cli: &Cli, report: &AnalysisReport, style: &PlotStyle) -> Result<()> {
    let stem = format!("{}_{}", report.label, report.mode);
    if !cli.no_plot {
        let png = render_report_png(report, style)?;
        save_png(&png, &output_path(&cli.output_dir, &stem, "png")?)?;
        let svg = render_report_svg(report, style)?;
        save_svg(&svg, &output_path(&cli.output_dir, &stem, "svg")?)?;
    }
    if let Some(peaks) = &report.peaks {
        save_table_csv(&peaks.table, &output_path(&cli.output_dir, &stem, "csv")?)?;
        save_table_json(&peaks.table, &output_path(&cli.output_dir, &stem, "json")?)?;
    }
    if cli.store {
        let path = output_path(&cli.output_dir, &report.label, "sweeps.json")?;
        save_sweeps_json(&report.sweeps, &path)?;
    }
    info!("{}: done", report.label);
    Ok(())
}
