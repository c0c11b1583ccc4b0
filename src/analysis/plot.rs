use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::coord::Shift;
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use crate::analysis::error::AnalysisError;
use crate::analysis::pipeline::AnalysisReport;
/// L-shaped scale bar replacing (or accompanying) the axis ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scalebar {
    pub hide_ticks: bool,
    /// Horizontal bar length in ms; half a tick step when unset.
    pub x_size: Option<f64>,
    /// Vertical bar length in mV; half a tick step when unset.
    pub y_size: Option<f64>,
}
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AxisStyle {
    Ticks,
    Scalebar(Scalebar),
    /// No mesh, labels or bar.
    Hidden,
}
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub palette: Vec<RGBColor>,
    pub marker_color: RGBColor,
    pub title: Option<String>,
    /// Fixed voltage range; fitted to the data when unset.
    pub y_limits: Option<(f64, f64)>,
    pub axes: AxisStyle,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            background: WHITE,
            foreground: BLACK,
            palette: vec![RED, BLUE, GREEN, CYAN, MAGENTA, RGBColor(255, 140, 0), BLACK],
            marker_color: BLUE,
            title: None,
            y_limits: None,
            axes: AxisStyle::Ticks,
        }
    }
}
/// Render the report's traces in ms/mV with its peak markers on top.
pub fn render_report_png(report: &AnalysisReport, style: &PlotStyle) -> Result<Vec<u8>, AnalysisError> {
    let (minima, maxima) = match &report.peaks {
        Some(peaks) => (Some(peaks.minima.as_slice()), Some(peaks.maxima.as_slice())),
        None => (None, None),
    };
    render_traces_png(
        &report.traces,
        report.sample_period_secs(),
        &[minima, maxima],
        style,
    )
}
pub fn render_traces_png(
    traces: &[Vec<f64>],
    sample_period_secs: f64,
    markers: &[Option<&[Option<f64>]>],
    style: &PlotStyle,
) -> Result<Vec<u8>, AnalysisError> {
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        draw_traces(&root, traces, sample_period_secs, markers, style)?;
    }
    encode_png(&buffer, style.width, style.height)
}
/// Same drawing as [`render_report_png`], as an SVG document.
pub fn render_report_svg(report: &AnalysisReport, style: &PlotStyle) -> Result<String, AnalysisError> {
    let (minima, maxima) = match &report.peaks {
        Some(peaks) => (Some(peaks.minima.as_slice()), Some(peaks.maxima.as_slice())),
        None => (None, None),
    };
    render_traces_svg(
        &report.traces,
        report.sample_period_secs(),
        &[minima, maxima],
        style,
    )
}
pub fn render_traces_svg(
    traces: &[Vec<f64>],
    sample_period_secs: f64,
    markers: &[Option<&[Option<f64>]>],
    style: &PlotStyle,
) -> Result<String, AnalysisError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (style.width, style.height)).into_drawing_area();
        draw_traces(&root, traces, sample_period_secs, markers, style)?;
    }
    Ok(svg)
}
fn draw_traces<DB>(
    root: &DrawingArea<DB, Shift>,
    traces: &[Vec<f64>],
    sample_period_secs: f64,
    markers: &[Option<&[Option<f64>]>],
    style: &PlotStyle,
) -> Result<(), AnalysisError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let longest = traces.iter().map(Vec::len).max().unwrap_or(0);
    if longest == 0 {
        return Err(AnalysisError::Plot("no samples to plot".into()));
    }
    let to_ms = |i: usize| i as f64 * sample_period_secs * 1000.0;
    let x_range = 0.0..to_ms(longest.saturating_sub(1)).max(f64::EPSILON);
    let (y_min, y_max) = style.y_limits.unwrap_or_else(|| fitted_range(traces));
    root.fill(&style.background)?;
    let draw_ticks = match style.axes {
        AxisStyle::Ticks => true,
        AxisStyle::Scalebar(bar) => !bar.hide_ticks,
        AxisStyle::Hidden => false,
    };
    let mut builder = ChartBuilder::on(root);
    builder.margin(10);
    if let Some(title) = &style.title {
        builder.caption(title, ("sans-serif", 20).into_font().color(&style.foreground));
    }
    if draw_ticks {
        builder
            .set_label_area_size(LabelAreaPosition::Left, 50)
            .set_label_area_size(LabelAreaPosition::Bottom, 40);
    }
    let mut chart = builder.build_cartesian_2d(x_range.clone(), y_min..y_max)?;
    if draw_ticks {
        chart
            .configure_mesh()
            .x_desc("Time [ms]")
            .y_desc("Voltage [mV]")
            .light_line_style(&style.foreground.mix(0.05))
            .draw()?;
    }
    for (idx, trace) in traces.iter().enumerate() {
        let color = style.palette[idx % style.palette.len()];
        let series = trace.iter().enumerate().map(|(i, v)| (to_ms(i), *v));
        chart.draw_series(LineSeries::new(series, &color))?;
    }
    for sequence in markers.iter().flatten() {
        let points = sequence
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.map(|v| (to_ms(i), v)));
        chart.draw_series(
            points.map(|point| Circle::new(point, 3, style.marker_color.filled())),
        )?;
    }
    if let AxisStyle::Scalebar(bar) = style.axes {
        let x_size = bar.x_size.unwrap_or_else(|| nice_step(x_range.end) / 2.0);
        let y_size = bar.y_size.unwrap_or_else(|| nice_step(y_max - y_min) / 2.0);
        let x_span = x_range.end - x_range.start;
        let y_span = y_max - y_min;
        let right = x_range.end - 0.10 * x_span;
        let left = right - x_size;
        let bottom = y_min + 0.05 * y_span;
        let top = bottom + y_size;
        let pen = style.foreground.stroke_width(2);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(left, bottom), (right, bottom), (right, top)],
            pen,
        )))?;
        let font = ("sans-serif", 14).into_font().color(&style.foreground);
        chart.draw_series([
            Text::new(
                format!("{x_size} ms"),
                ((left + right) / 2.0, bottom - 0.01 * y_span),
                font.clone(),
            ),
            Text::new(
                format!("{y_size} mV"),
                (right + 0.01 * x_span, (bottom + top) / 2.0),
                font,
            ),
        ])?;
    }
    root.present()?;
    Ok(())
}
fn fitted_range(traces: &[Vec<f64>]) -> (f64, f64) {
    let (min, max) = traces
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !(min.is_finite() && max.is_finite()) || (max - min).abs() < f64::EPSILON {
        let center = if min.is_finite() { min } else { 0.0 };
        return (center - 1.0, center + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}
/// 1, 2 or 5 times a power of ten, roughly a tenth of `span`.
fn nice_step(span: f64) -> f64 {
    if !(span.is_finite() && span > 0.0) {
        return 1.0;
    }
    let raw = span / 10.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let scaled = raw / magnitude;
    let factor = if scaled < 1.5 {
        1.0
    } else if scaled < 3.5 {
        2.0
    } else if scaled < 7.5 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, AnalysisError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| AnalysisError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    #[test]
    fn traces_with_markers_render_to_png() {
        let trace: Vec<f64> = (0..400).map(|i| -60.0 + (i as f64 / 20.0).sin()).collect();
        let mut maxima = vec![None; 400];
        maxima[31] = Some(trace[31]);
        let style = PlotStyle {
            width: 320,
            height: 200,
            axes: AxisStyle::Hidden,
            ..PlotStyle::default()
        };
        let png = render_traces_png(&[trace], 5e-5, &[None, Some(maxima.as_slice())], &style).unwrap();
        assert!(png.starts_with(&PNG_MAGIC));
    }
    #[test]
    fn traces_render_to_svg_document() {
        let trace: Vec<f64> = (0..200).map(|i| (i as f64 / 10.0).cos()).collect();
        let mut minima = vec![None; 200];
        minima[31] = Some(trace[31]);
        let style = PlotStyle {
            width: 320,
            height: 200,
            axes: AxisStyle::Hidden,
            ..PlotStyle::default()
        };
        let svg = render_traces_svg(&[trace], 5e-5, &[Some(minima.as_slice())], &style).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<circle"));
        assert!(render_traces_svg(&[], 5e-5, &[], &style).is_err());
    }
    #[test]
    fn nothing_to_plot_is_an_error() {
        let err = render_traces_png(&[], 5e-5, &[], &PlotStyle::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::Plot(_)));
    }
    #[test]
    fn flat_traces_get_a_nonzero_range() {
        assert_eq!(fitted_range(&[vec![-60.0; 10]]), (-61.0, -59.0));
    }
    #[test]
    fn scalebar_steps_are_round() {
        assert_eq!(nice_step(100.0), 10.0);
        assert_eq!(nice_step(25.0), 2.0);
        assert_eq!(nice_step(0.0), 1.0);
    }
}
