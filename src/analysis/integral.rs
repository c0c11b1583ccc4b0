//! Area-under-curve helpers for averaged traces.
//!
//! Integrals are taken over sample indices (dx = 1 sample) unless stated
//! otherwise, so they are comparable between sweeps of one rig but carry no
//! physical time unit.
use serde::Serialize;
/// Samples skipped after the response start before looking for the return
/// below baseline.
pub const RESPONSE_SETTLE_SAMPLES: usize = 200;
/// Composite Simpson's rule with uniform spacing `dx`.
///
/// For an even number of samples the result is the mean of the two ways of
/// closing the last interval with a trapezoid (first or last interval).
pub fn simpson(ys: &[f64], dx: f64) -> f64 {
    let n = ys.len();
    if n < 2 {
        return 0.0;
    }
    if n % 2 == 1 {
        return simpson_odd(ys, dx);
    }
    let trapezoid_last = simpson_odd(&ys[..n - 1], dx) + 0.5 * dx * (ys[n - 2] + ys[n - 1]);
    let trapezoid_first = 0.5 * dx * (ys[0] + ys[1]) + simpson_odd(&ys[1..], dx);
    0.5 * (trapezoid_last + trapezoid_first)
}
fn simpson_odd(ys: &[f64], dx: f64) -> f64 {
    let n = ys.len();
    if n < 3 {
        return 0.0;
    }
    let inner: f64 = ys[1..n - 1]
        .iter()
        .enumerate()
        .map(|(i, y)| if i % 2 == 0 { 4.0 * y } else { 2.0 * y })
        .sum();
    (ys[0] + inner + ys[n - 1]) * dx / 3.0
}
/// Integral of the trace above its own minimum.
pub fn baseline_area(ys: &[f64]) -> f64 {
    let min = ys.iter().copied().fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return 0.0;
    }
    let shifted: Vec<f64> = ys.iter().map(|y| y - min).collect();
    simpson(&shifted, 1.0)
}
/// Span and area of the first evoked response.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResponseArea {
    pub start: usize,
    pub end: usize,
    pub area: f64,
}
/// Integrate the first response of `ys`.
///
/// `start` uses the same half-length fraction unit as
/// [`ScanSchedule`](crate::analysis::ScanSchedule). The baseline is `ys[0]`;
/// the response ends at the first sample more than
/// [`RESPONSE_SETTLE_SAMPLES`] past the start that falls below baseline.
/// The raw samples of that span are integrated. When the trace never falls
/// back below baseline the span is empty.
pub fn first_response_area(ys: &[f64], start: f64) -> ResponseArea {
    let start = (start * ys.len() as f64 / 2.0) as usize;
    let Some(&baseline) = ys.first() else {
        return ResponseArea {
            start,
            end: start,
            area: 0.0,
        };
    };
    let end = ys
        .iter()
        .enumerate()
        .find(|&(i, &v)| i > start.saturating_add(RESPONSE_SETTLE_SAMPLES) && v < baseline)
        .map(|(i, _)| i)
        .unwrap_or(start);
    let area = if end > start {
        simpson(&ys[start..end], 1.0)
    } else {
        0.0
    };
    ResponseArea { start, end, area }
}
