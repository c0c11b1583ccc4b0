use ndarray::{Array2, ArrayView1, Axis};
use crate::analysis::AnalysisError;
/// All sweeps of one recording, stored sweeps x samples.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepSet {
    data: Array2<f64>,
    sample_period_secs: f64,
}
impl SweepSet {
    /// Build from the instrument layout: one row per time point, one column
    /// per sweep.
    pub fn from_rows(rows: &[Vec<f64>], sample_period_secs: f64) -> Result<Self, AnalysisError> {
        let num_sweeps = uniform_width(rows)?;
        let data = Array2::from_shape_fn((num_sweeps, rows.len()), |(sweep, t)| {
            neutralize(rows[t][sweep])
        });
        Self::from_array(data, sample_period_secs)
    }
    /// Build from one sample sequence per sweep.
    pub fn from_sweeps(sweeps: &[Vec<f64>], sample_period_secs: f64) -> Result<Self, AnalysisError> {
        let num_samples = uniform_width(sweeps)?;
        let data = Array2::from_shape_fn((sweeps.len(), num_samples), |(sweep, t)| {
            neutralize(sweeps[sweep][t])
        });
        Self::from_array(data, sample_period_secs)
    }
    fn from_array(data: Array2<f64>, sample_period_secs: f64) -> Result<Self, AnalysisError> {
        if !(sample_period_secs.is_finite() && sample_period_secs > 0.0) {
            return Err(AnalysisError::InvalidInput(format!(
                "sample period must be positive, got {sample_period_secs}"
            )));
        }
        Ok(Self {
            data,
            sample_period_secs,
        })
    }
    pub fn num_sweeps(&self) -> usize {
        self.data.nrows()
    }
    pub fn samples_per_sweep(&self) -> usize {
        self.data.ncols()
    }
    pub fn sample_period_secs(&self) -> f64 {
        self.sample_period_secs
    }
    pub fn recording_time_secs(&self) -> f64 {
        self.samples_per_sweep() as f64 * self.sample_period_secs
    }
    pub fn sweep(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.num_sweeps()).then(|| self.data.row(index))
    }
    pub fn sweeps(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.data.outer_iter()
    }
    pub fn to_sweeps(&self) -> Vec<Vec<f64>> {
        self.sweeps().map(|s| s.to_vec()).collect()
    }
    /// Back to the instrument layout (time points x sweeps).
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.t().outer_iter().map(|row| row.to_vec()).collect()
    }
    /// Point-wise mean across sweeps.
    pub fn average(&self) -> Vec<f64> {
        self.data
            .mean_axis(Axis(0))
            .map(|mean| mean.to_vec())
            .unwrap_or_default()
    }
    /// Every sweep back to back.
    pub fn joined(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }
    pub fn first(&self) -> Vec<f64> {
        self.data.row(0).to_vec()
    }
    pub fn last(&self) -> Vec<f64> {
        self.data.row(self.num_sweeps() - 1).to_vec()
    }
}
/// Width shared by every row; rejects empty and ragged input.
fn uniform_width(rows: &[Vec<f64>]) -> Result<usize, AnalysisError> {
    let expected = rows.first().map(Vec::len).unwrap_or(0);
    if expected == 0 {
        return Err(AnalysisError::NoSweeps);
    }
    if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
        return Err(AnalysisError::RaggedSweeps {
            row,
            expected,
            actual: values.len(),
        });
    }
    Ok(expected)
}
/// NaN becomes 0, infinities clamp to the finite range.
fn neutralize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else if value == f64::INFINITY {
        f64::MAX
    } else if value == f64::NEG_INFINITY {
        f64::MIN
    } else {
        value
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    const DT: f64 = 5e-5;
    fn rows() -> Vec<Vec<f64>> {
        // 4 time points x 3 sweeps
        vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, f64::NAN, 9.0],
            vec![10.0, 11.0, 12.0],
        ]
    }
    #[test]
    fn rows_are_transposed_into_sweeps() {
        let set = SweepSet::from_rows(&rows(), DT).unwrap();
        assert_eq!(set.num_sweeps(), 3);
        assert_eq!(set.samples_per_sweep(), 4);
        assert_eq!(set.first(), vec![1.0, 4.0, 7.0, 10.0]);
        assert_eq!(set.sweep(1).unwrap().to_vec(), vec![2.0, 5.0, 0.0, 11.0]);
        assert_eq!(set.last(), vec![3.0, 6.0, 9.0, 12.0]);
        assert!(set.sweep(3).is_none());
        assert!((set.recording_time_secs() - 4.0 * DT).abs() < 1e-15);
    }
    #[test]
    fn average_and_join() {
        let set = SweepSet::from_rows(&rows(), DT).unwrap();
        assert_eq!(set.average(), vec![2.0, 5.0, 16.0 / 3.0, 11.0]);
        let joined = set.joined();
        assert_eq!(joined.len(), 12);
        assert_eq!(&joined[..4], &[1.0, 4.0, 7.0, 10.0]);
        assert_eq!(&joined[8..], &[3.0, 6.0, 9.0, 12.0]);
    }
    #[test]
    fn rows_round_trip_through_instrument_layout() {
        let set = SweepSet::from_rows(&rows(), DT).unwrap();
        let back = set.to_rows();
        assert_eq!(back[2], vec![7.0, 0.0, 9.0]);
        assert_eq!(SweepSet::from_sweeps(&set.to_sweeps(), DT).unwrap(), set);
    }
    #[test]
    fn empty_and_ragged_input_is_rejected() {
        assert!(matches!(SweepSet::from_rows(&[], DT), Err(AnalysisError::NoSweeps)));
        assert!(matches!(
            SweepSet::from_sweeps(&[vec![]], DT),
            Err(AnalysisError::NoSweeps)
        ));
        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            SweepSet::from_rows(&ragged, DT),
            Err(AnalysisError::RaggedSweeps {
                row: 1,
                expected: 2,
                actual: 1
            })
        ));
    }
    #[test]
    fn infinities_are_clamped() {
        let set = SweepSet::from_sweeps(&[vec![f64::INFINITY, f64::NEG_INFINITY]], DT).unwrap();
        assert_eq!(set.first(), vec![f64::MAX, f64::MIN]);
    }
    #[test]
    fn invalid_sample_period_is_rejected() {
        assert!(matches!(
            SweepSet::from_sweeps(&[vec![1.0]], 0.0),
            Err(AnalysisError::InvalidInput(_))
        ));
    }
}
