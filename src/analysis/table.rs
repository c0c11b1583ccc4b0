use serde::Serialize;
use crate::config::PeakSettings;
/// A single kept extremum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PeakPoint {
    pub index: usize,
    pub time: f64,
    pub value: f64,
}
/// One minimum/maximum pair. The minimum may be absent when fewer minima than
/// maxima survived deduplication.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PeakRow {
    pub minimum: Option<PeakPoint>,
    pub maximum: PeakPoint,
    pub amplitude: Option<f64>,
}
impl PeakRow {
    /// Cells in [`PeakTable::HEADER`] order; missing cells are empty.
    pub fn to_record(&self) -> [String; 7] {
        let (min_index, min_time, min_value) = match self.minimum {
            Some(p) => (p.index.to_string(), p.time.to_string(), p.value.to_string()),
            None => (String::new(), String::new(), String::new()),
        };
        [
            min_index,
            min_time,
            min_value,
            self.maximum.index.to_string(),
            self.maximum.time.to_string(),
            self.maximum.value.to_string(),
            self.amplitude.map(|a| a.to_string()).unwrap_or_default(),
        ]
    }
}
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PeakTable {
    pub rows: Vec<PeakRow>,
}
impl PeakTable {
    /// Index/time columns repeat once per polarity.
    pub const HEADER: [&'static str; 7] = ["index", "time", "min", "index", "time", "max", "amp"];
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    pub fn amplitudes(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows.iter().map(|row| row.amplitude)
    }
}
/// Compresses marker sequences into spaced peak lists and pairs them.
#[derive(Clone, Debug)]
pub struct PeakTableBuilder {
    sample_period_secs: f64,
    min_spacing: usize,
}
impl PeakTableBuilder {
    pub fn new(settings: &PeakSettings) -> Self {
        Self {
            sample_period_secs: settings.sample_period_secs,
            min_spacing: settings.min_peak_spacing,
        }
    }
    /// Keep every marker that lies more than `min_peak_spacing` samples after
    /// the previously kept one.
    pub fn compress(&self, markers: &[Option<f64>]) -> Vec<PeakPoint> {
        spaced_peaks(markers, self.min_spacing)
            .map(|(index, value)| PeakPoint {
                index,
                time: index as f64 * self.sample_period_secs,
                value,
            })
            .collect()
    }
    /// Pair the i-th kept minimum with the i-th kept maximum.
    ///
    /// The row count follows the maxima; surplus minima are not reported.
    pub fn build_table(&self, maxima: &[Option<f64>], minima: &[Option<f64>]) -> PeakTable {
        let min_points = self.compress(minima);
        let rows = self
            .compress(maxima)
            .into_iter()
            .enumerate()
            .map(|(i, maximum)| {
                let minimum = min_points.get(i).copied();
                PeakRow {
                    minimum,
                    maximum,
                    amplitude: minimum.map(|m| maximum.value - m.value),
                }
            })
            .collect();
        PeakTable { rows }
    }
}
/// Number of peaks [`PeakTableBuilder::compress`] would keep.
pub fn count_spaced_peaks(markers: &[Option<f64>], min_spacing: usize) -> usize {
    spaced_peaks(markers, min_spacing).count()
}
fn spaced_peaks(
    markers: &[Option<f64>],
    min_spacing: usize,
) -> impl Iterator<Item = (usize, f64)> + '_ {
    let mut last_kept: Option<usize> = None;
    markers
        .iter()
        .enumerate()
        .filter_map(move |(i, marker)| {
            let value = (*marker)?;
            match last_kept {
                Some(last) if i - last <= min_spacing => None,
                _ => {
                    last_kept = Some(i);
                    Some((i, value))
                }
            }
        })
}
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    fn builder() -> PeakTableBuilder {
        PeakTableBuilder::new(&PeakSettings::default())
    }
    fn markers_at(len: usize, peaks: &[(usize, f64)]) -> Vec<Option<f64>> {
        let mut markers = vec![None; len];
        for &(i, v) in peaks {
            markers[i] = Some(v);
        }
        markers
    }
    #[test]
    fn close_peaks_collapse_to_the_first() {
        let markers = markers_at(9, &[(1, 5.0), (5, 5.0)]);
        let points = builder().compress(&markers);
        assert_eq!(
            points,
            vec![PeakPoint {
                index: 1,
                time: 1.0 * 5e-5,
                value: 5.0
            }]
        );
    }
    #[test]
    fn all_none_compresses_to_nothing() {
        assert!(builder().compress(&vec![None; 500]).is_empty());
        assert!(builder().compress(&[]).is_empty());
    }
    #[test]
    fn spacing_threshold_is_exclusive() {
        let markers = markers_at(400, &[(0, 1.0), (100, 2.0), (101, 3.0), (202, 4.0)]);
        let indices: Vec<usize> = builder().compress(&markers).iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 101, 202]);
    }
    #[test]
    fn kept_peaks_are_always_spaced() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let len = rng.gen_range(0..2_000);
            let markers: Vec<Option<f64>> = (0..len)
                .map(|_| rng.gen_bool(0.05).then(|| rng.gen_range(-70.0..-50.0)))
                .collect();
            let points = builder().compress(&markers);
            for pair in points.windows(2) {
                assert!(pair[1].index - pair[0].index > 100);
            }
            assert_eq!(points.len(), count_spaced_peaks(&markers, 100));
        }
    }
    #[test]
    fn rows_follow_kept_maxima_for_random_markers() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..100 {
            let len = rng.gen_range(0..3_000);
            let mut draw = |p: f64, lo: f64, hi: f64| -> Vec<Option<f64>> {
                (0..len)
                    .map(|_| rng.gen_bool(p).then(|| rng.gen_range(lo..hi)))
                    .collect()
            };
            let maxima = draw(0.02, -50.0, -40.0);
            let minima = draw(0.02, -70.0, -60.0);
            let builder = builder();
            let min_points = builder.compress(&minima);
            let table = builder.build_table(&maxima, &minima);
            assert_eq!(table.len(), builder.compress(&maxima).len());
            for (i, row) in table.rows.iter().enumerate() {
                assert_eq!(row.minimum, min_points.get(i).copied());
                match row.minimum {
                    Some(min) => assert_eq!(row.amplitude, Some(row.maximum.value - min.value)),
                    None => assert_eq!(row.amplitude, None),
                }
            }
        }
    }
    #[test]
    fn table_pairs_rows_and_computes_amplitude() {
        let minima = markers_at(600, &[(10, -60.0), (250, -62.0)]);
        let maxima = markers_at(600, &[(50, -45.0), (300, -44.0), (500, -47.0)]);
        let table = builder().build_table(&maxima, &minima);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0].amplitude, Some(15.0));
        assert_eq!(table.rows[1].amplitude, Some(18.0));
        assert_eq!(table.rows[2].minimum, None);
        assert_eq!(table.rows[2].amplitude, None);
        assert_eq!(table.rows[2].maximum.index, 500);
    }
    #[test]
    fn surplus_minima_are_not_reported() {
        let minima = markers_at(600, &[(10, -60.0), (250, -62.0), (450, -61.0)]);
        let maxima = markers_at(600, &[(50, -45.0)]);
        let table = builder().build_table(&maxima, &minima);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].minimum.map(|p| p.index), Some(10));
    }
    #[test]
    fn empty_inputs_give_empty_table() {
        assert!(builder().build_table(&[], &[]).is_empty());
    }
    #[test]
    fn record_leaves_missing_cells_blank() {
        let row = PeakRow {
            minimum: None,
            maximum: PeakPoint {
                index: 4,
                time: 0.5,
                value: -40.0,
            },
            amplitude: None,
        };
        assert_eq!(row.to_record(), ["", "", "", "4", "0.5", "-40", ""].map(String::from));
    }
}
