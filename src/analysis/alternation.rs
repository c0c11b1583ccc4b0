use log::debug;
use crate::analysis::peaks::MarkerSequence;
/// Suppress markers until minima and maxima strictly interleave, starting
/// with a minimum.
///
/// Both sequences are walked together. At each index the minimum is decided
/// before the maximum, so a maximum at the same index as an accepted minimum
/// is paired with it. A maximum with no preceding minimum is dropped.
/// The inputs are consumed and the filtered pair is returned.
pub fn enforce_alternation(
    mut minima: MarkerSequence,
    mut maxima: MarkerSequence,
) -> (MarkerSequence, MarkerSequence) {
    let mut last_was_min = false;
    let mut suppressed = 0usize;
    for i in 0..minima.len().max(maxima.len()) {
        if let Some(slot) = minima.get_mut(i).filter(|slot| slot.is_some()) {
            if last_was_min {
                *slot = None;
                suppressed += 1;
            }
            last_was_min = true;
        }
        if let Some(slot) = maxima.get_mut(i).filter(|slot| slot.is_some()) {
            if !last_was_min {
                *slot = None;
                suppressed += 1;
            }
            last_was_min = false;
        }
    }
    debug!("alternation suppressed {suppressed} markers");
    (minima, maxima)
}
