//! Prediction decoding
//!
//! Maps the predictor's raw class id back onto the activity table. The id is
//! reduced with a mathematical modulo, so any integer lands on a valid entry.

use crate::error::SuggestError;

/// Activity picked for a raw prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedActivity<'a> {
    pub index: usize,
    pub name: &'a str,
    /// Raw prediction was outside `0..len` and got wrapped
    pub wrapped: bool,
}

/// Decode `raw` against `activities` using `raw.rem_euclid(len)`.
///
/// Out-of-range ids are relabeled rather than rejected; every such wrap is
/// logged at `warn` level.
pub fn decode_prediction<'a, S: AsRef<str>>(
    raw: i64,
    activities: &'a [S],
) -> Result<DecodedActivity<'a>, SuggestError> {
    if activities.is_empty() {
        return Err(SuggestError::EmptyActivityList);
    }

    let len = activities.len() as i64;
    let index = raw.rem_euclid(len) as usize;
    let wrapped = !(0..len).contains(&raw);
    let name = activities[index].as_ref();

    if wrapped {
        log::warn!(
            "Predictor returned class id {raw} outside 0..{len}; wrapped to {index} ({name})"
        );
    }

    Ok(DecodedActivity {
        index,
        name,
        wrapped,
    })
}
