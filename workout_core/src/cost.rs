//! Time-cost model: how long a block of sets takes.

use crate::ExerciseParams;

/// Estimated duration in seconds of `sets` sets.
///
/// Rest happens only between sets, never after the last one.
pub fn estimate_seconds(sets: i64, time_per_set: u64, rest_per_set: u64) -> u64 {
    if sets <= 0 {
        return 0;
    }
    let sets = sets as u64;
    let execution = sets * time_per_set;
    let rest_total = (sets - 1) * rest_per_set;
    execution + rest_total
}

/// Rest owed after finishing set `set_idx` (zero-based); none after the last set
pub fn rest_after_set(params: &ExerciseParams, set_idx: u32) -> Option<u32> {
    if set_idx + 1 >= params.sets {
        return None;
    }
    Some(params.rest)
}

/// Low end of a text range such as "3-4", "60-90s" or "12".
///
/// Anything that does not start with a number yields 0.
pub fn first_of(range: &str) -> u32 {
    let digits: String = range
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}
