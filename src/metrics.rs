use serde::Serialize;

/// Characters that make up one standardized "word".
pub const CHARS_PER_WORD: f64 = 5.0;

/// Elapsed time never counts as less than this when computing wpm.
pub const MIN_ELAPSED_SECS: f64 = 1.0;

/// Words per minute from the number of correctly typed characters.
///
/// `elapsed_secs` is floored to [`MIN_ELAPSED_SECS`], so a burst of keys in the
/// first few milliseconds cannot produce an unbounded value.
pub fn wpm(correct_count: usize, elapsed_secs: f64) -> u32 {
    if correct_count == 0 || elapsed_secs.is_nan() {
        return 0;
    }

    let minutes = elapsed_secs.max(MIN_ELAPSED_SECS) / 60.0;
    let words = correct_count as f64 / CHARS_PER_WORD;

    (words / minutes).round() as u32
}

/// Percentage of attempted slots that were typed correctly.
///
/// Nothing attempted yet counts as perfect accuracy.
pub fn accuracy(correct_count: usize, total_typed_count: usize) -> u32 {
    if total_typed_count == 0 {
        return 100;
    }

    ((correct_count as f64 / total_typed_count as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MotivationalTier {
    Fast,
    Good,
    Practice,
}

impl MotivationalTier {
    pub fn from_wpm(wpm: u32) -> Self {
        match wpm {
            w if w > 70 => MotivationalTier::Fast,
            w if w > 40 => MotivationalTier::Good,
            _ => MotivationalTier::Practice,
        }
    }
}
