use crate::metrics::MotivationalTier;
use crate::session::{Phase, Snapshot, TimerConfig};

/// A countdown at or below this many seconds is drawn as a warning
pub const LOW_TIME_SECS: u64 = 5;

/// Formats seconds as `m:ss`
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn tier_message(tier: MotivationalTier) -> &'static str {
    match tier {
        MotivationalTier::Fast => "You're lightning fast!",
        MotivationalTier::Good => "Great speed! Keep improving!",
        MotivationalTier::Practice => "Keep practicing, accuracy builds speed!",
    }
}

pub fn is_low_time(snapshot: &Snapshot, timer: TimerConfig) -> bool {
    matches!(timer, TimerConfig::Countdown { .. })
        && snapshot.phase == Phase::Running
        && snapshot.remaining_or_elapsed_seconds <= LOW_TIME_SECS
}
