use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::metrics::{self, MotivationalTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CharState {
    #[default]
    Untyped,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerConfig {
    /// Fixed budget; the session ends when it runs out.
    Countdown { duration_secs: u64 },
    /// Open ended; the session ends only when the text is complete.
    CountUp,
}

/// What moves a session out of [`Phase::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartTrigger {
    #[default]
    FirstKeystroke,
    /// Keystrokes are ignored until [`SessionController::start`] is called.
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("target text must contain at least one character")]
    EmptyTargetText,
    #[error("countdown duration must be at least one second")]
    ZeroDuration,
    #[error("target text contains control character {0:?} at position {1}")]
    ControlCharacter(char, usize),
}

/// Metrics frozen at the moment a session finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinalResult {
    pub wpm: u32,
    pub accuracy: u32,
    pub time_seconds: u64,
    pub tier: MotivationalTier,
}

/// Read-only view of a session, produced by every state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub cursor_index: usize,
    pub char_states: Vec<CharState>,
    pub live_wpm: u32,
    pub live_accuracy: u32,
    pub remaining_or_elapsed_seconds: u64,
    pub result: Option<FinalResult>,
}

/// Owns one typing attempt and classifies keystrokes against its target text.
///
/// Typing is strictly sequential: the cursor only advances by one slot per
/// accepted key and only retreats through [`backspace`](Self::backspace).
#[derive(Debug)]
pub struct SessionController<C: Clock = SystemClock> {
    clock: C,
    start_trigger: StartTrigger,
    phase: Phase,
    target: Vec<char>,
    char_states: Vec<CharState>,
    cursor_index: usize,
    correct_count: usize,
    total_typed_count: usize,
    timer: TimerConfig,
    started_at: Option<Instant>,
    elapsed: Duration,
    result: Option<FinalResult>,
}

impl SessionController<SystemClock> {
    pub fn new(target_text: &str, timer: TimerConfig) -> Result<Self, SessionError> {
        Self::with_clock(SystemClock, target_text, timer)
    }
}

impl<C: Clock> SessionController<C> {
    pub fn with_clock(
        clock: C,
        target_text: &str,
        timer: TimerConfig,
    ) -> Result<Self, SessionError> {
        let target = validate(target_text, timer)?;
        let len = target.len();

        Ok(Self {
            clock,
            start_trigger: StartTrigger::default(),
            phase: Phase::Idle,
            target,
            char_states: vec![CharState::Untyped; len],
            cursor_index: 0,
            correct_count: 0,
            total_typed_count: 0,
            timer,
            started_at: None,
            elapsed: Duration::ZERO,
            result: None,
        })
    }

    pub fn with_start_trigger(mut self, start_trigger: StartTrigger) -> Self {
        self.start_trigger = start_trigger;
        self
    }

    pub fn set_start_trigger(&mut self, start_trigger: StartTrigger) {
        self.start_trigger = start_trigger;
    }

    pub fn press(&mut self, c: char) -> Snapshot {
        self.expire_if_due();

        let at_end = self.cursor_index >= self.target.len();
        if self.phase == Phase::Finished || at_end || c.is_control() {
            return self.snapshot();
        }

        if self.phase == Phase::Idle {
            if self.start_trigger == StartTrigger::Explicit {
                return self.snapshot();
            }
            self.begin();
        }

        let expected = self.target[self.cursor_index];
        if c == expected {
            self.char_states[self.cursor_index] = CharState::Correct;
            self.correct_count += 1;
        } else {
            self.char_states[self.cursor_index] = CharState::Incorrect;
        }
        self.total_typed_count += 1;
        self.cursor_index += 1;

        if self.cursor_index == self.target.len() {
            let elapsed = self.elapsed;
            self.finish(elapsed);
        }

        self.snapshot()
    }

    pub fn backspace(&mut self) -> Snapshot {
        self.expire_if_due();

        if self.phase != Phase::Running || self.cursor_index == 0 {
            return self.snapshot();
        }

        self.cursor_index -= 1;
        if self.char_states[self.cursor_index] == CharState::Correct {
            self.correct_count = self.correct_count.saturating_sub(1);
        }
        self.total_typed_count = self.total_typed_count.saturating_sub(1);
        self.char_states[self.cursor_index] = CharState::Untyped;

        self.snapshot()
    }

    /// Recomputes time from the clock. Expected once per second while running.
    pub fn tick(&mut self) -> Snapshot {
        self.expire_if_due();
        self.snapshot()
    }

    pub fn start(&mut self) -> Snapshot {
        if self.phase == Phase::Idle {
            self.begin();
        }
        self.snapshot()
    }

    /// Back to idle with a new text and timer. On error the session is left untouched.
    pub fn reset(
        &mut self,
        target_text: &str,
        timer: TimerConfig,
    ) -> Result<Snapshot, SessionError> {
        let target = match validate(target_text, timer) {
            Ok(target) => target,
            Err(err) => {
                warn!(%err, "rejected session reset");
                return Err(err);
            }
        };

        self.char_states = vec![CharState::Untyped; target.len()];
        self.target = target;
        self.timer = timer;
        self.phase = Phase::Idle;
        self.cursor_index = 0;
        self.correct_count = 0;
        self.total_typed_count = 0;
        self.started_at = None;
        self.elapsed = Duration::ZERO;
        self.result = None;
        debug!(len = self.target.len(), ?timer, "session reset");

        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> Snapshot {
        let elapsed_secs = self.elapsed.as_secs_f64();
        Snapshot {
            phase: self.phase,
            cursor_index: self.cursor_index,
            char_states: self.char_states.clone(),
            live_wpm: metrics::wpm(self.correct_count, elapsed_secs),
            live_accuracy: metrics::accuracy(self.correct_count, self.total_typed_count),
            remaining_or_elapsed_seconds: self.remaining_or_elapsed_secs(),
            result: self.result,
        }
    }

    /// Seconds left on a countdown, or seconds spent on a count-up.
    pub fn remaining_or_elapsed_secs(&self) -> u64 {
        match self.timer {
            TimerConfig::Countdown { duration_secs } => {
                duration_secs.saturating_sub(self.elapsed.as_secs())
            }
            TimerConfig::CountUp => self.elapsed.as_secs(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn char_states(&self) -> &[CharState] {
        &self.char_states
    }

    pub fn cursor_index(&self) -> usize {
        self.cursor_index
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn total_typed_count(&self) -> usize {
        self.total_typed_count
    }

    pub fn timer(&self) -> TimerConfig {
        self.timer
    }

    pub fn start_trigger(&self) -> StartTrigger {
        self.start_trigger
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn result(&self) -> Option<FinalResult> {
        self.result
    }

    fn begin(&mut self) {
        self.phase = Phase::Running;
        self.started_at = Some(self.clock.now());
        self.elapsed = Duration::ZERO;
        debug!(timer = ?self.timer, "session started");
    }

    /// Refreshes elapsed time and finishes a countdown whose budget ran out.
    fn expire_if_due(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        if let Some(started_at) = self.started_at {
            self.elapsed = self.clock.now().saturating_duration_since(started_at);
        }
        if let TimerConfig::Countdown { duration_secs } = self.timer {
            if self.elapsed.as_secs() >= duration_secs {
                // A late tick must not stretch the time the user actually had.
                self.finish(self.elapsed.min(Duration::from_secs(duration_secs)));
            }
        }
    }

    fn finish(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
        self.phase = Phase::Finished;

        let elapsed_secs = elapsed.as_secs_f64();
        let wpm = metrics::wpm(self.correct_count, elapsed_secs);
        let result = FinalResult {
            wpm,
            accuracy: metrics::accuracy(self.correct_count, self.total_typed_count),
            time_seconds: elapsed_secs.round() as u64,
            tier: MotivationalTier::from_wpm(wpm),
        };
        debug!(
            ?result,
            correct = self.correct_count,
            typed = self.total_typed_count,
            "session finished"
        );
        self.result = Some(result);
    }
}

fn validate(target_text: &str, timer: TimerConfig) -> Result<Vec<char>, SessionError> {
    if target_text.is_empty() {
        return Err(SessionError::EmptyTargetText);
    }
    if timer == (TimerConfig::Countdown { duration_secs: 0 }) {
        return Err(SessionError::ZeroDuration);
    }
    // Control characters are never accepted by `press`, so such a slot could not be typed.
    if let Some((pos, c)) = target_text.chars().enumerate().find(|(_, c)| c.is_control()) {
        return Err(SessionError::ControlCharacter(c, pos));
    }
    Ok(target_text.chars().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use assert_matches::assert_matches;
    use std::rc::Rc;

    const THIRTY: TimerConfig = TimerConfig::Countdown { duration_secs: 30 };

    fn session(
        text: &str,
        timer: TimerConfig,
    ) -> (SessionController<Rc<ManualClock>>, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        let s = SessionController::with_clock(Rc::clone(&clock), text, timer).unwrap();
        (s, clock)
    }

    fn assert_counters_ordered<C: Clock>(s: &SessionController<C>) {
        assert!(s.correct_count() <= s.total_typed_count());
        assert!(s.total_typed_count() <= s.cursor_index());
        assert!(s.cursor_index() <= s.target().len());
    }

    #[test]
    fn test_new_session_is_idle() {
        let (s, _) = session("cat", THIRTY);
        let snap = s.snapshot();

        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.cursor_index, 0);
        assert_eq!(snap.char_states, vec![CharState::Untyped; 3]);
        assert_eq!(snap.live_wpm, 0);
        assert_eq!(snap.live_accuracy, 100);
        assert_eq!(snap.remaining_or_elapsed_seconds, 30);
        assert_eq!(snap.result, None);
        assert!(s.started_at().is_none());
    }

    #[test]
    fn test_empty_text_rejected() {
        let err = SessionController::new("", THIRTY).unwrap_err();
        assert_eq!(err, SessionError::EmptyTargetText);
    }

    #[test]
    fn test_zero_countdown_rejected() {
        let err = SessionController::new("cat", TimerConfig::Countdown { duration_secs: 0 })
            .unwrap_err();
        assert_eq!(err, SessionError::ZeroDuration);
    }

    #[test]
    fn test_cat_all_correct() {
        let (mut s, _) = session("cat", THIRTY);
        s.press('c');
        s.press('a');
        let snap = s.press('t');

        assert_eq!(s.correct_count(), 3);
        assert_eq!(s.total_typed_count(), 3);
        assert_eq!(snap.cursor_index, 3);
        assert_eq!(snap.phase, Phase::Finished);
        assert_eq!(snap.live_accuracy, 100);
        let result = snap.result.unwrap();
        assert_eq!(result.accuracy, 100);
    }

    #[test]
    fn test_cat_with_typo() {
        let (mut s, _) = session("cat", THIRTY);
        s.press('c');
        s.press('x');
        let snap = s.press('t');

        assert_eq!(
            snap.char_states,
            vec![CharState::Correct, CharState::Incorrect, CharState::Correct]
        );
        assert_eq!(s.correct_count(), 2);
        assert_eq!(s.total_typed_count(), 3);
        assert_eq!(snap.result.unwrap().accuracy, 67);
    }

    #[test]
    fn test_first_keystroke_starts_session() {
        let (mut s, _) = session("cat", THIRTY);
        let snap = s.press('c');
        assert_eq!(snap.phase, Phase::Running);
        assert!(s.started_at().is_some());
    }

    #[test]
    fn test_explicit_start_ignores_keys_while_idle() {
        let (s, _) = session("cat", TimerConfig::CountUp);
        let mut s = s.with_start_trigger(StartTrigger::Explicit);

        let snap = s.press('c');
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.cursor_index, 0);

        let snap = s.start();
        assert_eq!(snap.phase, Phase::Running);

        let snap = s.press('c');
        assert_eq!(snap.cursor_index, 1);
        assert_eq!(snap.char_states[0], CharState::Correct);
    }

    #[test]
    fn test_start_is_noop_once_running() {
        let (mut s, clock) = session("cat", TimerConfig::CountUp);
        s.start();
        let started = s.started_at();
        clock.advance_secs(2);
        s.start();
        assert_eq!(s.started_at(), started);
    }

    #[test]
    fn test_control_chars_ignored() {
        let (mut s, _) = session("a b", THIRTY);
        let snap = s.press('\n');
        assert_eq!(snap.phase, Phase::Idle);

        s.press('a');
        let snap = s.press('\t');
        assert_eq!(snap.cursor_index, 1);
        assert_eq!(s.total_typed_count(), 1);
    }

    #[test]
    fn test_space_is_matched() {
        let (mut s, _) = session("a b", THIRTY);
        s.press('a');
        let snap = s.press(' ');
        assert_eq!(snap.char_states[1], CharState::Correct);
    }

    #[test]
    fn test_backspace_reverts_slot() {
        let (mut s, _) = session("cat", THIRTY);
        s.press('c');
        s.press('x');
        let snap = s.backspace();

        assert_eq!(snap.cursor_index, 1);
        assert_eq!(snap.char_states[1], CharState::Untyped);
        assert_eq!(s.correct_count(), 1);
        assert_eq!(s.total_typed_count(), 1);

        let snap = s.backspace();
        assert_eq!(snap.cursor_index, 0);
        assert_eq!(s.correct_count(), 0);
        assert_eq!(s.total_typed_count(), 0);
        assert_eq!(snap.live_accuracy, 100);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let (mut s, _) = session("cat", THIRTY);
        s.start();
        let snap = s.backspace();
        assert_eq!(snap.cursor_index, 0);
        assert_eq!(snap.phase, Phase::Running);
    }

    #[test]
    fn test_backspace_while_idle_is_noop() {
        let (mut s, _) = session("cat", THIRTY);
        let before = s.snapshot();
        assert_eq!(s.backspace(), before);
    }

    #[test]
    fn test_backspace_then_retype_round_trip() {
        let (mut s, _) = session("hello", THIRTY);
        s.press('h');
        s.press('e');
        s.press('x');

        let before = s.snapshot();
        let (correct, typed) = (s.correct_count(), s.total_typed_count());

        s.backspace();
        let after = s.press('x');

        assert_eq!(after.char_states, before.char_states);
        assert_eq!(after.cursor_index, before.cursor_index);
        assert_eq!(s.correct_count(), correct);
        assert_eq!(s.total_typed_count(), typed);
    }

    #[test]
    fn test_finished_is_frozen() {
        let (mut s, clock) = session("hi", THIRTY);
        s.press('h');
        clock.advance_secs(2);
        let done = s.press('i');
        assert_eq!(done.phase, Phase::Finished);

        clock.advance_secs(20);
        assert_eq!(s.press('z'), done);
        assert_eq!(s.backspace(), done);
        assert_eq!(s.tick(), done);
        assert_eq!(s.start(), done);
    }

    #[test]
    fn test_final_metrics_use_elapsed_at_finish() {
        let (mut s, clock) = session("abcdefghij", TimerConfig::CountUp);
        s.press('a');
        for c in "bcdefghij".chars() {
            clock.advance_secs(1);
            s.press(c);
        }
        assert_eq!(s.phase(), Phase::Finished);

        // 10 correct = 2 words in 9 seconds
        let result = s.result().unwrap();
        assert_eq!(result.wpm, 13);
        assert_eq!(result.time_seconds, 9);

        clock.advance_secs(600);
        assert_eq!(s.snapshot().result.unwrap(), result);
        assert_eq!(s.snapshot().live_wpm, 13);
    }

    #[test]
    fn test_instant_finish_floors_to_one_second() {
        let (mut s, _) = session("abcdefghij", TimerConfig::CountUp);
        for c in "abcdefghij".chars() {
            s.press(c);
        }
        // 2 words in the one second floor
        let result = s.result().unwrap();
        assert_eq!(result.wpm, 120);
        assert_eq!(result.time_seconds, 0);
        assert_eq!(result.tier, MotivationalTier::Fast);
    }

    #[test]
    fn test_early_completion_beats_timer() {
        let (mut s, clock) = session("ok", TimerConfig::Countdown { duration_secs: 120 });
        s.press('o');
        clock.advance_secs(1);
        let snap = s.press('k');
        assert_eq!(snap.phase, Phase::Finished);
        assert_eq!(snap.remaining_or_elapsed_seconds, 119);
    }

    #[test]
    fn test_countdown_expires_after_thirty_ticks() {
        let (mut s, clock) = session("the quick brown fox", THIRTY);
        s.start();

        for n in 1..=30 {
            clock.advance_secs(1);
            let snap = s.tick();
            if n < 30 {
                assert_eq!(snap.phase, Phase::Running, "finished early at tick {n}");
                assert_eq!(snap.remaining_or_elapsed_seconds, 30 - n);
            }
        }

        let snap = s.snapshot();
        assert_eq!(snap.phase, Phase::Finished);
        assert_eq!(snap.remaining_or_elapsed_seconds, 0);
        let result = snap.result.unwrap();
        assert_eq!(result.wpm, 0);
        assert_eq!(result.accuracy, 100);
        assert_eq!(result.time_seconds, 30);
        assert_eq!(result.tier, MotivationalTier::Practice);
    }

    #[test]
    fn test_late_tick_caps_elapsed_to_duration() {
        let (mut s, clock) = session("abcdefghij", TimerConfig::Countdown { duration_secs: 15 });
        for c in "abcde".chars() {
            s.press(c);
        }
        clock.advance_secs(40);
        let snap = s.tick();

        let result = snap.result.unwrap();
        assert_eq!(result.time_seconds, 15);
        // 1 word in a quarter minute
        assert_eq!(result.wpm, 4);
    }

    #[test]
    fn test_press_after_expiry_is_ignored() {
        let (mut s, clock) = session("abc", TimerConfig::Countdown { duration_secs: 15 });
        s.press('a');
        clock.advance_secs(15);
        let snap = s.press('b');
        assert_eq!(snap.phase, Phase::Finished);
        assert_eq!(snap.cursor_index, 1);
    }

    #[test]
    fn test_tick_while_idle_is_noop() {
        let (mut s, clock) = session("abc", THIRTY);
        clock.advance_secs(100);
        let snap = s.tick();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.remaining_or_elapsed_seconds, 30);
    }

    #[test]
    fn test_count_up_grows_without_bound() {
        let (mut s, clock) = session("abc", TimerConfig::CountUp);
        s.start();
        clock.advance_secs(5000);
        let snap = s.tick();
        assert_eq!(snap.phase, Phase::Running);
        assert_eq!(snap.remaining_or_elapsed_seconds, 5000);
    }

    #[test]
    fn test_live_wpm_tracks_clock() {
        let (mut s, clock) = session("abcdefghijklmnop", TimerConfig::CountUp);
        for c in "abcdefghij".chars() {
            s.press(c);
        }
        clock.advance_secs(30);
        // 2 words in half a minute
        assert_eq!(s.tick().live_wpm, 4);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let (mut s, _) = session("cat", THIRTY);
        s.press('c');
        s.press('x');

        let snap = s.reset("dog", TimerConfig::CountUp).unwrap();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.cursor_index, 0);
        assert_eq!(snap.char_states, vec![CharState::Untyped; 3]);
        assert_eq!(snap.remaining_or_elapsed_seconds, 0);
        assert_eq!(s.correct_count(), 0);
        assert_eq!(s.total_typed_count(), 0);
        assert!(s.started_at().is_none());
        assert_eq!(s.target(), &['d', 'o', 'g']);
        assert_eq!(s.timer(), TimerConfig::CountUp);
    }

    #[test]
    fn test_reset_after_finish() {
        let (mut s, _) = session("a", THIRTY);
        s.press('a');
        assert_eq!(s.phase(), Phase::Finished);

        let snap = s.reset("b", THIRTY).unwrap();
        assert_eq!(snap.result, None);
        assert_eq!(s.press('b').phase, Phase::Finished);
    }

    #[test]
    fn test_rejected_reset_leaves_session_untouched() {
        let (mut s, _) = session("cat", THIRTY);
        s.press('c');
        let before = s.snapshot();

        assert_matches!(s.reset("", THIRTY), Err(SessionError::EmptyTargetText));
        assert_matches!(
            s.reset("dog", TimerConfig::Countdown { duration_secs: 0 }),
            Err(SessionError::ZeroDuration)
        );
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn test_control_characters_in_target_are_rejected() {
        let clock = Rc::new(ManualClock::new());
        assert_matches!(
            SessionController::with_clock(clock, "a\nb", TimerConfig::CountUp),
            Err(SessionError::ControlCharacter('\n', 1))
        );
        assert_matches!(
            SessionController::new("tab\there", THIRTY),
            Err(SessionError::ControlCharacter('\t', 3))
        );
    }

    #[test]
    fn test_reset_with_control_character_leaves_session_untouched() {
        let (mut s, _) = session("cat", THIRTY);
        s.press('c');
        s.press('x');
        let before = s.snapshot();

        assert_matches!(
            s.reset("dog\r\n", TimerConfig::CountUp),
            Err(SessionError::ControlCharacter('\r', 3))
        );
        assert_eq!(s.snapshot(), before);
        assert_eq!(s.timer(), THIRTY);
        assert_eq!(s.target(), &['c', 'a', 't']);
    }

    #[test]
    fn test_reset_keeps_start_trigger() {
        let (s, _) = session("cat", THIRTY);
        let mut s = s.with_start_trigger(StartTrigger::Explicit);
        s.reset("dog", THIRTY).unwrap();
        assert_eq!(s.start_trigger(), StartTrigger::Explicit);
        assert_eq!(s.press('d').phase, Phase::Idle);
    }

    #[test]
    fn test_multibyte_target() {
        let (mut s, _) = session("café", THIRTY);
        for c in "café".chars() {
            s.press(c);
        }
        assert_eq!(s.phase(), Phase::Finished);
        assert_eq!(s.correct_count(), 4);
    }

    #[test]
    fn test_counters_stay_ordered() {
        let (mut s, _) = session("typing", THIRTY);
        let keys = ['t', 'x', '\u{8}', 'p', 'i', '\u{8}', '\u{8}', 'y', 'p', 'q', 'n', 'g'];
        for k in keys {
            if k == '\u{8}' {
                s.backspace();
            } else {
                s.press(k);
            }
            assert_counters_ordered(&s);
        }
    }

    #[test]
    fn test_snapshot_serializes() {
        let (mut s, _) = session("a", THIRTY);
        let snap = s.press('a');
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["phase"], "Finished");
        assert_eq!(json["char_states"][0], "Correct");
        assert_eq!(json["result"]["tier"], "practice");
    }
}
