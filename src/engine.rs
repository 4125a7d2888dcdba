use std::time::SystemTime;

use crate::feedback::{Feedback, FeedbackSink, NullSink};
use crate::result::{self, TestResult};
use crate::settings::{Mode, TestSettings};
use crate::stats::{self, HistorySample, LiveStats};
use crate::text::{self, FALLBACK_TEXT};

/// Session lifecycle. Input is only accepted in Waiting and Running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Loading,
    Waiting,
    Running,
    Finished,
}

/// One typing attempt: state machine, input diffing, derived timer and
/// statistics sampling. Owns no rendering and spawns no threads; keystrokes
/// and one-second ticks are fed in by the host event loop
///
/// Methods that depend on the clock take an explicit `now`, with
/// `SystemTime::now` conveniences, so behavior is deterministic under test
pub struct SessionEngine {
    settings: TestSettings,
    status: Status,
    /// Request identity for asynchronous text loads. A restart bumps this,
    /// which is how stale responses get discarded
    generation: u64,
    target: Vec<char>,
    input: Vec<char>,
    started_at: Option<SystemTime>,
    time_left: u64,
    stats: LiveStats,
    history: Vec<HistorySample>,
    result: Option<TestResult>,
    muted: bool,
    error_flash: bool,
    sink: Box<dyn FeedbackSink>,
}

impl SessionEngine {
    pub fn new(settings: TestSettings) -> Self {
        Self {
            settings,
            status: Status::Loading,
            generation: 0,
            target: Vec::new(),
            input: Vec::new(),
            started_at: None,
            time_left: settings.duration,
            stats: LiveStats::default(),
            history: Vec::new(),
            result: None,
            muted: false,
            error_flash: false,
            sink: Box::new(NullSink),
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn FeedbackSink>) {
        self.sink = sink;
    }

    /// Tear down the current session unconditionally and go back to Loading.
    /// Returns the new generation the next text load must carry
    pub fn restart(&mut self, settings: TestSettings) -> u64 {
        self.generation += 1;
        self.settings = settings;
        self.status = Status::Loading;
        self.target.clear();
        self.input.clear();
        self.started_at = None;
        self.time_left = settings.duration;
        self.stats = LiveStats::default();
        self.history.clear();
        self.result = None;
        self.error_flash = false;
        self.generation
    }

    /// Deliver a text load. Responses from a superseded session (generation
    /// mismatch) are dropped without touching state
    pub fn complete_load(&mut self, generation: u64, text: &str) {
        if generation != self.generation || self.status != Status::Loading {
            return;
        }
        let text = text::normalize(text);
        let text = if text.is_empty() {
            text::normalize(FALLBACK_TEXT)
        } else {
            text
        };
        self.target = text.chars().collect();
        self.input.clear();
        self.time_left = self.settings.duration;
        self.status = Status::Waiting;
    }

    /// Replace the typed input wholesale, the way an input field reports it
    ///
    /// Growth inspects only the newly appended character and fires a
    /// correct/error feedback event; deletions fire nothing. In words mode
    /// reaching the target length completes the session immediately
    pub fn handle_input(&mut self, new_input: &str) {
        self.handle_input_at(new_input, SystemTime::now());
    }

    pub fn handle_input_at(&mut self, new_input: &str, now: SystemTime) {
        if matches!(self.status, Status::Loading | Status::Finished) {
            return;
        }

        let chars: Vec<char> = new_input.chars().collect();
        let grew = chars.len() > self.input.len();

        if grew {
            let idx = chars.len() - 1;
            let incorrect = idx >= self.target.len() || chars[idx] != self.target[idx];
            if incorrect {
                self.error_flash = true;
                self.emit(Feedback::Error);
            } else {
                self.emit(Feedback::Correct);
            }

            if self.status == Status::Waiting {
                self.status = Status::Running;
                self.started_at = Some(now);
            }
        }

        self.input = chars;

        if self.settings.mode == Mode::Words && self.input.len() >= self.target.len() {
            self.sample(self.elapsed_secs(now));
            self.finish();
        }
    }

    /// Append one character. Convenience over `handle_input` for hosts that
    /// see keystrokes rather than a whole input field
    pub fn type_char(&mut self, c: char) {
        self.type_char_at(c, SystemTime::now());
    }

    pub fn type_char_at(&mut self, c: char, now: SystemTime) {
        let mut next: String = self.input.iter().collect();
        next.push(c);
        self.handle_input_at(&next, now);
    }

    /// Remove the last character, if any
    pub fn backspace(&mut self) {
        self.backspace_at(SystemTime::now());
    }

    pub fn backspace_at(&mut self, now: SystemTime) {
        if self.input.is_empty() {
            return;
        }
        let next: String = self.input[..self.input.len() - 1].iter().collect();
        self.handle_input_at(&next, now);
    }

    /// One-second timer tick. Only meaningful in time mode while Running;
    /// every other state ignores it, which is what guarantees a finished or
    /// restarted session can never be mutated by a late tick
    pub fn on_tick(&mut self) {
        self.tick_at(SystemTime::now());
    }

    pub fn tick_at(&mut self, now: SystemTime) {
        if self.status != Status::Running || self.settings.mode != Mode::Time {
            return;
        }
        let elapsed = self.elapsed_secs(now);
        let remaining = self.settings.duration.saturating_sub(elapsed.floor() as u64);
        self.time_left = remaining;
        self.sample(elapsed);
        if remaining == 0 {
            self.finish();
        }
    }

    /// Elapsed seconds, always derived from the wall clock
    pub fn elapsed_secs(&self, now: SystemTime) -> f64 {
        self.started_at
            .and_then(|t| now.duration_since(t).ok())
            .map_or(0.0, |d| d.as_secs_f64())
    }

    fn sample(&mut self, elapsed_secs: f64) {
        if let Some(stats) = stats::compute(&self.input, &self.target, elapsed_secs) {
            self.stats = stats;
            self.history.push(HistorySample {
                time: elapsed_secs.floor() as u64,
                wpm: stats.wpm,
                raw: stats.raw,
            });
        }
    }

    fn finish(&mut self) {
        if self.status == Status::Finished {
            return;
        }
        self.status = Status::Finished;
        self.result = Some(result::assemble(
            &self.input,
            &self.target,
            self.stats,
            &self.history,
        ));
        self.emit(Feedback::Finish);
    }

    fn emit(&mut self, event: Feedback) {
        if !self.muted {
            self.sink.on_feedback(event);
        }
    }

    pub fn mute(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// True once after each error event; the presentation layer uses this
    /// for a one-shot visual flash
    pub fn take_error(&mut self) -> bool {
        std::mem::take(&mut self.error_flash)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn settings(&self) -> &TestSettings {
        &self.settings
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    /// Words started so far, for the words-mode progress header
    pub fn words_typed(&self) -> usize {
        self.input.iter().filter(|c| **c == ' ').count() + 1
    }

    pub fn stats(&self) -> LiveStats {
        self.stats
    }

    pub fn history(&self) -> &[HistorySample] {
        &self.history
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::RecordingSink;
    use assert_matches::assert_matches;
    use std::time::Duration;

    const T0: SystemTime = SystemTime::UNIX_EPOCH;

    fn at(secs_x10: u64) -> SystemTime {
        T0 + Duration::from_millis(secs_x10 * 100)
    }

    fn words_engine(target: &str) -> SessionEngine {
        let settings = TestSettings {
            mode: Mode::Words,
            ..TestSettings::default()
        };
        let mut engine = SessionEngine::new(settings);
        engine.complete_load(0, target);
        engine
    }

    fn time_engine(target: &str, duration: u64) -> SessionEngine {
        let settings = TestSettings {
            mode: Mode::Time,
            duration,
            ..TestSettings::default()
        };
        let mut engine = SessionEngine::new(settings);
        engine.complete_load(0, target);
        engine
    }

    #[test]
    fn starts_loading_and_ignores_input() {
        let mut engine = SessionEngine::new(TestSettings::default());
        assert_matches!(engine.status(), Status::Loading);
        engine.handle_input_at("hello", T0);
        assert!(engine.input().is_empty());
        assert_matches!(engine.status(), Status::Loading);
    }

    #[test]
    fn load_transitions_to_waiting_with_normalized_target() {
        let mut engine = SessionEngine::new(TestSettings::default());
        engine.complete_load(0, "  the   cat \n sat ");
        assert_matches!(engine.status(), Status::Waiting);
        let target: String = engine.target().iter().collect();
        assert_eq!(target, "the cat sat");
        assert_eq!(engine.time_left(), 30);
    }

    #[test]
    fn empty_load_falls_back() {
        let mut engine = SessionEngine::new(TestSettings::default());
        engine.complete_load(0, "   ");
        assert_matches!(engine.status(), Status::Waiting);
        assert!(!engine.target().is_empty());
    }

    #[test]
    fn first_keystroke_starts_the_clock() {
        let mut engine = time_engine("the cat sat", 30);
        assert_matches!(engine.status(), Status::Waiting);
        engine.type_char_at('t', at(50));
        assert_matches!(engine.status(), Status::Running);
        assert_eq!(engine.elapsed_secs(at(70)), 2.0);
    }

    #[test]
    fn growth_fires_correct_and_error_feedback() {
        let sink = RecordingSink::new();
        let mut engine = time_engine("ab", 30);
        engine.set_sink(Box::new(sink.clone()));

        engine.type_char_at('a', at(0));
        engine.type_char_at('x', at(1));
        assert_eq!(sink.events(), vec![Feedback::Correct, Feedback::Error]);
        assert!(engine.take_error());
        assert!(!engine.take_error());
    }

    #[test]
    fn deletions_fire_no_feedback() {
        let sink = RecordingSink::new();
        let mut engine = time_engine("ab", 30);
        engine.set_sink(Box::new(sink.clone()));

        engine.type_char_at('a', at(0));
        engine.backspace_at(at(1));
        assert_eq!(engine.input().len(), 0);
        assert_eq!(sink.events(), vec![Feedback::Correct]);
    }

    #[test]
    fn typing_past_target_end_is_an_error() {
        let sink = RecordingSink::new();
        let mut engine = time_engine("a", 30);
        engine.set_sink(Box::new(sink.clone()));

        engine.type_char_at('a', at(0));
        engine.type_char_at('a', at(1));
        assert_eq!(sink.events(), vec![Feedback::Correct, Feedback::Error]);
        assert_eq!(engine.input().len(), 2);
    }

    #[test]
    fn mute_suppresses_feedback() {
        let sink = RecordingSink::new();
        let mut engine = time_engine("ab", 30);
        engine.set_sink(Box::new(sink.clone()));
        engine.mute(true);

        engine.type_char_at('a', at(0));
        assert!(sink.events().is_empty());
        assert!(engine.is_muted());
    }

    #[test]
    fn word_mode_completes_at_target_length() {
        let sink = RecordingSink::new();
        let mut engine = words_engine("hi");
        engine.set_sink(Box::new(sink.clone()));

        engine.type_char_at('h', at(0));
        assert_matches!(engine.status(), Status::Running);
        engine.type_char_at('i', at(600));
        assert_matches!(engine.status(), Status::Finished);
        assert_eq!(sink.events().last(), Some(&Feedback::Finish));

        let result = engine.result().expect("result assembled");
        assert_eq!(result.correct_chars, 2);
        assert_eq!(result.missed_chars, 0);
        // final sample taken at completion: 2 chars over 60s
        assert_eq!(result.wpm, 0);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn word_mode_final_sample_carries_real_numbers() {
        let mut engine = words_engine("the cat sat");
        for (i, c) in "the cat sat".chars().enumerate() {
            engine.type_char_at(c, at(i as u64 * 60));
        }
        // last keystroke at 60s: 11 correct chars -> 2 wpm, 100% accuracy
        let result = engine.result().unwrap();
        assert_eq!(result.wpm, 2);
        assert_eq!(result.accuracy, 100);
        assert_eq!(result.correct_chars, 11);
    }

    #[test]
    fn word_mode_ignores_ticks() {
        let mut engine = words_engine("hello");
        engine.type_char_at('h', at(0));
        engine.tick_at(at(9000));
        assert_matches!(engine.status(), Status::Running);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn time_mode_tick_updates_remaining_and_samples() {
        let mut engine = time_engine("the cat sat never stops", 15);
        engine.type_char_at('t', at(0));
        engine.type_char_at('h', at(10));

        engine.tick_at(at(10));
        assert_eq!(engine.time_left(), 14);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.history()[0].time, 1);
        assert_matches!(engine.status(), Status::Running);
    }

    #[test]
    fn time_mode_deadline_finishes_exactly_once() {
        let mut engine = time_engine("the cat sat", 15);
        engine.type_char_at('t', at(0));
        engine.type_char_at('h', at(10));

        // tick lands slightly past the deadline
        engine.tick_at(at(152));
        assert_matches!(engine.status(), Status::Finished);
        assert_eq!(engine.time_left(), 0);

        let result = engine.result().unwrap();
        // target 11 chars, 2 typed
        assert_eq!(result.missed_chars, 9);

        // a second completion signal is a no-op
        let first = result.clone();
        engine.tick_at(at(160));
        assert_eq!(engine.result().unwrap(), &first);
    }

    #[test]
    fn finished_session_ignores_input() {
        let mut engine = words_engine("a");
        engine.type_char_at('a', at(0));
        assert_matches!(engine.status(), Status::Finished);
        engine.type_char_at('b', at(1));
        assert_eq!(engine.input().len(), 1);
    }

    #[test]
    fn tick_before_start_is_a_no_op() {
        let mut engine = time_engine("abc", 15);
        engine.tick_at(at(50));
        assert_matches!(engine.status(), Status::Waiting);
        assert_eq!(engine.time_left(), 15);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn history_is_monotonically_non_decreasing() {
        let mut engine = time_engine("the quick brown fox jumps over", 30);
        engine.type_char_at('t', at(0));
        for i in 1..=5u64 {
            engine.tick_at(at(i * 10));
        }
        let times: Vec<u64> = engine.history().iter().map(|s| s.time).collect();
        let mut sorted = times.clone();
        sorted.sort_unstable();
        assert_eq!(times, sorted);
        assert_eq!(times, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn restart_bumps_generation_and_discards_state() {
        let mut engine = time_engine("abc", 15);
        engine.type_char_at('a', at(0));
        engine.tick_at(at(10));

        let generation = engine.restart(TestSettings::default());
        assert_eq!(generation, 1);
        assert_matches!(engine.status(), Status::Loading);
        assert!(engine.input().is_empty());
        assert!(engine.target().is_empty());
        assert!(engine.history().is_empty());
        assert_eq!(engine.stats(), LiveStats::default());
        assert!(engine.result().is_none());
    }

    #[test]
    fn stale_load_is_discarded() {
        let mut engine = SessionEngine::new(TestSettings::default());
        let stale = engine.generation();
        let fresh = engine.restart(TestSettings::default());
        assert_ne!(stale, fresh);

        engine.complete_load(fresh, "fresh text");
        // the slow first response arrives after the new one resolved
        engine.complete_load(stale, "stale text");

        let target: String = engine.target().iter().collect();
        assert_eq!(target, "fresh text");
        assert_matches!(engine.status(), Status::Waiting);
    }

    #[test]
    fn load_after_waiting_does_not_overwrite() {
        let mut engine = words_engine("typed target");
        engine.type_char_at('t', at(0));
        engine.complete_load(0, "surprise");
        let target: String = engine.target().iter().collect();
        assert_eq!(target, "typed target");
    }

    #[test]
    fn words_typed_counts_started_words() {
        let mut engine = words_engine("one two three");
        assert_eq!(engine.words_typed(), 1);
        for c in "one two".chars() {
            engine.type_char_at(c, at(0));
        }
        assert_eq!(engine.words_typed(), 2);
    }
}
