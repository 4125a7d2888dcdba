use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Time runs out the clock; Words ends when the target text is fully typed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Time,
    Words,
}

pub const DURATIONS: [u64; 3] = [15, 30, 60];
pub const WORD_COUNTS: [usize; 3] = [10, 25, 50];

/// Immutable per session; any change tears the current session down and
/// starts a fresh one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSettings {
    pub mode: Mode,
    /// Seconds on the clock in time mode
    pub duration: u64,
    /// Target word count in words mode
    pub word_count: usize,
    pub punctuation: bool,
    pub numbers: bool,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            duration: 30,
            word_count: 25,
            punctuation: false,
            numbers: false,
        }
    }
}

impl TestSettings {
    /// Snap out-of-range values (e.g. from a hand-edited config file) back
    /// onto the supported steps
    pub fn sanitize(&mut self) {
        if !DURATIONS.contains(&self.duration) {
            self.duration = TestSettings::default().duration;
        }
        if !WORD_COUNTS.contains(&self.word_count) {
            self.word_count = TestSettings::default().word_count;
        }
    }

    pub fn cycle_duration(&mut self) {
        let idx = DURATIONS.iter().position(|d| *d == self.duration);
        self.duration = DURATIONS[idx.map_or(0, |i| (i + 1) % DURATIONS.len())];
    }

    pub fn cycle_word_count(&mut self) {
        let idx = WORD_COUNTS.iter().position(|w| *w == self.word_count);
        self.word_count = WORD_COUNTS[idx.map_or(0, |i| (i + 1) % WORD_COUNTS.len())];
    }
}
