//! Live statistics: pure functions of the typed input, the target text and
//! the elapsed wall-clock time. Nothing here mutates session state

/// Snapshot shown while typing and carried into the final result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveStats {
    /// Net words per minute, correct characters only
    pub wpm: u32,
    /// Raw words per minute, every typed character
    pub raw: u32,
    /// Percentage of typed characters matching the target, 0..=100
    pub accuracy: u32,
}

impl Default for LiveStats {
    fn default() -> Self {
        Self {
            wpm: 0,
            raw: 0,
            accuracy: 100,
        }
    }
}

/// One point on the results chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySample {
    /// Whole seconds since the session started
    pub time: u64,
    pub wpm: u32,
    pub raw: u32,
}

/// Count of positions where input and target agree, compared index by index
/// up to the shorter of the two
pub fn correct_chars(input: &[char], target: &[char]) -> usize {
    input
        .iter()
        .zip(target.iter())
        .filter(|(a, b)| a == b)
        .count()
}

/// Compute a stats snapshot, or `None` when no time has elapsed yet
///
/// The zero guard matters: the first keystroke and the clock start can land
/// in the same instant, and a sample at t=0 would divide by zero
pub fn compute(input: &[char], target: &[char], elapsed_secs: f64) -> Option<LiveStats> {
    if elapsed_secs <= 0.0 {
        return None;
    }

    let minutes = elapsed_secs / 60.0;
    let raw = ((input.len() as f64 / 5.0) / minutes).round() as u32;

    let correct = correct_chars(input, target);
    let wpm = ((correct as f64 / 5.0) / minutes).round() as u32;

    let accuracy = if input.is_empty() {
        100
    } else {
        ((correct as f64 / input.len() as f64) * 100.0).round() as u32
    };

    Some(LiveStats { wpm, raw, accuracy })
}
