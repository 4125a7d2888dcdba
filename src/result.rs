use chrono::{DateTime, Local};

use crate::stats::{HistorySample, LiveStats};

/// Terminal artifact of a session. Built exactly once, never mutated
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: u32,
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    /// Target characters never reached before the clock ran out
    pub missed_chars: usize,
    /// Characters typed past the end of the target. Not tallied separately
    /// yet; always zero
    pub extra_chars: usize,
    pub history: Vec<HistorySample>,
    pub timestamp: DateTime<Local>,
}

/// Walk input against target index by index and package the final record
///
/// Speed and accuracy come from the last live snapshot rather than being
/// recomputed here; in words mode the completion path takes one final sample
/// immediately before assembly
pub fn assemble(
    input: &[char],
    target: &[char],
    stats: LiveStats,
    history: &[HistorySample],
) -> TestResult {
    let mut correct_chars = 0;
    let mut incorrect_chars = 0;
    for (typed, expected) in input.iter().zip(target.iter()) {
        if typed == expected {
            correct_chars += 1;
        } else {
            incorrect_chars += 1;
        }
    }

    TestResult {
        wpm: stats.wpm,
        raw_wpm: stats.raw,
        accuracy: stats.accuracy,
        correct_chars,
        incorrect_chars,
        missed_chars: target.len().saturating_sub(input.len()),
        extra_chars: 0,
        history: history.to_vec(),
        timestamp: Local::now(),
    }
}
