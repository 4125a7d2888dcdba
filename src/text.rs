use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::settings::{Mode, TestSettings};

/// Shown when generation produces nothing usable. Long enough for any
/// configured duration or word count
pub const FALLBACK_TEXT: &str = "sunflowers turn their heads to follow the sun \
across the sky providing a beautiful example of heliotropism in nature nature \
always finds a way to survive and thrive even in the harshest conditions the \
yellow petals bring joy to those who see them standing tall in the garden field";

/// Produces the target text for a session
///
/// Implementations must not fail: on any internal problem they return the
/// fallback text instead. Output is always normalized and non-empty
pub trait TextProvider {
    fn generate(&self, settings: &TestSettings) -> String;
}

/// Collapse whitespace runs to single spaces and trim the ends. Typing
/// targets never contain newlines or double spaces
pub fn normalize(text: &str) -> String {
    text.split_whitespace().join(" ")
}

const WORD_BANK: &[&str] = &[
    "the", "sun", "light", "garden", "field", "flower", "yellow", "petal", "seed", "bloom",
    "grow", "tall", "turn", "follow", "across", "sky", "morning", "summer", "warm", "bright",
    "gentle", "wind", "rain", "cloud", "earth", "root", "leaf", "stem", "bee", "meadow",
    "golden", "quiet", "slow", "deep", "breath", "focus", "steady", "rhythm", "pattern",
    "spiral", "nature", "season", "change", "time", "moment", "day", "night", "dawn", "dusk",
    "water", "river", "stone", "path", "walk", "stand", "reach", "open", "close", "rest",
    "simple", "small", "great", "clear", "calm", "soft", "strong", "alive", "green", "wild",
    "always", "often", "never", "between", "through", "toward", "under", "over", "around",
    "within", "and", "with", "into", "from", "that", "this", "when", "where", "while",
];

/// Local word-bank generator standing in for a remote text service. Honors
/// the punctuation and number toggles from the settings toolbar
#[derive(Debug, Default, Clone, Copy)]
pub struct WordBankProvider;

impl WordBankProvider {
    /// Enough words that a time-mode session will not run out of target text
    fn target_word_count(settings: &TestSettings) -> usize {
        match settings.mode {
            Mode::Words => settings.word_count,
            Mode::Time => (settings.duration as usize) * 3,
        }
    }

    fn decorate(words: Vec<String>, settings: &TestSettings) -> String {
        let mut rng = rand::thread_rng();
        let mut words = words;

        if settings.numbers {
            // a few numbers, spread thinly
            for word in words.iter_mut() {
                if rng.gen_ratio(1, 12) {
                    *word = rng.gen_range(1..1000u32).to_string();
                }
            }
        }

        if !settings.punctuation {
            return words.join(" ");
        }

        // Sentence shaping: capitalize starts, sprinkle commas, close each
        // sentence with a period.
        let mut out: Vec<String> = Vec::with_capacity(words.len());
        let mut sentence_start = true;
        let mut since_break = 0usize;
        let last = words.len().saturating_sub(1);
        for (i, word) in words.into_iter().enumerate() {
            let mut word = word;
            if sentence_start {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    word = first.to_uppercase().collect::<String>() + chars.as_str();
                }
                sentence_start = false;
            }
            since_break += 1;
            if i == last || (since_break >= 6 && rng.gen_ratio(1, 3)) {
                word.push('.');
                sentence_start = true;
                since_break = 0;
            } else if since_break >= 3 && rng.gen_ratio(1, 8) {
                word.push(',');
                since_break = 0;
            }
            out.push(word);
        }
        out.join(" ")
    }
}

impl TextProvider for WordBankProvider {
    fn generate(&self, settings: &TestSettings) -> String {
        let count = Self::target_word_count(settings);
        let mut rng = rand::thread_rng();
        let words: Vec<String> = (0..count)
            .filter_map(|_| WORD_BANK.choose(&mut rng))
            .map(|w| w.to_string())
            .collect();

        let text = normalize(&Self::decorate(words, settings));
        if text.is_empty() {
            normalize(FALLBACK_TEXT)
        } else {
            text
        }
    }
}

/// Always returns the fallback passage. Useful offline and in tests that
/// want a deterministic target
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackProvider;

impl TextProvider for FallbackProvider {
    fn generate(&self, _settings: &TestSettings) -> String {
        normalize(FALLBACK_TEXT)
    }
}

/// A fixed, caller-supplied target (the `-p` flag)
#[derive(Debug, Clone)]
pub struct FixedTextProvider {
    text: String,
}

impl FixedTextProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextProvider for FixedTextProvider {
    fn generate(&self, _settings: &TestSettings) -> String {
        let text = normalize(&self.text);
        if text.is_empty() {
            normalize(FALLBACK_TEXT)
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TestSettings;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  a\t b\n\nc  "), "a b c");
        assert_eq!(normalize("already clean"), "already clean");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn fallback_is_normalized_and_nonempty() {
        let text = normalize(FALLBACK_TEXT);
        assert!(!text.is_empty());
        assert!(!text.contains("  "));
    }

    #[test]
    fn words_mode_yields_requested_word_count() {
        let settings = TestSettings {
            mode: Mode::Words,
            word_count: 25,
            ..TestSettings::default()
        };
        let text = WordBankProvider.generate(&settings);
        assert_eq!(text.split(' ').count(), 25);
    }

    #[test]
    fn time_mode_yields_plenty_of_words() {
        let settings = TestSettings {
            mode: Mode::Time,
            duration: 15,
            ..TestSettings::default()
        };
        let text = WordBankProvider.generate(&settings);
        assert_eq!(text.split(' ').count(), 45);
    }

    #[test]
    fn plain_settings_yield_lowercase_letters_only() {
        let settings = TestSettings::default();
        let text = WordBankProvider.generate(&settings);
        assert!(text
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == ' '));
    }

    #[test]
    fn punctuation_toggle_adds_sentences() {
        let settings = TestSettings {
            mode: Mode::Words,
            word_count: 50,
            punctuation: true,
            ..TestSettings::default()
        };
        let text = WordBankProvider.generate(&settings);
        assert!(text.ends_with('.'));
        assert!(text.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn fixed_provider_normalizes_and_falls_back() {
        let settings = TestSettings::default();
        assert_eq!(
            FixedTextProvider::new("  hello   world ").generate(&settings),
            "hello world"
        );
        assert_eq!(
            FixedTextProvider::new("   ").generate(&settings),
            normalize(FALLBACK_TEXT)
        );
    }
}
