//! Text normalization applied before embedding and entity annotation

use regex::Regex;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Normalizes raw document text into the canonical form fed to the
/// embedding provider and entity annotator.
///
/// Normalization is a pure function of its input: control characters become
/// spaces, whitespace runs collapse to a single space, the result is trimmed
/// and lowercased. Running it twice yields the same output as running it
/// once.
pub struct Normalizer {
    whitespace_regex: Regex,
    stop_words: HashSet<String>,
    strip_stop_words: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizerOptions {
    /// Drop common English stop words after the base pass. Off by default;
    /// embedding models are trained on full sentences. Stripping tokenizes
    /// on Unicode word boundaries, so punctuation is dropped in this mode.
    pub strip_stop_words: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::with_options(NormalizerOptions::default())
    }

    pub fn with_options(options: NormalizerOptions) -> Self {
        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");

        Self {
            whitespace_regex,
            stop_words: Self::create_stop_words(),
            strip_stop_words: options.strip_stop_words,
        }
    }

    /// Normalize text. Never fails; empty and whitespace-only input yield
    /// an empty string.
    pub fn normalize(&self, text: &str) -> String {
        let without_control: String = text
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        let collapsed = self
            .whitespace_regex
            .replace_all(&without_control, " ")
            .trim()
            .to_lowercase();

        if self.strip_stop_words {
            self.strip_stop_words(&collapsed)
        } else {
            collapsed
        }
    }

    /// Tokenize normalized text into lowercase words using Unicode
    /// segmentation.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(|w| w.to_lowercase()).collect()
    }

    fn strip_stop_words(&self, text: &str) -> String {
        self.tokenize(text)
            .into_iter()
            .filter(|word| !self.stop_words.contains(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn create_stop_words() -> HashSet<String> {
        let stop_words = [
            "a", "an", "and", "are", "as", "at", "be", "but", "by", "for",
            "from", "had", "has", "have", "he", "her", "his", "if", "in",
            "is", "it", "its", "of", "on", "or", "our", "she", "so", "that",
            "the", "their", "them", "then", "there", "these", "they", "this",
            "to", "was", "we", "were", "which", "will", "with", "would",
            "you", "your",
        ];

        stop_words.iter().map(|&s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace_and_lowercases() {
        let normalizer = Normalizer::new();
        let text = "  Senior\tRust\r\nEngineer   (Backend)  ";
        assert_eq!(normalizer.normalize(text), "senior rust engineer (backend)");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = Normalizer::new();
        let text = "Kubernetes,\n\nDocker\t and  AWS";
        let once = normalizer.normalize(text);
        let twice = normalizer.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_empty_and_whitespace_only() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize(" \t\r\n "), "");
    }

    #[test]
    fn test_normalize_replaces_control_characters() {
        let normalizer = Normalizer::new();
        let text = "rust\u{0000}engineer\u{0007}resume";
        assert_eq!(normalizer.normalize(text), "rust engineer resume");
    }

    #[test]
    fn test_stop_word_stripping_is_opt_in() {
        let keep = Normalizer::new();
        let strip = Normalizer::with_options(NormalizerOptions {
            strip_stop_words: true,
        });
        let text = "experience with the Rust language and the Tokio runtime";

        assert!(keep.normalize(text).contains("the"));
        let stripped = strip.normalize(text);
        assert_eq!(
            stripped,
            "experience rust language tokio runtime"
        );
    }

    #[test]
    fn test_stop_word_stripping_handles_adjacent_punctuation() {
        let strip = Normalizer::with_options(NormalizerOptions {
            strip_stop_words: true,
        });
        let stripped = strip.normalize("Worked on the runtime, and the compiler");
        assert_eq!(stripped, "worked runtime compiler");
    }

    #[test]
    fn test_stop_word_stripping_is_idempotent() {
        let strip = Normalizer::with_options(NormalizerOptions {
            strip_stop_words: true,
        });
        let once = strip.normalize("the quick brown fox and the lazy dog");
        let twice = strip.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        let normalizer = Normalizer::new();
        let tokens = normalizer.tokenize("Python, SQL and C++ development");
        assert!(tokens.contains(&"python".to_string()));
        assert!(tokens.contains(&"sql".to_string()));
        assert!(tokens.contains(&"development".to_string()));
        assert!(!tokens.iter().any(|t| t.contains(',')));
    }
}
