//! Sentiment scoring
//!
//! The conversation engine treats sentiment as an opaque oracle: any
//! deterministic text → polarity function will do. `AfinnScorer` is the
//! default, backed by an embedded AFINN-style word list.

use crate::error::{ComputeError, Result};
use std::collections::HashMap;

/// AFINN word list (`word<TAB>score`, scores in -5..=5)
const AFINN_LEXICON: &str = include_str!("../data/afinn.txt");

/// Tokens that flip the polarity of the word directly after them
const NEGATORS: &[&str] = &[
    "not", "no", "never", "cannot", "can't", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "shouldn't", "couldn't", "haven't", "hasn't",
    "hadn't", "neither", "nor",
];

/// Characters treated as token separators in addition to whitespace
const PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '?', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '_', '`',
    '"', '~', '(', ')', '[', ']', '<', '>', '|', '\\', '+',
];

/// Text → polarity scoring capability.
///
/// Implementations must be deterministic. The score has no fixed bound and
/// `0.0` means neutral. Errors abort the whole analysis.
pub trait SentimentScorer {
    fn score(&self, text: &str) -> Result<f64>;
}

impl<S: SentimentScorer + ?Sized> SentimentScorer for &S {
    fn score(&self, text: &str) -> Result<f64> {
        (**self).score(text)
    }
}

impl<S: SentimentScorer + ?Sized> SentimentScorer for Box<S> {
    fn score(&self, text: &str) -> Result<f64> {
        (**self).score(text)
    }
}

/// Lexicon-based scorer summing per-word AFINN valences
#[derive(Debug, Clone)]
pub struct AfinnScorer {
    lexicon: HashMap<String, i32>,
}

impl Default for AfinnScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl AfinnScorer {
    /// Create a scorer from the embedded lexicon
    pub fn new() -> Self {
        Self {
            lexicon: parse_lexicon(AFINN_LEXICON),
        }
    }

    /// Create a scorer from a custom `word<TAB>score` list.
    ///
    /// Malformed lines are skipped.
    pub fn from_lexicon(source: &str) -> Self {
        Self {
            lexicon: parse_lexicon(source),
        }
    }

    /// Number of words known to the scorer
    pub fn vocabulary_size(&self) -> usize {
        self.lexicon.len()
    }

    /// Score text, returning the raw integer sum
    pub fn score_text(&self, text: &str) -> i64 {
        let tokens = tokenize(text);
        let mut total = 0i64;

        for (index, token) in tokens.iter().enumerate() {
            let Some(&valence) = self.lexicon.get(token.as_str()) else {
                continue;
            };

            let negated = index > 0 && NEGATORS.contains(&tokens[index - 1].as_str());
            let signed = if negated { -valence } else { valence };
            total += i64::from(signed);
        }

        total
    }
}

impl SentimentScorer for AfinnScorer {
    fn score(&self, text: &str) -> Result<f64> {
        Ok(self.score_text(text) as f64)
    }
}

fn parse_lexicon(source: &str) -> HashMap<String, i32> {
    let mut map = HashMap::new();
    for line in source.lines() {
        if let Some((word, score)) = line.split_once('\t') {
            if let Ok(score) = score.trim().parse::<i32>() {
                map.insert(word.trim().to_lowercase(), score);
            }
        }
    }
    map
}

/// Lower-case, strip punctuation, split on whitespace
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(PUNCTUATION, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Guard used by the metrics engine: scores must be finite to round-trip
/// through JSON.
pub(crate) fn checked_score<S: SentimentScorer + ?Sized>(scorer: &S, text: &str) -> Result<f64> {
    let score = scorer.score(text)?;
    if !score.is_finite() {
        return Err(ComputeError::Sentiment(format!(
            "scorer returned non-finite value {}",
            score
        )));
    }
    Ok(score)
}
