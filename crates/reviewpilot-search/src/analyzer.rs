//! Text analysis: tokens, stop-word filtering and n-grams

use crate::stop_words::is_stop_word;
use regex::Regex;
use reviewpilot_core::{Error, Result};

const TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Turns raw text into the terms the vectorizer counts.
///
/// Text is lower-cased and split into runs of two or more word characters.
/// Stop words are dropped, then every n-gram of the remaining tokens in the
/// configured range is emitted, unigrams first.
#[derive(Debug, Clone)]
pub struct Analyzer {
    token: Regex,
    min_n: usize,
    max_n: usize,
}

impl Analyzer {
    /// Unigrams and bigrams
    pub fn new() -> Result<Self> {
        Self::with_ngram_range(1, 2)
    }

    pub fn with_ngram_range(min_n: usize, max_n: usize) -> Result<Self> {
        if min_n == 0 || min_n > max_n {
            return Err(Error::config(format!(
                "invalid n-gram range ({min_n}, {max_n})"
            )));
        }

        let token = Regex::new(TOKEN_PATTERN)
            .map_err(|e| Error::internal(format!("failed to compile token pattern: {e}")))?;

        Ok(Self {
            token,
            min_n,
            max_n,
        })
    }

    /// Lower-cased tokens with stop words removed
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        self.token
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|token| !is_stop_word(token))
            .map(str::to_string)
            .collect()
    }

    /// All terms of `text`, in order, with repeats
    pub fn terms(&self, text: &str) -> Vec<String> {
        let tokens = self.tokens(text);
        let mut terms = Vec::new();

        for n in self.min_n..=self.max_n {
            if n == 1 {
                terms.extend(tokens.iter().cloned());
                continue;
            }
            terms.extend(tokens.windows(n).map(|window| window.join(" ")));
        }

        terms
    }
}
