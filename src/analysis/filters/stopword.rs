use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;
use crate::core::error::Result;

/// Tokens that are never indexed, searched or suggested
///
/// A single space and a newline are always stop words, whatever else is loaded.
#[derive(Debug, Clone)]
pub struct StopWordFilter {
    pub stop_words: HashSet<String>,
}

impl Default for StopWordFilter {
    fn default() -> Self {
        StopWordFilter::new(Vec::<String>::new())
    }
}

impl StopWordFilter {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: HashSet<String> = stop_words.into_iter().map(Into::into).collect();
        set.insert(" ".to_string());
        set.insert("\n".to_string());
        StopWordFilter { stop_words: set }
    }

    pub fn english() -> Self {
        StopWordFilter::new([
            "a", "an", "and", "are", "as", "at", "be", "by", "for",
            "from", "has", "he", "in", "is", "it", "its", "of", "on",
            "that", "the", "to", "was", "will", "with",
        ])
    }

    /// One word per line; a missing file yields only the built-in whitespace entries
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = match fs::read_to_string(path.as_ref()) {
            Ok(data) => data,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(StopWordFilter::default()),
            Err(e) => return Err(e.into()),
        };

        Ok(StopWordFilter::new(
            data.lines()
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.is_empty()),
        ))
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl TokenFilter for StopWordFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .filter(|token| !self.is_stop_word(&token.text))
            .collect()
    }

    fn name(&self) -> &str {
        "stop_words"
    }
}
