use std::sync::Arc;
use rust_stemmers::Algorithm;
use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::stemmer::StemmerFilter;
use crate::analysis::filters::stopword::StopWordFilter;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};

/// Text analysis pipeline: tokenizer, normalising filters, then stop-word removal
///
/// Ingestion, `match` queries and suggestions all go through the same analyzer so a
/// term is spelled identically at write and read time.
#[derive(Clone)]
pub struct Analyzer {
    pub tokenizer: Arc<dyn Tokenizer>,
    pub filters: Vec<Arc<dyn TokenFilter>>,
    pub stop_words: StopWordFilter,
}

impl Analyzer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            stop_words: StopWordFilter::default(),
        }
    }

    pub fn add_filter(mut self, filter: Arc<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_stop_words(mut self, stop_words: StopWordFilter) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Normalised tokens in text order, stop words included
    pub fn segment(&self, text: &str) -> Vec<String> {
        let mut tokens = self.tokenizer.tokenize(text);
        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }
        tokens.into_iter().map(|token| token.text).collect()
    }

    /// Indexable terms in text order
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.segment(text)
            .into_iter()
            .filter(|token| !self.stop_words.is_stop_word(token))
            .collect()
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.is_stop_word(token)
    }

    /// Unicode words, lowercased, English stop words and stemming
    pub fn standard_english() -> Self {
        Analyzer::new(Arc::new(StandardTokenizer::default()))
            .add_filter(Arc::new(LowercaseFilter))
            .add_filter(Arc::new(StemmerFilter::new(Algorithm::English)))
            .with_stop_words(StopWordFilter::english())
    }

    pub fn describe(&self) -> String {
        let mut parts = vec![self.tokenizer.name().to_string()];
        parts.extend(self.filters.iter().map(|f| f.name().to_string()));
        parts.join("+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tokenizer::WhitespaceTokenizer;

    #[test]
    fn analyze_drops_stop_words_but_segment_keeps_them() {
        let analyzer = Analyzer::new(Arc::new(WhitespaceTokenizer))
            .with_stop_words(StopWordFilter::new(["of"]));

        assert_eq!(analyzer.segment("state of art"), vec!["state", "of", "art"]);
        assert_eq!(analyzer.analyze("state of art"), vec!["state", "art"]);
        assert!(analyzer.is_stop_word("of"));
    }

    #[test]
    fn standard_english_normalises_terms() {
        let analyzer = Analyzer::standard_english();
        assert_eq!(analyzer.analyze("The Engines of Searching"), vec!["engin", "search"]);
        assert_eq!(analyzer.describe(), "standard+lowercase+stemmer");
    }
}
