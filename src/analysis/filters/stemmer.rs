use rust_stemmers::{Algorithm, Stemmer};
use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;

/// Snowball stemming, e.g. `StemmerFilter::new(Algorithm::English)`
pub struct StemmerFilter {
    stemmer: Stemmer,
}

impl StemmerFilter {
    pub fn new(algorithm: Algorithm) -> Self {
        StemmerFilter {
            stemmer: Stemmer::create(algorithm),
        }
    }
}

impl TokenFilter for StemmerFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .map(|mut token| {
                token.text = self.stemmer.stem(&token.text).into_owned();
                token
            })
            .collect()
    }

    fn name(&self) -> &str {
        "stemmer"
    }
}
