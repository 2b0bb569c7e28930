use crate::analysis::token::Token;
use unicode_segmentation::UnicodeSegmentation;

/// Splits raw text into an ordered token sequence
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;
}

/// Standard Unicode tokenizer
#[derive(Debug, Clone)]
pub struct StandardTokenizer {
    pub lowercase: bool,
    pub max_token_length: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer {
            lowercase: true,
            max_token_length: 255,
        }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut position = 0u32;

        for (offset, word) in text.unicode_word_indices() {
            if word.len() > self.max_token_length {
                continue;
            }

            let token_text = if self.lowercase {
                word.to_lowercase()
            } else {
                word.to_string()
            };
            tokens.push(Token::new(token_text, position, offset));
            position += 1;
        }

        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }
}

/// Splits on Unicode whitespace and keeps every other character
#[derive(Debug, Clone, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let base = text.as_ptr() as usize;
        text.split_whitespace()
            .enumerate()
            .map(|(position, word)| Token::new(word, position as u32, word.as_ptr() as usize - base))
            .collect()
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: Vec<Token>) -> Vec<String> {
        tokens.into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn standard_splits_on_word_boundaries_and_lowercases() {
        let tokens = StandardTokenizer::default().tokenize("Hello, World! Rust-lang 2024");
        assert_eq!(tokens[1].offset, 7);
        assert_eq!(texts(tokens), vec!["hello", "world", "rust", "lang", "2024"]);
    }

    #[test]
    fn standard_skips_overlong_tokens_without_gaps_in_positions() {
        let tokenizer = StandardTokenizer { lowercase: false, max_token_length: 3 };
        let tokens = tokenizer.tokenize("abc abcdef Xyz");
        assert_eq!(tokens.iter().map(|t| t.position).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(texts(tokens), vec!["abc", "Xyz"]);
    }

    #[test]
    fn whitespace_keeps_punctuation_and_offsets() {
        let tokens = WhitespaceTokenizer.tokenize("  a  b,c\nd ");
        assert_eq!(tokens[1].offset, 5);
        assert_eq!(tokens[2].position, 2);
        assert_eq!(texts(tokens), vec!["a", "b,c", "d"]);
    }
}
