use serde::{Serialize, Deserialize};

/// A token produced by a `Tokenizer`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,      // Token text after any tokenizer-level normalisation
    pub position: u32,     // Ordinal among the tokens of the text
    pub offset: usize,     // Byte offset in the original text
}

impl Token {
    pub fn new(text: impl Into<String>, position: u32, offset: usize) -> Self {
        Token {
            text: text.into(),
            position,
            offset,
        }
    }
}
