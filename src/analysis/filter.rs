use crate::analysis::token::Token;

/// Per-token normalisation step applied after tokenizing
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token>;

    fn name(&self) -> &str;
}
