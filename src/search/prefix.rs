use std::sync::Arc;
use tracing::debug;
use crate::analysis::analyzer::Analyzer;
use crate::core::error::Result;
use crate::parallel::indexer::WorkerPool;
use crate::storage::gateway::IndexStore;
use crate::storage::keys;

/// Inputs with this many tokens or more get no suggestions
pub const MAX_SUGGEST_TOKENS: usize = 6;

/// Autocomplete over stored terms by key-prefix scan
pub struct Suggester {
    pub store: IndexStore,
    pub analyzer: Arc<Analyzer>,
    pub pool: WorkerPool,
}

impl Suggester {
    pub fn new(store: IndexStore, analyzer: Arc<Analyzer>, pool: WorkerPool) -> Self {
        Suggester { store, analyzer, pool }
    }

    /// Candidates per token: 4 below four tokens, 3 for four or five, none beyond
    pub fn per_token_limit(token_count: usize) -> Option<usize> {
        match token_count {
            0..=3 => Some(4),
            n if n < MAX_SUGGEST_TOKENS => Some(3),
            _ => None,
        }
    }

    /// Stored terms extending each token of `text`, grouped in token order
    ///
    /// Stop words count toward the token total but are not looked up. Results are not
    /// deduplicated across tokens.
    pub fn suggest(&self, index: &str, text: &str) -> Result<Vec<String>> {
        if !keys::is_valid_index_name(index) {
            return Ok(Vec::new());
        }

        let tokens = self.analyzer.segment(text);
        let Some(limit) = Self::per_token_limit(tokens.len()) else {
            debug!(index, tokens = tokens.len(), "suggestion input too long");
            return Ok(Vec::new());
        };

        let lookups: Vec<(usize, String)> = tokens
            .into_iter()
            .filter(|token| !self.analyzer.is_stop_word(token))
            .enumerate()
            .collect();

        let mut groups = self.pool.fan_out(
            &lookups,
            Vec::with_capacity(lookups.len()),
            |(slot, token)| Ok((*slot, self.store.terms_with_prefix(index, token, limit)?)),
            |acc: &mut Vec<(usize, Vec<String>)>, group| acc.push(group),
        )?;
        groups.sort_by_key(|(slot, _)| *slot);

        let suggestions: Vec<String> = groups.into_iter().flat_map(|(_, terms)| terms).collect();
        debug!(index, count = suggestions.len(), "suggestions collected");
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_shrinks_with_token_count() {
        assert_eq!(Suggester::per_token_limit(0), Some(4));
        assert_eq!(Suggester::per_token_limit(3), Some(4));
        assert_eq!(Suggester::per_token_limit(4), Some(3));
        assert_eq!(Suggester::per_token_limit(5), Some(3));
        assert_eq!(Suggester::per_token_limit(MAX_SUGGEST_TOKENS), None);
    }
}
