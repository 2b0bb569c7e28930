use std::cmp::Ordering;
use serde::{Serialize, Deserialize};
use crate::core::types::DocId;

/// One page of ranked hits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<ScoredDocument>,
    pub total_hits: usize,   // Distinct scored documents before paging
    pub max_score: f32,
    pub took_ms: u64,
}

impl SearchResults {
    pub fn empty(took_ms: u64) -> Self {
        SearchResults {
            took_ms,
            ..SearchResults::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.doc_id.as_str()).collect()
    }
}

/// Document with relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub doc_id: DocId,
    pub score: f32,
}

impl ScoredDocument {
    pub fn new(doc_id: DocId, score: f32) -> Self {
        ScoredDocument { doc_id, score }
    }

    /// Descending score, then ascending id
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// Sort all scored documents and cut the `[from, from + size)` window
pub fn paginate(mut scored: Vec<ScoredDocument>, from: usize, size: usize, took_ms: u64) -> SearchResults {
    scored.sort_by(ScoredDocument::rank_cmp);

    let total_hits = scored.len();
    let max_score = scored.first().map(|hit| hit.score).unwrap_or(0.0);
    let hits = if from >= total_hits {
        Vec::new()
    } else {
        scored.into_iter().skip(from).take(size).collect()
    };

    SearchResults {
        hits,
        total_hits,
        max_score,
        took_ms,
    }
}
