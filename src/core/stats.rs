use serde::{Serialize, Deserialize};

/// Per-index aggregates as committed in storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub document_count: u32,    // Live documents
    pub total_term_count: u64,  // Σ document length after stop-word removal
}

impl IndexStats {
    /// Mean document length, 0 for an empty index
    pub fn mean_length(&self) -> f32 {
        if self.document_count == 0 {
            0.0
        } else {
            (self.total_term_count as f64 / self.document_count as f64) as f32
        }
    }

    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }
}
