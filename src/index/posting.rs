use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::core::types::DocId;

/// Postings of one term: document → in-document frequency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingList {
    pub postings: HashMap<DocId, u32>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            postings: HashMap::new(),
        }
    }

    /// Upsert a posting; true when the document was not present before
    pub fn insert(&mut self, doc_id: DocId, term_freq: u32) -> bool {
        self.postings.insert(doc_id, term_freq).is_none()
    }

    /// True when the document was present
    pub fn remove(&mut self, doc_id: &str) -> bool {
        self.postings.remove(doc_id).is_some()
    }

    pub fn get(&self, doc_id: &str) -> Option<u32> {
        self.postings.get(doc_id).copied()
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.postings.contains_key(doc_id)
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocId, u32)> {
        self.postings.iter().map(|(id, &tf)| (id, tf))
    }

    /// Keep only postings whose document satisfies `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&DocId) -> bool) {
        self.postings.retain(|id, _| keep(id));
    }
}

/// Committed state of one term
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermStats {
    pub postings: PostingList,
    pub doc_freq: u32,   // Stored separately; equals postings.len() once committed
}

impl TermStats {
    pub fn is_consistent(&self) -> bool {
        self.doc_freq == self.postings.doc_freq()
    }
}
