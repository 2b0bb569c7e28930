use std::collections::{BTreeMap, BTreeSet, HashMap};
use serde::{Serialize, Deserialize};
use crate::core::stats::IndexStats;
use crate::core::types::DocId;
use crate::index::posting::TermStats;
use crate::storage::keys;
use crate::storage::kv::WriteBatch;

/// Stored per-document record, used to undo the document's postings on removal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub terms: Vec<String>,   // Distinct terms after stop-word filtering
    pub length: u32,          // Token count after stop-word filtering
}

/// A document after tokenization and stop-word filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysedDocument {
    pub id: DocId,
    pub term_freqs: HashMap<String, u32>,
    pub length: u32,
}

impl AnalysedDocument {
    pub fn from_terms<I, S>(id: DocId, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut term_freqs: HashMap<String, u32> = HashMap::new();
        let mut length = 0u32;
        for term in terms {
            *term_freqs.entry(term.into()).or_insert(0) += 1;
            length += 1;
        }
        AnalysedDocument { id, term_freqs, length }
    }

    pub fn record(&self) -> DocumentRecord {
        let mut terms: Vec<String> = self.term_freqs.keys().cloned().collect();
        terms.sort();
        DocumentRecord {
            terms,
            length: self.length,
        }
    }
}

/// In-memory copy of the slice of one index touched by a mutation
///
/// Loaded from committed storage, mutated by add/remove, then turned into a single
/// atomic batch. Term document frequency moves only when a posting is actually
/// inserted or removed, so `doc_freq == |postings|` is preserved for every term.
#[derive(Debug, Default)]
pub struct PendingIndex {
    pub stats: IndexStats,
    pub terms: HashMap<String, TermStats>,
    pub documents: BTreeMap<DocId, Option<DocumentRecord>>,   // None = delete
}

impl PendingIndex {
    pub fn new(stats: IndexStats, terms: HashMap<String, TermStats>) -> Self {
        PendingIndex {
            stats,
            terms,
            documents: BTreeMap::new(),
        }
    }

    /// Terms that must be loaded before applying the given additions and removals
    pub fn touched_terms<'a>(
        added: impl IntoIterator<Item = &'a AnalysedDocument>,
        removed: impl IntoIterator<Item = &'a DocumentRecord>,
    ) -> BTreeSet<String> {
        let mut terms = BTreeSet::new();
        for doc in added {
            terms.extend(doc.term_freqs.keys().cloned());
        }
        for record in removed {
            terms.extend(record.terms.iter().cloned());
        }
        terms
    }

    pub fn add_document(&mut self, doc: &AnalysedDocument) {
        self.stats.total_term_count += doc.length as u64;
        self.stats.document_count += 1;

        for (term, &tf) in &doc.term_freqs {
            let entry = self.terms.entry(term.clone()).or_default();
            if entry.postings.insert(doc.id.clone(), tf) {
                entry.doc_freq += 1;
            }
        }

        self.documents.insert(doc.id.clone(), Some(doc.record()));
    }

    pub fn remove_document(&mut self, id: &DocId, record: &DocumentRecord) {
        self.stats.total_term_count = self.stats.total_term_count.saturating_sub(record.length as u64);
        self.stats.document_count = self.stats.document_count.saturating_sub(1);

        for term in &record.terms {
            if let Some(entry) = self.terms.get_mut(term) {
                if entry.postings.remove(id.as_str()) {
                    entry.doc_freq = entry.doc_freq.saturating_sub(1);
                }
            }
        }

        self.documents.insert(id.clone(), None);
    }

    /// Everything touched, as one batch; empty records become deletes
    pub fn into_batch(self, index: &str) -> crate::core::error::Result<WriteBatch> {
        let mut batch = WriteBatch::new();

        keys::stage_stats(&mut batch, index, &self.stats);
        for (term, stats) in &self.terms {
            keys::stage_term(&mut batch, index, term, stats)?;
        }
        for (id, record) in &self.documents {
            keys::stage_document(&mut batch, index, id, record.as_ref())?;
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, text: &str) -> AnalysedDocument {
        AnalysedDocument::from_terms(DocId::from(id), text.split_whitespace())
    }

    #[test]
    fn analysed_document_counts_terms() {
        let d = doc("d0", "a a a b c");
        assert_eq!(d.length, 5);
        assert_eq!(d.term_freqs["a"], 3);
        assert_eq!(d.record().terms, vec!["a", "b", "c"]);
    }

    #[test]
    fn add_then_remove_restores_aggregates() {
        let mut pending = PendingIndex::default();
        let d0 = doc("d0", "a a b");
        let d1 = doc("d1", "a c");
        pending.add_document(&d0);
        pending.add_document(&d1);

        assert_eq!(pending.stats, IndexStats { document_count: 2, total_term_count: 5 });
        assert_eq!(pending.terms["a"].doc_freq, 2);
        assert_eq!(pending.terms["a"].postings.get("d0"), Some(2));

        pending.remove_document(&d0.id, &d0.record());
        assert_eq!(pending.stats, IndexStats { document_count: 1, total_term_count: 2 });
        assert_eq!(pending.terms["a"].doc_freq, 1);
        assert!(pending.terms["b"].postings.is_empty());
        assert_eq!(pending.terms["b"].doc_freq, 0);
        assert!(pending.terms.values().all(TermStats::is_consistent));
    }

    #[test]
    fn removing_absent_posting_does_not_underflow_doc_freq() {
        let mut pending = PendingIndex::default();
        pending.add_document(&doc("d0", "x"));

        let stray = DocumentRecord { terms: vec!["x".into()], length: 1 };
        pending.remove_document(&DocId::from("ghost"), &stray);
        assert_eq!(pending.terms["x"].doc_freq, 1);
        assert!(pending.terms["x"].is_consistent());
    }

    #[test]
    fn touched_terms_unions_additions_and_removals() {
        let added = [doc("d0", "a b")];
        let removed = [DocumentRecord { terms: vec!["b".into(), "z".into()], length: 2 }];
        let terms = PendingIndex::touched_terms(&added, &removed);
        assert_eq!(terms.into_iter().collect::<Vec<_>>(), vec!["a", "b", "z"]);
    }
}
