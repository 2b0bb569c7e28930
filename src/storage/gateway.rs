use std::sync::Arc;
use tracing::debug;
use crate::core::error::Result;
use crate::core::stats::IndexStats;
use crate::core::types::DocId;
use crate::index::inverted::DocumentRecord;
use crate::index::posting::{PostingList, TermStats};
use crate::storage::keys;
use crate::storage::kv::{KvStore, WriteBatch};

/// Typed access to index records on top of a `KvStore`
///
/// Missing records read as their zero value; only substrate failures are errors.
#[derive(Clone)]
pub struct IndexStore {
    kv: Arc<dyn KvStore>,
}

impl IndexStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        IndexStore { kv }
    }

    pub fn kv(&self) -> &Arc<dyn KvStore> {
        &self.kv
    }

    pub fn postings(&self, index: &str, term: &str) -> Result<Option<PostingList>> {
        match self.kv.get(&keys::postings_key(index, term))? {
            Some(bytes) if !bytes.is_empty() => Ok(Some(keys::decode_postings(&bytes)?)),
            _ => Ok(None),
        }
    }

    pub fn doc_freq(&self, index: &str, term: &str) -> Result<u32> {
        match self.kv.get(&keys::doc_freq_key(index, term))? {
            Some(bytes) if !bytes.is_empty() => keys::decode_u32(&bytes),
            _ => Ok(0),
        }
    }

    /// Postings and document frequency of a term, `None` when the term has no postings
    pub fn term(&self, index: &str, term: &str) -> Result<Option<TermStats>> {
        let Some(postings) = self.postings(index, term)? else {
            return Ok(None);
        };
        let doc_freq = self.doc_freq(index, term)?;
        Ok(Some(TermStats { postings, doc_freq }))
    }

    /// Committed state of a term, empty when absent
    pub fn term_or_default(&self, index: &str, term: &str) -> Result<TermStats> {
        Ok(self.term(index, term)?.unwrap_or_default())
    }

    pub fn total_term_count(&self, index: &str) -> Result<u64> {
        match self.kv.get(&keys::term_count_key(index))? {
            Some(bytes) if !bytes.is_empty() => keys::decode_u64(&bytes),
            _ => Ok(0),
        }
    }

    pub fn document_count(&self, index: &str) -> Result<u32> {
        match self.kv.get(&keys::doc_count_key(index))? {
            Some(bytes) if !bytes.is_empty() => keys::decode_u32(&bytes),
            _ => Ok(0),
        }
    }

    pub fn index_stats(&self, index: &str) -> Result<IndexStats> {
        Ok(IndexStats {
            document_count: self.document_count(index)?,
            total_term_count: self.total_term_count(index)?,
        })
    }

    pub fn document(&self, index: &str, id: &DocId) -> Result<Option<DocumentRecord>> {
        match self.kv.get(&keys::document_key(index, id.as_str()))? {
            Some(bytes) if !bytes.is_empty() => Ok(Some(keys::decode_document(&bytes)?)),
            _ => Ok(None),
        }
    }

    /// Up to `limit` stored terms starting with `prefix`, in key order
    pub fn terms_with_prefix(&self, index: &str, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let keys = self.kv.keys_with_prefix(&keys::postings_key(index, prefix), limit)?;
        Ok(keys
            .iter()
            .filter_map(|key| keys::term_from_postings_key(index, key))
            .collect())
    }

    pub fn commit(&self, batch: WriteBatch) -> Result<()> {
        self.kv.write_batch(batch)
    }

    /// Delete every key of an index in atomic sub-batches of at most `batch_limit` keys
    ///
    /// Returns the number of keys removed. Atomicity holds per sub-batch only.
    pub fn remove_index(&self, index: &str, batch_limit: usize) -> Result<usize> {
        let prefix = keys::index_prefix(index);
        let batch_limit = batch_limit.max(1);
        let mut removed = 0;

        loop {
            let keys = self.kv.keys_with_prefix(&prefix, batch_limit)?;
            if keys.is_empty() {
                break;
            }

            let count = keys.len();
            let mut batch = WriteBatch::new();
            for key in keys {
                batch.delete(key);
            }
            self.kv.write_batch(batch)?;
            removed += count;
            debug!(index, count, "removed index sub-batch");

            if count < batch_limit {
                break;
            }
        }

        Ok(removed)
    }

    pub fn flush(&self) -> Result<()> {
        self.kv.flush()
    }

    pub fn destroy(&self) -> Result<()> {
        self.kv.destroy()
    }
}
