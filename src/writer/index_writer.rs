use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{debug, info};
use crate::core::error::Result;
use crate::core::types::DocId;
use crate::index::inverted::{DocumentRecord, PendingIndex};
use crate::parallel::indexer::ParallelIndexer;
use crate::storage::gateway::IndexStore;
use crate::storage::keys;
use crate::writer::batch::{DocumentBatch, IdBatch};

/// One writer lock per index name
///
/// Held for the whole read-modify-write of a mutation so concurrent calls on the same
/// index cannot lose each other's aggregate updates. Different indexes never contend.
#[derive(Default)]
pub struct WriterLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WriterLocks {
    pub fn new() -> Self {
        WriterLocks::default()
    }

    pub fn for_index(&self, index: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(index.to_string())
            .or_default()
            .clone()
    }

    /// Drop the entry for `index` unless another caller still holds or awaits it
    pub fn release(&self, index: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock();
        drop(lock);
        if locks.get(index).is_some_and(|held| Arc::strong_count(held) == 1) {
            locks.remove(index);
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Document mutation pipeline
///
/// Every call reads the committed aggregates and touched term records, applies the
/// change in memory, and commits a single atomic batch.
pub struct IndexWriter {
    pub store: IndexStore,
    pub indexer: ParallelIndexer,
    pub locks: WriterLocks,
    pub max_batch_docs: usize,
    pub remove_batch_limit: usize,
}

impl IndexWriter {
    pub fn new(
        store: IndexStore,
        indexer: ParallelIndexer,
        max_batch_docs: usize,
        remove_batch_limit: usize,
    ) -> Self {
        IndexWriter {
            store,
            indexer,
            locks: WriterLocks::new(),
            max_batch_docs,
            remove_batch_limit,
        }
    }

    /// Index documents; an id that already exists is replaced
    pub fn add_documents(&self, index: &str, batch: DocumentBatch) -> Result<usize> {
        keys::validate_index_name(index)?;
        if batch.is_empty() {
            return Ok(0);
        }
        batch.check_limit(self.max_batch_docs)?;

        let analysed = self.indexer.analyze_batch(&batch.documents)?;

        let lock = self.locks.for_index(index);
        let _guard = lock.lock();

        let replaced = self.load_records(index, &batch.ids())?;
        let terms = PendingIndex::touched_terms(&analysed, replaced.iter().map(|(_, record)| record));
        let mut pending = self.load_pending(index, terms)?;

        for (id, record) in &replaced {
            pending.remove_document(id, record);
        }
        for doc in &analysed {
            pending.add_document(doc);
        }

        let stats = pending.stats;
        self.store.commit(pending.into_batch(index)?)?;

        debug!(
            index,
            added = analysed.len(),
            replaced = replaced.len(),
            document_count = stats.document_count,
            "documents added"
        );
        Ok(analysed.len())
    }

    /// Remove documents by id; ids that are not indexed are skipped
    pub fn delete_documents(&self, index: &str, batch: IdBatch) -> Result<usize> {
        keys::validate_index_name(index)?;
        if batch.is_empty() {
            return Ok(0);
        }
        batch.check_limit(self.max_batch_docs)?;

        let lock = self.locks.for_index(index);
        let _guard = lock.lock();

        let removed = self.load_records(index, &batch.ids)?;
        if removed.is_empty() {
            debug!(index, requested = batch.requested, "no documents to delete");
            return Ok(0);
        }

        let terms = PendingIndex::touched_terms(std::iter::empty(), removed.iter().map(|(_, record)| record));
        let mut pending = self.load_pending(index, terms)?;
        for (id, record) in &removed {
            pending.remove_document(id, record);
        }

        let stats = pending.stats;
        self.store.commit(pending.into_batch(index)?)?;

        debug!(
            index,
            removed = removed.len(),
            document_count = stats.document_count,
            "documents deleted"
        );
        Ok(removed.len())
    }

    /// Delete every record of an index; returns the number of keys removed
    pub fn remove_index(&self, index: &str) -> Result<usize> {
        keys::validate_index_name(index)?;

        let lock = self.locks.for_index(index);
        let removed = {
            let _guard = lock.lock();
            self.store.remove_index(index, self.remove_batch_limit)
        };
        self.locks.release(index, lock);

        let removed = removed?;
        info!(index, keys = removed, "index removed");
        Ok(removed)
    }

    /// Stored records of the given ids, sorted by id; unknown ids are absent
    fn load_records(&self, index: &str, ids: &[DocId]) -> Result<Vec<(DocId, DocumentRecord)>> {
        let mut records = self.indexer.pool.fan_out(
            ids,
            Vec::new(),
            |id| Ok(self.store.document(index, id)?.map(|record| (id.clone(), record))),
            |acc: &mut Vec<(DocId, DocumentRecord)>, found| acc.extend(found),
        )?;
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }

    /// Committed aggregates and term records for the terms a mutation touches
    fn load_pending(&self, index: &str, terms: BTreeSet<String>) -> Result<PendingIndex> {
        let stats = self.store.index_stats(index)?;
        let terms: Vec<String> = terms.into_iter().collect();

        let loaded = self.indexer.pool.fan_out(
            &terms,
            HashMap::with_capacity(terms.len()),
            |term| Ok((term.clone(), self.store.term_or_default(index, term)?)),
            |acc: &mut HashMap<_, _>, (term, stats)| {
                acc.insert(term, stats);
            },
        )?;

        Ok(PendingIndex::new(stats, loaded))
    }
}
