#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use kvsearch::storage::gateway::IndexStore;
use kvsearch::storage::keys;
use kvsearch::{Config, Engine, Error, KvStore, MemoryStore, Result, ScanControl, WhitespaceTokenizer, WriteBatch};

/// The five-document corpus used by the boolean filtering and scoring tests
pub const CORPUS: [(&str, &str); 5] = [
    ("0", "a a a b c d h"),
    ("1", "a b b c"),
    ("2", "c d d h"),
    ("3", "a c d h l"),
    ("4", "d"),
];

pub fn engine_over(store: Arc<dyn KvStore>) -> Engine {
    Engine::builder(Config::default())
        .tokenizer(Arc::new(WhitespaceTokenizer))
        .store(store)
        .build()
        .unwrap()
}

pub fn memory_engine() -> (Engine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (engine_over(store.clone()), store)
}

/// Recompute every aggregate of `index` from raw records and compare with what is stored
pub fn assert_consistent(kv: Arc<dyn KvStore>, index: &str) {
    let store = IndexStore::new(kv.clone());

    let postings_keys = kv.keys_with_prefix(&keys::postings_key(index, ""), usize::MAX).unwrap();
    for key in &postings_keys {
        let term = keys::term_from_postings_key(index, key).unwrap();
        let stats = store.term(index, &term).unwrap().unwrap();
        assert!(!stats.postings.is_empty(), "empty postings stored for {:?}", term);
        assert_eq!(stats.doc_freq as usize, stats.postings.len(), "doc_freq mismatch for {:?}", term);
    }

    let doc_freq_keys = kv.keys_with_prefix(&keys::doc_freq_key(index, ""), usize::MAX).unwrap();
    assert_eq!(doc_freq_keys.len(), postings_keys.len(), "document frequency without postings");

    let mut documents = 0u32;
    let mut total_terms = 0u64;
    for key in kv.keys_with_prefix(&keys::document_key(index, ""), usize::MAX).unwrap() {
        let bytes = kv.get(&key).unwrap().unwrap();
        let record = keys::decode_document(&bytes).unwrap();
        documents += 1;
        total_terms += record.length as u64;
    }

    let stats = store.index_stats(index).unwrap();
    assert_eq!(stats.document_count, documents, "document count drifted");
    assert_eq!(stats.total_term_count, total_terms, "total term count drifted");
}

/// Store whose writes can be made to fail, for all-or-nothing checks
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl FailingStore {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

impl KvStore for FailingStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::storage("injected read failure"));
        }
        self.inner.get(key)
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::storage("injected write failure"));
        }
        self.inner.write_batch(batch)
    }

    fn scan_prefix(&self, prefix: &[u8], visit: &mut dyn FnMut(&[u8]) -> ScanControl) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::storage("injected scan failure"));
        }
        self.inner.scan_prefix(prefix, visit)
    }

    fn destroy(&self) -> Result<()> {
        self.inner.destroy()
    }
}
