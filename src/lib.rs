pub mod core;
pub mod storage;
pub mod analysis;
pub mod index;
pub mod scoring;
pub mod search;
pub mod query;
pub mod writer;
pub mod parallel;

pub use crate::analysis::analyzer::Analyzer;
pub use crate::analysis::filters::stopword::StopWordFilter;
pub use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer, WhitespaceTokenizer};
pub use crate::core::config::Config;
pub use crate::core::engine::{Engine, EngineBuilder};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::stats::IndexStats;
pub use crate::core::types::DocId;
pub use crate::query::types::Query;
pub use crate::search::results::{ScoredDocument, SearchResults};
pub use crate::storage::disk::DiskStore;
pub use crate::storage::kv::{KvStore, ScanControl, WriteBatch};
pub use crate::storage::memory::MemoryStore;

/*
┌──────────────────────────────────── ENGINE ────────────────────────────────────┐
│                                                                                │
│  struct Engine                                                                 │
│    config: Config               // BM25 parameters, batch caps, store options  │
│    store: IndexStore            // Typed records over Arc<dyn KvStore>         │
│    analyzer: Arc<Analyzer>      // Tokenizer + filters + stop words            │
│    writer: IndexWriter          // add / delete / remove index                 │
│    executor: QueryExecutor      // boolean filter + BM25 ranking               │
│    suggester: Suggester         // prefix scan over term keys                  │
│                                                                                │
└────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── MUTATION PATH ─────────────────────────────────┐
│                                                                                │
│  add_documents(index, docs)                                                    │
│    DocumentBatch ──► ParallelIndexer (WorkerPool, ≤ max_workers)               │
│                 ──► WriterLocks::for_index(index)                              │
│                 ──► load replaced DocumentRecords + touched TermStats          │
│                 ──► PendingIndex (remove old, add new)                         │
│                 ──► one WriteBatch ──► KvStore::write_batch                    │
│                                                                                │
└────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── KEY LAYOUT ────────────────────────────────────┐
│                                                                                │
│  fulltext:{index}:tf:{term}    bincode PostingList    (doc id → tf)            │
│  fulltext:{index}:df:{term}    u32 LE                 (document frequency)     │
│  fulltext:{index}:doc:{id}     bincode DocumentRecord (terms, length)          │
│  fulltext:{index}:ts           u64 LE                 (total term count)       │
│  fulltext:{index}:ds           u32 LE                 (document count)         │
│                                                                                │
│  DiskStore: BTreeMap ◄── WAL frames [len|crc32|bincode ops] ◄── lz4 snapshot   │
│                                                                                │
└────────────────────────────────────────────────────────────────────────────────┘
*/
