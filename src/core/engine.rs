use std::sync::Arc;
use tracing::{debug, info};
use crate::analysis::analyzer::Analyzer;
use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::stopword::StopWordFilter;
use crate::analysis::tokenizer::Tokenizer;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::stats::IndexStats;
use crate::core::types::DocId;
use crate::index::inverted::DocumentRecord;
use crate::index::posting::TermStats;
use crate::parallel::indexer::{ParallelIndexer, WorkerPool};
use crate::query::types::Query;
use crate::scoring::scorer::BM25Scorer;
use crate::search::executor::QueryExecutor;
use crate::search::prefix::Suggester;
use crate::search::results::SearchResults;
use crate::storage::disk::DiskStore;
use crate::storage::gateway::IndexStore;
use crate::storage::keys;
use crate::storage::kv::KvStore;
use crate::storage::memory::MemoryStore;
use crate::writer::batch::{DocumentBatch, IdBatch};
use crate::writer::index_writer::IndexWriter;

/// Embeddable full-text engine over named inverted indexes
///
/// ```no_run
/// use std::sync::Arc;
/// use kvsearch::{Config, Engine, Query, WhitespaceTokenizer};
///
/// let engine = Engine::open(Config::with_storage_path("./data"), Arc::new(WhitespaceTokenizer))?;
/// engine.add_documents("articles", [("doc-1", "rust full text search")])?;
/// let results = engine.search(&Query::new("articles").matching("search"))?;
/// assert_eq!(results.hits[0].doc_id.as_str(), "doc-1");
/// # Ok::<(), kvsearch::Error>(())
/// ```
pub struct Engine {
    config: Config,
    store: IndexStore,
    analyzer: Arc<Analyzer>,
    writer: IndexWriter,
    executor: QueryExecutor,
    suggester: Suggester,
}

impl Engine {
    pub fn builder(config: Config) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    /// Open or create the disk-backed engine under `config.storage_path`
    pub fn open(config: Config, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
        EngineBuilder::new(config).tokenizer(tokenizer).build()
    }

    /// Engine over a fresh `MemoryStore` with default configuration
    pub fn in_memory(tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
        EngineBuilder::new(Config::default())
            .tokenizer(tokenizer)
            .store(Arc::new(MemoryStore::new()))
            .build()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analyzer(&self) -> &Arc<Analyzer> {
        &self.analyzer
    }

    /// Index up to `max_batch_docs` documents in one atomic commit
    ///
    /// Returns the number of distinct documents written. Re-adding an id replaces the
    /// stored document.
    pub fn add_documents<I, K, V>(&self, index: &str, documents: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<DocId>,
        V: Into<String>,
    {
        self.writer.add_documents(index, DocumentBatch::new(documents))
    }

    /// Remove up to `max_batch_docs` documents in one atomic commit
    ///
    /// Returns the number of documents that were actually indexed and removed.
    pub fn delete_documents<I, K>(&self, index: &str, ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = K>,
        K: Into<DocId>,
    {
        self.writer.delete_documents(index, IdBatch::new(ids))
    }

    /// Same as `delete_documents`
    pub fn remove_documents<I, K>(&self, index: &str, ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = K>,
        K: Into<DocId>,
    {
        self.delete_documents(index, ids)
    }

    /// Drop every record of an index
    ///
    /// Runs in atomic sub-batches of `remove_batch_limit` keys, so a failure part way
    /// leaves the index partially removed.
    pub fn remove_index(&self, index: &str) -> Result<usize> {
        self.writer.remove_index(index)
    }

    /// Delete the whole persistent store
    pub fn wipe(self) -> Result<()> {
        self.store.destroy()?;
        info!(path = %self.config.db_path().display(), "engine store wiped");
        Ok(())
    }

    pub fn search(&self, query: &Query) -> Result<SearchResults> {
        self.executor.execute(query)
    }

    pub fn suggest(&self, index: &str, text: &str) -> Result<Vec<String>> {
        self.suggester.suggest(index, text)
    }

    pub fn index_stats(&self, index: &str) -> Result<IndexStats> {
        if !keys::is_valid_index_name(index) {
            return Ok(IndexStats::default());
        }
        self.store.index_stats(index)
    }

    pub fn term(&self, index: &str, term: &str) -> Result<Option<TermStats>> {
        if !keys::is_valid_index_name(index) {
            return Ok(None);
        }
        self.store.term(index, term)
    }

    pub fn document(&self, index: &str, id: &str) -> Result<Option<DocumentRecord>> {
        if !keys::is_valid_index_name(index) {
            return Ok(None);
        }
        self.store.document(index, &DocId::from(id))
    }

    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }

    /// Flush and release the store
    pub fn close(self) -> Result<()> {
        self.store.flush()?;
        debug!("engine closed");
        Ok(())
    }
}

/// Assembles an `Engine`; a tokenizer is mandatory
pub struct EngineBuilder {
    config: Config,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    filters: Vec<Arc<dyn TokenFilter>>,
    stop_words: Option<StopWordFilter>,
    store: Option<Arc<dyn KvStore>>,
}

impl EngineBuilder {
    pub fn new(config: Config) -> Self {
        EngineBuilder {
            config,
            tokenizer: None,
            filters: Vec::new(),
            stop_words: None,
            store: None,
        }
    }

    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Take tokenizer, filters and stop words from a prepared analyzer
    pub fn analyzer(mut self, analyzer: Analyzer) -> Self {
        self.tokenizer = Some(analyzer.tokenizer);
        self.filters = analyzer.filters;
        self.stop_words = Some(analyzer.stop_words);
        self
    }

    pub fn filter(mut self, filter: Arc<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replaces any stop-word file named by the configuration
    pub fn stop_words(mut self, stop_words: StopWordFilter) -> Self {
        self.stop_words = Some(stop_words);
        self
    }

    /// Use a caller-supplied store instead of opening a `DiskStore`
    pub fn store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Engine> {
        let tokenizer = self
            .tokenizer
            .ok_or_else(|| Error::configuration("engine requires a tokenizer"))?;
        self.config.validate()?;

        let stop_words = match self.stop_words {
            Some(stop_words) => stop_words,
            None if self.store.is_none() || self.config.stop_words_path.is_some() => {
                StopWordFilter::from_file(self.config.stop_words_file())?
            }
            None => StopWordFilter::default(),
        };

        let kv: Arc<dyn KvStore> = match self.store {
            Some(store) => store,
            None => Arc::new(DiskStore::open_with_config(&self.config)?),
        };

        let mut analyzer = Analyzer::new(tokenizer).with_stop_words(stop_words);
        analyzer.filters = self.filters;
        let analyzer = Arc::new(analyzer);

        let store = IndexStore::new(kv);
        let pool = WorkerPool::new(self.config.max_workers)?;
        let scorer = BM25Scorer::new(self.config.k1, self.config.b);

        let writer = IndexWriter::new(
            store.clone(),
            ParallelIndexer::new(pool.clone(), Arc::clone(&analyzer)),
            self.config.max_batch_docs,
            self.config.remove_batch_limit,
        );
        let executor = QueryExecutor::new(
            store.clone(),
            Arc::clone(&analyzer),
            pool.clone(),
            scorer,
            self.config.default_page_size,
        );
        let suggester = Suggester::new(store.clone(), Arc::clone(&analyzer), pool.clone());

        info!(
            analyzer = %analyzer.describe(),
            stop_words = analyzer.stop_words.len(),
            max_workers = pool.max_workers(),
            "engine ready"
        );

        Ok(Engine {
            config: self.config,
            store,
            analyzer,
            writer,
            executor,
            suggester,
        })
    }
}
