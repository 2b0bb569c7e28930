use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use crate::analysis::analyzer::Analyzer;
use crate::core::error::Result;
use crate::core::types::DocId;
use crate::index::posting::{PostingList, TermStats};
use crate::parallel::indexer::WorkerPool;
use crate::query::types::Query;
use crate::scoring::scorer::BM25Scorer;
use crate::search::results::{paginate, ScoredDocument, SearchResults};
use crate::storage::gateway::IndexStore;
use crate::storage::keys;

type TermCache = HashMap<String, Option<TermStats>>;

/// Evaluates boolean queries and ranks the survivors with BM25
pub struct QueryExecutor {
    pub store: IndexStore,
    pub analyzer: Arc<Analyzer>,
    pub pool: WorkerPool,
    pub scorer: BM25Scorer,
    pub default_page_size: usize,
}

impl QueryExecutor {
    pub fn new(
        store: IndexStore,
        analyzer: Arc<Analyzer>,
        pool: WorkerPool,
        scorer: BM25Scorer,
        default_page_size: usize,
    ) -> Self {
        QueryExecutor {
            store,
            analyzer,
            pool,
            scorer,
            default_page_size,
        }
    }

    pub fn execute(&self, query: &Query) -> Result<SearchResults> {
        let start = Instant::now();
        let took = |start: Instant| start.elapsed().as_millis() as u64;

        if !keys::is_valid_index_name(&query.index) {
            return Ok(SearchResults::empty(took(start)));
        }
        let index = query.index.as_str();

        let mut cache = self.fetch_match_terms(index, query)?;
        let mut scoring: BTreeMap<String, TermStats> = cache
            .iter()
            .filter_map(|(term, stats)| stats.clone().map(|stats| (term.clone(), stats)))
            .collect();

        for term in &query.should {
            if let Some(stats) = self.lookup(index, term, &mut cache)? {
                scoring.entry(term.clone()).or_insert(stats);
            }
        }

        let mut required: Vec<PostingList> = Vec::new();
        for term in &query.must {
            if let Some(stats) = self.lookup(index, term, &mut cache)? {
                required.push(stats.postings.clone());
                scoring.entry(term.clone()).or_insert(stats);
            }
        }

        if scoring.is_empty() {
            debug!(index, "search matched no terms");
            return Ok(SearchResults::empty(took(start)));
        }

        let mut excluded: Vec<PostingList> = Vec::new();
        for term in &query.must_not {
            if let Some(stats) = self.lookup(index, term, &mut cache)? {
                excluded.push(stats.postings);
            }
        }

        for stats in scoring.values_mut() {
            stats.postings.retain(|id| {
                required.iter().all(|postings| postings.contains(id.as_str()))
                    && !excluded.iter().any(|postings| postings.contains(id.as_str()))
            });
        }

        let scored = self.score(index, &scoring)?;
        let size = if query.size == 0 { self.default_page_size } else { query.size };
        let results = paginate(scored, query.from, size, took(start));

        debug!(
            index,
            terms = scoring.len(),
            total_hits = results.total_hits,
            returned = results.hits.len(),
            "search executed"
        );
        Ok(results)
    }

    /// Distinct non-stop-word tokens of the match text, looked up concurrently
    fn fetch_match_terms(&self, index: &str, query: &Query) -> Result<TermCache> {
        let Some(text) = query.match_text.as_deref().filter(|text| !text.is_empty()) else {
            return Ok(TermCache::new());
        };

        let tokens: Vec<String> = self
            .analyzer
            .analyze(text)
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        self.pool.fan_out(
            &tokens,
            TermCache::with_capacity(tokens.len()),
            |token| Ok((token.clone(), self.store.term(index, token)?)),
            |cache: &mut TermCache, (token, stats)| {
                cache.insert(token, stats);
            },
        )
    }

    fn lookup(&self, index: &str, term: &str, cache: &mut TermCache) -> Result<Option<TermStats>> {
        if let Some(stats) = cache.get(term) {
            return Ok(stats.clone());
        }
        let stats = self.store.term(index, term)?;
        cache.insert(term.to_string(), stats.clone());
        Ok(stats)
    }

    fn score(&self, index: &str, scoring: &BTreeMap<String, TermStats>) -> Result<Vec<ScoredDocument>> {
        let stats = self.store.index_stats(index)?;
        let scorer = self.scorer.prepare(&stats);

        let mut scores: HashMap<&DocId, f32> = HashMap::new();
        for term in scoring.values() {
            if term.postings.is_empty() {
                continue;
            }
            let idf = scorer.idf(term.doc_freq);
            for (id, tf) in term.postings.iter() {
                *scores.entry(id).or_insert(0.0) += scorer.term_score(tf) * idf;
            }
        }

        Ok(scores
            .into_iter()
            .map(|(id, score)| ScoredDocument::new(id.clone(), score))
            .collect())
    }
}
