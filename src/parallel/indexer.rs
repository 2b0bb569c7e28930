use std::sync::Arc;
use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use crate::analysis::analyzer::Analyzer;
use crate::core::error::{Error, Result};
use crate::core::types::DocId;
use crate::index::inverted::AnalysedDocument;

/// Bounded fan-out shared by the mutation pipeline, search and suggestions
///
/// A single item runs inline on the caller's thread. Larger inputs run on a pool of
/// at most `max_workers` threads; results are folded into one accumulator behind a
/// single lock, and the first error stops further scheduling.
#[derive(Clone)]
pub struct WorkerPool {
    pool: Arc<ThreadPool>,
    max_workers: usize,
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Result<Self> {
        let max_workers = max_workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .thread_name(|i| format!("kvsearch-worker-{}", i))
            .build()
            .map_err(|e| Error::configuration(format!("failed to start worker pool: {}", e)))?;

        Ok(WorkerPool {
            pool: Arc::new(pool),
            max_workers,
        })
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Run `task` for each item and `merge` every result into `acc`
    pub fn fan_out<T, A, R, F, M>(&self, items: &[T], acc: A, task: F, merge: M) -> Result<A>
    where
        T: Sync,
        A: Send,
        R: Send,
        F: Fn(&T) -> Result<R> + Sync,
        M: Fn(&mut A, R) + Sync,
    {
        if items.len() <= 1 {
            let mut acc = acc;
            for item in items {
                let result = task(item)?;
                merge(&mut acc, result);
            }
            return Ok(acc);
        }

        let shared = Mutex::new(acc);
        self.pool.install(|| {
            items.par_iter().try_for_each(|item| {
                let result = task(item)?;
                merge(&mut shared.lock(), result);
                Ok::<(), Error>(())
            })
        })?;

        Ok(shared.into_inner())
    }
}

/// Turns raw documents into term-frequency maps on the worker pool
pub struct ParallelIndexer {
    pub pool: WorkerPool,
    pub analyzer: Arc<Analyzer>,
}

impl ParallelIndexer {
    pub fn new(pool: WorkerPool, analyzer: Arc<Analyzer>) -> Self {
        ParallelIndexer { pool, analyzer }
    }

    pub fn analyze_document(&self, id: &DocId, text: &str) -> AnalysedDocument {
        AnalysedDocument::from_terms(id.clone(), self.analyzer.analyze(text))
    }

    /// Analysed documents in input order
    pub fn analyze_batch(&self, documents: &[(DocId, String)]) -> Result<Vec<AnalysedDocument>> {
        let mut analysed = self.pool.fan_out(
            documents,
            Vec::with_capacity(documents.len()),
            |(id, text)| Ok(self.analyze_document(id, text)),
            |acc: &mut Vec<AnalysedDocument>, doc| acc.push(doc),
        )?;
        analysed.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(analysed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::analysis::tokenizer::WhitespaceTokenizer;
    use crate::core::error::ErrorKind;

    #[test]
    fn fan_out_merges_every_result() {
        let pool = WorkerPool::new(5).unwrap();
        let items: Vec<u64> = (1..=100).collect();
        let sum = pool.fan_out(&items, 0u64, |&n| Ok(n * 2), |acc, n| *acc += n).unwrap();
        assert_eq!(sum, 10_100);
    }

    #[test]
    fn single_item_runs_inline() {
        let pool = WorkerPool::new(3).unwrap();
        let caller = std::thread::current().id();
        let seen = pool
            .fan_out(&[1u8][..], None, |_| Ok(std::thread::current().id()), |acc, id| *acc = Some(id))
            .unwrap();
        assert_eq!(seen, Some(caller));
    }

    #[test]
    fn first_error_fails_the_call() {
        let pool = WorkerPool::new(2).unwrap();
        let items: Vec<u32> = (0..1000).collect();
        let ran = AtomicUsize::new(0);

        let err = pool
            .fan_out(
                &items,
                (),
                |&n| {
                    ran.fetch_add(1, Ordering::Relaxed);
                    if n == 3 {
                        Err(Error::storage("lookup failed"))
                    } else {
                        Ok(())
                    }
                },
                |_, _| {},
            )
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(ran.load(Ordering::Relaxed) <= items.len());
    }

    #[test]
    fn analyze_batch_is_ordered_by_id() {
        let analyzer = Arc::new(Analyzer::new(Arc::new(WhitespaceTokenizer)));
        let indexer = ParallelIndexer::new(WorkerPool::new(4).unwrap(), analyzer);
        let docs: Vec<(DocId, String)> = (0..20)
            .rev()
            .map(|i| (DocId::from(format!("d{:02}", i)), format!("t{} common", i)))
            .collect();

        let analysed = indexer.analyze_batch(&docs).unwrap();
        assert_eq!(analysed.len(), 20);
        assert_eq!(analysed[0].id.as_str(), "d00");
        assert!(analysed.iter().all(|d| d.length == 2 && d.term_freqs["common"] == 1));
    }
}
