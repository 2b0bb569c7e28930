use crate::core::stats::IndexStats;

/// BM25 with index-wide length normalisation
///
/// The normalisation ratio is `N / μ` (document count over mean document length),
/// so a term's score depends on its in-document frequency and on index aggregates
/// only, never on the length of the individual document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BM25Scorer {
    pub k1: f32,  // Term frequency saturation (default: 1.4)
    pub b: f32,   // Length normalization strength (default: 0.75)
}

impl Default for BM25Scorer {
    fn default() -> Self {
        BM25Scorer {
            k1: 1.4,
            b: 0.75,
        }
    }
}

impl BM25Scorer {
    pub fn new(k1: f32, b: f32) -> Self {
        BM25Scorer { k1, b }
    }

    /// Aggregates fixed for the duration of one search
    pub fn prepare(&self, stats: &IndexStats) -> PreparedScorer {
        let n = stats.document_count as f32;
        let mean = stats.mean_length();
        let length_ratio = if mean > 0.0 { n / mean } else { 1.0 };

        PreparedScorer {
            k1: self.k1,
            b: self.b,
            n,
            length_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreparedScorer {
    k1: f32,
    b: f32,
    n: f32,              // Document count
    length_ratio: f32,   // N / μ
}

impl PreparedScorer {
    pub fn idf(&self, doc_freq: u32) -> f32 {
        let df = doc_freq as f32;
        let ratio = 1.0 + (self.n - df + 0.5) / (df + 0.5);
        (ratio as f64).ln() as f32
    }

    pub fn term_score(&self, term_freq: u32) -> f32 {
        let tf = term_freq as f32;
        (tf * (self.k1 + 1.0)) / (tf + self.k1 * (1.0 - self.b + self.b * self.length_ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn idf_for_small_corpus() {
        let scorer = BM25Scorer::default().prepare(&IndexStats { document_count: 5, total_term_count: 20 });
        // ln(1 + (5 - 3 + 0.5) / 3.5)
        assert!(close(scorer.idf(3), (1.0f64 + 2.5 / 3.5).ln() as f32));
        assert!(scorer.idf(1) > scorer.idf(4));
    }

    #[test]
    fn term_score_uses_document_count_over_mean_length() {
        // N = 5, μ = 4, N/μ = 1.25
        let scorer = BM25Scorer::default().prepare(&IndexStats { document_count: 5, total_term_count: 20 });
        let expected = (2.0 * 2.4) / (2.0 + 1.4 * (1.0 - 0.75 + 0.75 * 1.25));
        assert!(close(scorer.term_score(2), expected));
    }

    #[test]
    fn term_score_saturates() {
        let scorer = BM25Scorer::default().prepare(&IndexStats { document_count: 10, total_term_count: 100 });
        assert!(scorer.term_score(2) > scorer.term_score(1));
        assert!(scorer.term_score(1000) < 2.4 + 1e-3);
    }

    #[test]
    fn empty_index_does_not_produce_nan() {
        let scorer = BM25Scorer::default().prepare(&IndexStats::default());
        assert!(scorer.term_score(1).is_finite());
        assert!(scorer.idf(0).is_finite());
    }
}
