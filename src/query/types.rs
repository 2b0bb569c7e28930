use serde::{Deserialize, Serialize};

/// Boolean query over one index
///
/// `match_text` is analysed like document text; `must`, `should` and `must_not`
/// hold already-normalised terms and are looked up verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub index: String,
    pub match_text: Option<String>,
    pub must: Vec<String>,       // Scored, and every hit must contain each term
    pub should: Vec<String>,     // Scored only
    pub must_not: Vec<String>,   // Excludes, never scored
    pub from: usize,
    pub size: usize,             // 0 = engine default page size
}

impl Query {
    pub fn new(index: impl Into<String>) -> Self {
        Query {
            index: index.into(),
            ..Query::default()
        }
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn matching(mut self, text: impl Into<String>) -> Self {
        self.match_text = Some(text.into());
        self
    }

    pub fn must<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.must = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn should<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.should = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn must_not<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.must_not = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, from: usize, size: usize) -> Self {
        self.from = from;
        self.size = size;
        self
    }
}
