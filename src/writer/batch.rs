use std::collections::{BTreeMap, BTreeSet};
use crate::core::error::{Error, Result};
use crate::core::types::DocId;

/// Documents of one add call, keyed by id; a repeated id keeps its last text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentBatch {
    pub documents: Vec<(DocId, String)>,   // Sorted by id
}

impl DocumentBatch {
    pub fn new<I, K, V>(documents: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<DocId>,
        V: Into<String>,
    {
        let documents: BTreeMap<DocId, String> = documents
            .into_iter()
            .map(|(id, text)| (id.into(), text.into()))
            .collect();

        DocumentBatch {
            documents: documents.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn ids(&self) -> Vec<DocId> {
        self.documents.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn check_limit(&self, max: usize) -> Result<()> {
        check_limit("add_documents", self.len(), max)
    }
}

/// Document ids of one delete call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdBatch {
    pub requested: usize,   // Ids as passed in, duplicates included
    pub ids: Vec<DocId>,    // Distinct, sorted
}

impl IdBatch {
    pub fn new<I, K>(ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<DocId>,
    {
        let mut requested = 0;
        let ids: BTreeSet<DocId> = ids
            .into_iter()
            .inspect(|_| requested += 1)
            .map(Into::into)
            .collect();

        IdBatch {
            requested,
            ids: ids.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn check_limit(&self, max: usize) -> Result<()> {
        check_limit("delete_documents", self.requested, max)
    }
}

fn check_limit(operation: &str, len: usize, max: usize) -> Result<()> {
    if len > max {
        return Err(Error::batch_too_large(operation, len, max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn repeated_ids_keep_last_text() {
        let batch = DocumentBatch::new([("b", "one"), ("a", "two"), ("b", "three")]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.documents[0], (DocId::from("a"), "two".to_string()));
        assert_eq!(batch.documents[1].1, "three");
    }

    #[test]
    fn limit_is_inclusive() {
        let docs: Vec<(String, String)> = (0..1000).map(|i| (i.to_string(), "x".to_string())).collect();
        assert!(DocumentBatch::new(docs.clone()).check_limit(1000).is_ok());

        let mut over = docs;
        over.push(("1000".to_string(), "x".to_string()));
        let err = DocumentBatch::new(over).check_limit(1000).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BatchTooLarge);
    }

    #[test]
    fn delete_limit_counts_requested_ids() {
        let batch = IdBatch::new(vec!["a"; 3]);
        assert_eq!(batch.ids.len(), 1);
        assert_eq!(batch.requested, 3);
        assert!(batch.check_limit(2).is_err());
    }
}
