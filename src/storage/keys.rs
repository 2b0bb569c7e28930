//! Record key layout and value encodings.
//!
//! Keys are `fulltext:{index}:{kind}[:{id}]`. Aggregate and document-frequency values
//! are little-endian integers; postings and document records are bincode.
//! A record whose value would be zero or empty is never written: it is deleted.

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::IndexStats;
use crate::core::types::DocId;
use crate::index::inverted::DocumentRecord;
use crate::index::posting::{PostingList, TermStats};
use crate::storage::kv::WriteBatch;

pub const KEY_PREFIX: &str = "fulltext";
pub const DELIMITER: char = ':';

const POSTINGS: &str = "tf";
const DOC_FREQ: &str = "df";
const DOCUMENT: &str = "doc";
const TERM_COUNT: &str = "ts";
const DOC_COUNT: &str = "ds";

/// Index names become a key component, so they may not be empty or contain the delimiter
pub fn validate_index_name(index: &str) -> Result<()> {
    if index.is_empty() {
        return Err(Error::new(ErrorKind::InvalidArgument, "index name is empty".to_string()));
    }
    if index.contains(DELIMITER) {
        return Err(Error::new(
            ErrorKind::InvalidArgument,
            format!("index name {:?} contains '{}'", index, DELIMITER),
        ));
    }
    Ok(())
}

pub fn is_valid_index_name(index: &str) -> bool {
    validate_index_name(index).is_ok()
}

/// Every key of an index starts with this
pub fn index_prefix(index: &str) -> Vec<u8> {
    format!("{}:{}:", KEY_PREFIX, index).into_bytes()
}

pub fn postings_key(index: &str, term: &str) -> Vec<u8> {
    format!("{}:{}:{}:{}", KEY_PREFIX, index, POSTINGS, term).into_bytes()
}

pub fn doc_freq_key(index: &str, term: &str) -> Vec<u8> {
    format!("{}:{}:{}:{}", KEY_PREFIX, index, DOC_FREQ, term).into_bytes()
}

pub fn document_key(index: &str, id: &str) -> Vec<u8> {
    format!("{}:{}:{}:{}", KEY_PREFIX, index, DOCUMENT, id).into_bytes()
}

pub fn term_count_key(index: &str) -> Vec<u8> {
    format!("{}:{}:{}", KEY_PREFIX, index, TERM_COUNT).into_bytes()
}

pub fn doc_count_key(index: &str) -> Vec<u8> {
    format!("{}:{}:{}", KEY_PREFIX, index, DOC_COUNT).into_bytes()
}

/// Term suffix of a postings key produced by `postings_key(index, _)`
pub fn term_from_postings_key(index: &str, key: &[u8]) -> Option<String> {
    let prefix = postings_key(index, "");
    let term = key.strip_prefix(prefix.as_slice())?;
    String::from_utf8(term.to_vec()).ok()
}

pub fn encode_u32(value: u32) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

pub fn decode_u32(bytes: &[u8]) -> Result<u32> {
    let array: [u8; 4] = bytes
        .try_into()
        .map_err(|_| Error::corruption(format!("expected 4-byte counter, got {} bytes", bytes.len())))?;
    Ok(u32::from_le_bytes(array))
}

pub fn encode_u64(value: u64) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

pub fn decode_u64(bytes: &[u8]) -> Result<u64> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| Error::corruption(format!("expected 8-byte counter, got {} bytes", bytes.len())))?;
    Ok(u64::from_le_bytes(array))
}

pub fn encode_postings(postings: &PostingList) -> Result<Vec<u8>> {
    Ok(bincode::serialize(postings)?)
}

pub fn decode_postings(bytes: &[u8]) -> Result<PostingList> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn encode_document(record: &DocumentRecord) -> Result<Vec<u8>> {
    Ok(bincode::serialize(record)?)
}

pub fn decode_document(bytes: &[u8]) -> Result<DocumentRecord> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn stage_stats(batch: &mut WriteBatch, index: &str, stats: &IndexStats) {
    if stats.total_term_count == 0 {
        batch.delete(term_count_key(index));
    } else {
        batch.put(term_count_key(index), encode_u64(stats.total_term_count));
    }

    if stats.document_count == 0 {
        batch.delete(doc_count_key(index));
    } else {
        batch.put(doc_count_key(index), encode_u32(stats.document_count));
    }
}

pub fn stage_term(batch: &mut WriteBatch, index: &str, term: &str, stats: &TermStats) -> Result<()> {
    if stats.postings.is_empty() {
        batch.delete(postings_key(index, term));
    } else {
        batch.put(postings_key(index, term), encode_postings(&stats.postings)?);
    }

    if stats.doc_freq == 0 {
        batch.delete(doc_freq_key(index, term));
    } else {
        batch.put(doc_freq_key(index, term), encode_u32(stats.doc_freq));
    }
    Ok(())
}

pub fn stage_document(
    batch: &mut WriteBatch,
    index: &str,
    id: &DocId,
    record: Option<&DocumentRecord>,
) -> Result<()> {
    match record {
        Some(record) => batch.put(document_key(index, id.as_str()), encode_document(record)?),
        None => batch.delete(document_key(index, id.as_str())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::BatchOp;

    #[test]
    fn key_layout_is_namespaced_by_index_and_kind() {
        assert_eq!(postings_key("en", "rust"), b"fulltext:en:tf:rust".to_vec());
        assert_eq!(doc_freq_key("en", "rust"), b"fulltext:en:df:rust".to_vec());
        assert_eq!(document_key("en", "doc_1"), b"fulltext:en:doc:doc_1".to_vec());
        assert_eq!(term_count_key("en"), b"fulltext:en:ts".to_vec());
        assert_eq!(doc_count_key("en"), b"fulltext:en:ds".to_vec());
        assert!(postings_key("en", "x").starts_with(&index_prefix("en")));
    }

    #[test]
    fn term_is_recovered_from_postings_key_even_with_delimiters() {
        let key = postings_key("en", "c++:std");
        assert_eq!(term_from_postings_key("en", &key).as_deref(), Some("c++:std"));
        assert_eq!(term_from_postings_key("fr", &key), None);
    }

    #[test]
    fn index_names_are_validated() {
        assert!(validate_index_name("en").is_ok());
        assert_eq!(validate_index_name("").unwrap_err().kind, ErrorKind::InvalidArgument);
        assert_eq!(validate_index_name("a:b").unwrap_err().kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn counters_reject_wrong_widths() {
        assert_eq!(decode_u32(&encode_u32(7)).unwrap(), 7);
        assert_eq!(decode_u64(&encode_u64(1 << 40)).unwrap(), 1 << 40);
        assert_eq!(decode_u32(&[1, 2]).unwrap_err().kind, ErrorKind::Corruption);
    }

    #[test]
    fn zero_aggregates_and_empty_terms_stage_deletes() {
        let mut batch = WriteBatch::new();
        stage_stats(&mut batch, "en", &IndexStats::default());
        stage_term(&mut batch, "en", "gone", &TermStats::default()).unwrap();

        assert_eq!(batch.len(), 4);
        assert!(batch.ops().iter().all(|op| matches!(op, BatchOp::Delete(_))));
    }
}
