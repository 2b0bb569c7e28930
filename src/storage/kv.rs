use serde::{Deserialize, Serialize};
use crate::core::error::Result;

/// Single operation inside an atomic batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

impl BatchOp {
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOp::Put(key, _) => key,
            BatchOp::Delete(key) => key,
        }
    }
}

/// Ordered set of puts and deletes applied all-or-nothing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch { ops: Vec::new() }
    }

    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Put(key.into(), value.into()));
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Delete(key.into()));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Returned by scan visitors to keep going or stop early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Stop,
}

/// Ordered byte-key/byte-value substrate
///
/// `get` returns `Ok(None)` for a missing key; errors are reserved for real failures.
/// `write_batch` must apply every operation or none of them.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn write_batch(&self, batch: WriteBatch) -> Result<()>;

    /// Visit keys starting with `prefix` in ascending order.
    /// The visitor must not call back into the store.
    fn scan_prefix(&self, prefix: &[u8], visit: &mut dyn FnMut(&[u8]) -> ScanControl) -> Result<()>;

    /// Delete every key and any files backing the store
    fn destroy(&self) -> Result<()>;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.put(key, value);
        self.write_batch(batch)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.delete(key);
        self.write_batch(batch)
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Up to `limit` keys under `prefix`, in key order
    fn keys_with_prefix(&self, prefix: &[u8], limit: usize) -> Result<Vec<Vec<u8>>> {
        let mut keys = Vec::new();
        if limit == 0 {
            return Ok(keys);
        }
        self.scan_prefix(prefix, &mut |key| {
            keys.push(key.to_vec());
            if keys.len() >= limit {
                ScanControl::Stop
            } else {
                ScanControl::Continue
            }
        })?;
        Ok(keys)
    }
}

/// Exclusive upper bound of the key range sharing `prefix`
pub(crate) fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_bumps_last_byte() {
        assert_eq!(prefix_successor(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(prefix_successor(&[b'a', 0xff]), Some(b"b".to_vec()));
        assert_eq!(prefix_successor(&[0xff, 0xff]), None);
        assert_eq!(prefix_successor(b""), None);
    }

    #[test]
    fn batch_preserves_operation_order() {
        let mut batch = WriteBatch::new();
        batch.put(b"k1".to_vec(), b"v1".to_vec());
        batch.delete(b"k2".to_vec());
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.ops()[0].key(), b"k1");
        assert_eq!(batch.ops()[1], BatchOp::Delete(b"k2".to_vec()));
    }
}
