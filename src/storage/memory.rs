use std::collections::BTreeMap;
use std::ops::Bound;
use parking_lot::RwLock;
use crate::core::error::Result;
use crate::storage::kv::{prefix_successor, BatchOp, KvStore, ScanControl, WriteBatch};

pub type KeyMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// Volatile ordered store, used for tests and throwaway indexes
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<KeyMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

pub(crate) fn apply_ops(map: &mut KeyMap, ops: Vec<BatchOp>) {
    for op in ops {
        match op {
            BatchOp::Put(key, value) => {
                map.insert(key, value);
            }
            BatchOp::Delete(key) => {
                map.remove(&key);
            }
        }
    }
}

pub(crate) fn scan_map(map: &KeyMap, prefix: &[u8], visit: &mut dyn FnMut(&[u8]) -> ScanControl) {
    let upper = match prefix_successor(prefix) {
        Some(end) => Bound::Excluded(end),
        None => Bound::Unbounded,
    };
    for (key, _) in map.range::<Vec<u8>, _>((Bound::Included(prefix.to_vec()), upper)) {
        if visit(key) == ScanControl::Stop {
            break;
        }
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        let mut map = self.map.write();
        apply_ops(&mut map, batch.into_ops());
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8], visit: &mut dyn FnMut(&[u8]) -> ScanControl) -> Result<()> {
        let map = self.map.read();
        scan_map(&map, prefix, visit);
        Ok(())
    }

    fn destroy(&self) -> Result<()> {
        self.map.write().clear();
        Ok(())
    }
}
