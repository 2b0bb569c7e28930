use std::fs::{self, File};
use std::io::Write;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::storage::layout::StorageLayout;
use crate::storage::memory::KeyMap;
use crate::core::error::Result;

/// Point-in-time image of the whole key space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub wal_position: u64,          // First WAL sequence not covered by this image
    pub timestamp: DateTime<Utc>,
    pub entries: KeyMap,
}

// Same field layout as `Checkpoint`, borrowed so saving does not clone the map
#[derive(Serialize)]
struct CheckpointRef<'a> {
    wal_position: u64,
    timestamp: DateTime<Utc>,
    entries: &'a KeyMap,
}

impl Checkpoint {
    /// Load checkpoint from disk
    pub fn load(storage: &StorageLayout) -> Result<Option<Self>> {
        let path = storage.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }

        let compressed = fs::read(path)?;
        let data = lz4_flex::decompress_size_prepended(&compressed)?;
        let checkpoint = bincode::deserialize(&data)?;
        Ok(Some(checkpoint))
    }

    /// Write an lz4-compressed image and atomically replace the previous one
    pub fn save(storage: &StorageLayout, wal_position: u64, entries: &KeyMap) -> Result<()> {
        let data = bincode::serialize(&CheckpointRef {
            wal_position,
            timestamp: Utc::now(),
            entries,
        })?;
        let compressed = lz4_flex::compress_prepend_size(&data);

        let tmp = storage.snapshot_tmp_path();
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&compressed)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, storage.snapshot_path())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_snapshot_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().to_path_buf()).unwrap();
        assert!(Checkpoint::load(&layout).unwrap().is_none());
    }

    #[test]
    fn saved_snapshot_restores_entries_and_position() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().to_path_buf()).unwrap();

        let mut entries = KeyMap::new();
        entries.insert(b"fulltext:en:ds".to_vec(), 3u32.to_le_bytes().to_vec());
        entries.insert(b"fulltext:en:ts".to_vec(), 12u64.to_le_bytes().to_vec());
        Checkpoint::save(&layout, 42, &entries).unwrap();

        let checkpoint = Checkpoint::load(&layout).unwrap().unwrap();
        assert_eq!(checkpoint.wal_position, 42);
        assert_eq!(checkpoint.entries, entries);
        assert!(!layout.snapshot_tmp_path().exists());
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().to_path_buf()).unwrap();
        fs::write(layout.snapshot_path(), [10, 0, 0, 0, 0xff, 0xff]).unwrap();

        let err = Checkpoint::load(&layout).unwrap_err();
        assert!(err.is_storage());
    }
}
