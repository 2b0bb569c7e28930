use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::storage::checkpoint::Checkpoint;
use crate::storage::file_lock::FileLock;
use crate::storage::kv::{KvStore, ScanControl, WriteBatch};
use crate::storage::layout::StorageLayout;
use crate::storage::memory::{apply_ops, scan_map, KeyMap};
use crate::storage::wal::{SyncMode, WAL};

/// Durable ordered store: in-memory map + write-ahead log + periodic snapshot
///
/// Each `write_batch` becomes a single checksummed WAL frame, so recovery either
/// replays a batch completely or drops it as a torn tail.
pub struct DiskStore {
    layout: StorageLayout,
    map: RwLock<KeyMap>,
    wal: Mutex<WAL>,   // Held across append + apply so map order matches log order
    compaction_threshold: u64,
    destroyed: AtomicBool,
    _lock: FileLock,
}

impl DiskStore {
    pub fn open(path: impl Into<PathBuf>, sync_mode: SyncMode, compaction_threshold: u64) -> Result<Self> {
        let layout = StorageLayout::new(path.into())?;
        let lock = FileLock::acquire(&layout)?;
        let (map, wal) = Self::recover(&layout, sync_mode)?;

        info!(
            path = %layout.base_dir.display(),
            keys = map.len(),
            next_sequence = wal.sequence,
            "opened disk store"
        );

        Ok(DiskStore {
            layout,
            map: RwLock::new(map),
            wal: Mutex::new(wal),
            compaction_threshold,
            destroyed: AtomicBool::new(false),
            _lock: lock,
        })
    }

    pub fn open_with_config(config: &Config) -> Result<Self> {
        Self::open(config.db_path(), config.sync_mode, config.compaction_threshold_bytes)
    }

    pub fn path(&self) -> &Path {
        &self.layout.base_dir
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Snapshot the key space and drop the WAL files it covers
    pub fn checkpoint(&self) -> Result<()> {
        self.ensure_open()?;
        let mut wal = self.wal.lock();
        self.checkpoint_locked(&mut wal)
    }

    fn checkpoint_locked(&self, wal: &mut WAL) -> Result<()> {
        let position = wal.sequence;
        {
            let map = self.map.read();
            Checkpoint::save(&self.layout, position, &map)?;
        }

        wal.rotate(&self.layout)?;
        for seq in WAL::find_wal_files(&self.layout)? {
            if seq < wal.file_sequence {
                fs::remove_file(self.layout.wal_path(seq))?;
            }
        }

        info!(wal_position = position, "checkpointed disk store");
        Ok(())
    }

    fn recover(layout: &StorageLayout, sync_mode: SyncMode) -> Result<(KeyMap, WAL)> {
        let (mut map, start) = match Checkpoint::load(layout)? {
            Some(checkpoint) => (checkpoint.entries, checkpoint.wal_position),
            None => (KeyMap::new(), 0),
        };

        let files = WAL::find_wal_files(layout)?;
        let mut next_sequence = start;
        let mut last = None;

        for (i, &file_sequence) in files.iter().enumerate() {
            // Entirely covered by the snapshot
            if files.get(i + 1).is_some_and(|&next| next <= start) {
                continue;
            }

            let mut wal = WAL::open(layout, file_sequence, sync_mode)?;
            let replay = wal.read_entries()?;
            for entry in replay.entries {
                if entry.sequence < start {
                    continue;
                }
                next_sequence = next_sequence.max(entry.sequence + 1);
                apply_ops(&mut map, entry.ops);
            }
            if replay.torn {
                wal.truncate(replay.valid_len)?;
            }
            last = Some(wal);
        }

        let mut wal = match last {
            Some(wal) => wal,
            None => WAL::open(layout, start, sync_mode)?,
        };
        wal.sequence = next_sequence.max(wal.file_sequence);

        Ok((map, wal))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(Error::storage(format!(
                "store at {} has been destroyed",
                self.layout.base_dir.display()
            )));
        }
        Ok(())
    }
}

impl KvStore for DiskStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        self.ensure_open()?;
        if batch.is_empty() {
            return Ok(());
        }

        let mut wal = self.wal.lock();
        let entry = wal.append(batch.into_ops())?;
        {
            let mut map = self.map.write();
            apply_ops(&mut map, entry.ops);
        }

        // The batch is already durable; a failed checkpoint only delays compaction
        if wal.position >= self.compaction_threshold {
            if let Err(e) = self.checkpoint_locked(&mut wal) {
                warn!(error = %e, "checkpoint after write failed");
            }
        }
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8], visit: &mut dyn FnMut(&[u8]) -> ScanControl) -> Result<()> {
        let map = self.map.read();
        scan_map(&map, prefix, visit);
        Ok(())
    }

    fn destroy(&self) -> Result<()> {
        let _wal = self.wal.lock();
        self.destroyed.store(true, Ordering::Release);
        self.map.write().clear();
        fs::remove_dir_all(&self.layout.base_dir)?;

        info!(path = %self.layout.base_dir.display(), "destroyed disk store");
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.ensure_open()?;
        self.wal.lock().sync()
    }
}

impl Drop for DiskStore {
    fn drop(&mut self) {
        if self.destroyed.load(Ordering::Acquire) {
            return;
        }
        if let Err(e) = self.wal.get_mut().sync() {
            warn!(
                error = %e,
                path = %self.layout.base_dir.display(),
                "WAL sync on drop failed - data may not be durable"
            );
        }
    }
}
