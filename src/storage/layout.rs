use std::path::PathBuf;
use std::fs;
use crate::core::error::Result;

/// Directory structure of a disk store
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,      // Root directory
    pub wal_dir: PathBuf,       // Write-ahead log location
    pub meta_dir: PathBuf,      // Snapshot location
}

impl StorageLayout {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        let wal_dir = base_dir.join("wal");
        let meta_dir = base_dir.join("meta");

        fs::create_dir_all(&wal_dir)?;
        fs::create_dir_all(&meta_dir)?;

        Ok(StorageLayout {
            base_dir,
            wal_dir,
            meta_dir,
        })
    }

    pub fn wal_path(&self, sequence: u64) -> PathBuf {
        self.wal_dir.join(format!("wal_{:08}.log", sequence))
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.meta_dir.join("snapshot.bin")
    }

    pub fn snapshot_tmp_path(&self) -> PathBuf {
        self.meta_dir.join("snapshot.bin.tmp")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.base_dir.join(".lock")
    }

    pub fn wal_dir(&self) -> &PathBuf {
        &self.wal_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_directories_and_names_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().join("db")).unwrap();

        assert!(layout.wal_dir.is_dir());
        assert!(layout.meta_dir.is_dir());
        assert_eq!(layout.wal_path(7).file_name().unwrap(), "wal_00000007.log");
        assert_eq!(layout.snapshot_path().file_name().unwrap(), "snapshot.bin");
    }
}
