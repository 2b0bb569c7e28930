use std::fs::{File, OpenOptions};
use std::io::{Write, Read, Seek, SeekFrom};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::storage::kv::BatchOp;
use crate::storage::layout::StorageLayout;
use crate::core::error::{Error, ErrorKind, Result};

const FRAME_HEADER_LEN: u64 = 8;
const MAX_FRAME_LEN: usize = 256 * 1024 * 1024;

/// Write-ahead log: one frame per atomic batch
pub struct WAL {
    pub file: File,
    pub position: u64,
    pub sync_mode: SyncMode,
    pub sequence: u64,        // Sequence of the next entry
    pub file_sequence: u64,   // Sequence this file was opened at (names the file)
    unsynced: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    Immediate,  // fsync after every write
    Batch,      // fsync periodically
    None,       // Let OS handle it
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WALEntry {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub ops: Vec<BatchOp>,
}

/// Entries recovered from one log file
pub struct Replay {
    pub entries: Vec<WALEntry>,
    pub valid_len: u64,
    pub torn: bool,
}

impl WAL {
    pub fn open(storage: &StorageLayout, sequence: u64, sync_mode: SyncMode) -> Result<Self> {
        let path = storage.wal_path(sequence);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let position = file.metadata()?.len();

        Ok(WAL {
            file,
            position,
            sync_mode,
            sequence,
            file_sequence: sequence,
            unsynced: 0,
        })
    }

    /// Append one batch as a single checksummed frame: len | crc32 | bincode(entry)
    ///
    /// On a failed write or sync the file is cut back to its length before the
    /// append and the sequence is left unchanged, so no partial frame can sit in
    /// front of later batches.
    pub fn append(&mut self, ops: Vec<BatchOp>) -> Result<WALEntry> {
        let entry = WALEntry {
            sequence: self.sequence,
            timestamp: Utc::now(),
            ops,
        };

        let data = bincode::serialize(&entry)?;
        let len = data.len() as u32;
        let crc = crc32fast::hash(&data);

        let mut frame = Vec::with_capacity(data.len() + FRAME_HEADER_LEN as usize);
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.extend_from_slice(&data);

        // Bytes past the last acknowledged frame belong to an earlier failed append
        if self.file.metadata()?.len() != self.position {
            self.rollback()?;
        }

        let pending = self.unsynced + frame.len() as u64;
        let sync_now = match self.sync_mode {
            SyncMode::Immediate => true,
            SyncMode::Batch => pending >= 1024 * 1024,
            SyncMode::None => false,
        };

        let mut written = self.file.write_all(&frame);
        if written.is_ok() && sync_now {
            written = self.file.sync_all();
        }
        if let Err(e) = written {
            warn!(error = %e, sequence = self.sequence, "WAL append failed, rolling back");
            self.rollback()?;
            return Err(e.into());
        }

        self.sequence += 1;
        self.position += frame.len() as u64;
        self.unsynced = if sync_now { 0 } else { pending };

        Ok(entry)
    }

    /// Cut the file back to the end of the last acknowledged frame
    fn rollback(&mut self) -> Result<()> {
        self.file.set_len(self.position).map_err(|e| {
            Error::new(ErrorKind::Storage, format!("WAL rollback to {} failed: {}", self.position, e))
        })?;
        Ok(())
    }

    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        self.unsynced = 0;
        Ok(())
    }

    pub fn rotate(&mut self, storage: &StorageLayout) -> Result<()> {
        self.sync()?;

        let mut new_wal = WAL::open(storage, self.sequence, self.sync_mode)?;
        new_wal.sequence = self.sequence;
        *self = new_wal;

        Ok(())
    }

    /// Read every intact frame; stops at the first short or corrupt frame
    pub fn read_entries(&mut self) -> Result<Replay> {
        let mut entries = Vec::new();
        let mut valid_len = 0u64;

        self.file.seek(SeekFrom::Start(0))?;

        let torn = loop {
            let mut header = [0u8; FRAME_HEADER_LEN as usize];
            match self.file.read_exact(&mut header) {
                Ok(_) => {},
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break valid_len != self.file.metadata()?.len();
                },
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            if len > MAX_FRAME_LEN {
                break true;
            }

            let mut data = vec![0u8; len];
            if let Err(e) = self.file.read_exact(&mut data) {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    break true;
                }
                return Err(e.into());
            }

            if crc32fast::hash(&data) != crc {
                break true;
            }

            match bincode::deserialize::<WALEntry>(&data) {
                Ok(entry) => entries.push(entry),
                Err(_) => break true,
            }
            valid_len += FRAME_HEADER_LEN + len as u64;
        };

        self.position = self.file.seek(SeekFrom::End(0))?;

        Ok(Replay { entries, valid_len, torn })
    }

    /// Drop a torn tail so later appends start on a frame boundary
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        warn!(
            file_sequence = self.file_sequence,
            dropped_bytes = self.position.saturating_sub(len),
            "truncating torn WAL tail"
        );
        self.file.set_len(len)?;
        self.file.sync_all()?;
        self.position = len;
        Ok(())
    }

    /// Start sequences of all WAL files, ascending
    pub fn find_wal_files(storage: &StorageLayout) -> Result<Vec<u64>> {
        let mut sequences = Vec::new();
        let wal_dir = storage.wal_dir();

        if wal_dir.exists() {
            for entry in std::fs::read_dir(wal_dir)? {
                let path = entry?.path();

                if path.extension().and_then(|s| s.to_str()) != Some("log") {
                    continue;
                }
                let seq = path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| stem.strip_prefix("wal_"))
                    .and_then(|seq| seq.parse::<u64>().ok());
                if let Some(seq) = seq {
                    sequences.push(seq);
                }
            }
        }

        sequences.sort();
        Ok(sequences)
    }
}
