pub mod checkpoint;
pub mod disk;
pub mod file_lock;
pub mod gateway;
pub mod keys;
pub mod kv;
pub mod layout;
pub mod memory;
pub mod wal;
