use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    Storage,
    Corruption,
    Configuration,
    BatchTooLarge,
    InvalidArgument,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn configuration(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Configuration, context.into())
    }

    pub fn batch_too_large(operation: &str, len: usize, max: usize) -> Self {
        Error::new(
            ErrorKind::BatchTooLarge,
            format!("{}: {} documents exceeds the limit of {}", operation, len, max),
        )
    }

    pub fn storage(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Storage, context.into())
    }

    pub fn corruption(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Corruption, context.into())
    }

    /// True for any failure raised by the key-value substrate
    pub fn is_storage(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Io | ErrorKind::Parse | ErrorKind::Storage | ErrorKind::Corruption
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Configuration,
            context: format!("invalid config: {}", err),
        }
    }
}

impl From<lz4_flex::block::DecompressError> for Error {
    fn from(err: lz4_flex::block::DecompressError) -> Self {
        Error {
            kind: ErrorKind::Corruption,
            context: format!("snapshot decompression failed: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
