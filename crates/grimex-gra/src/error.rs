use thiserror::Error;

/// Errors that stop an archive from being decoded at all.
#[derive(Error, Debug)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Not a GRA2 container, or a structurally impossible header/metadata.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("archive is truncated while reading the {what}")]
    TruncatedArchive { what: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single directory entry could not be extracted.
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("payload is truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },

    #[error("could not read payload: {0}")]
    Read(std::io::Error),

    #[error("decompression failed: {0}")]
    Decompress(std::io::Error),

    #[error("could not write output file: {0}")]
    Write(std::io::Error),
}
