//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("invalid gzip header: {0}")]
    InvalidGzipHeader(&'static str),

    #[error("unsupported gzip compression method: {0}")]
    UnsupportedGzipMethod(u8),

    #[error("string too long: {len} characters (limit {limit})")]
    StringTooLong { len: usize, limit: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
