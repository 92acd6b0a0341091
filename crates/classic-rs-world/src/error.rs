//! Map format errors.

use classic_rs_nbt::NbtError;
use classic_rs_proto::error::ProtoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Proto(#[from] ProtoError),

    #[error("NBT error: {0}")]
    Nbt(#[from] NbtError),

    #[error("unexpected constant in {0}")]
    BadMagic(&'static str),

    #[error("invalid revision {got} (expected {expected})")]
    BadRevision { got: u8, expected: u8 },

    #[error("world dimensions {width}x{height}x{length} are out of range")]
    InvalidDimensions {
        width: i64,
        height: i64,
        length: i64,
    },

    #[error("block array holds {got} bytes, dimensions need {expected}")]
    BlockCountMismatch { expected: usize, got: usize },

    #[error("map UUID must be 16 bytes, got {0}")]
    BadUuid(usize),

    #[error("map has no block array")]
    MissingBlocks,

    #[error("unsupported map format: {0}")]
    UnsupportedFormat(String),
}
