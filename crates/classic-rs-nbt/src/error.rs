//! NBT and Java-serialization error types.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NbtError {
    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(io::Error),

    #[error("expected TAG_Compound (10) at root, got {got}")]
    ExpectedCompound { got: u8 },

    #[error("unknown tag type: {0}")]
    UnknownTagType(u8),

    #[error("TAG_Int_Array is not supported")]
    UnsupportedIntArray,

    #[error("string too long: {len} (limit {limit})")]
    StringTooLong { len: usize, limit: usize },

    #[error("nesting too deep (limit: {limit})")]
    NestingTooDeep { limit: usize },

    #[error("expected {expected} tag, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("index {index} out of bounds for byte array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("unexpected constant in {0}")]
    BadMagic(&'static str),

    #[error("unsupported type code {code:#04x} in {context}")]
    UnsupportedTypeCode { code: u8, context: &'static str },

    #[error("class descriptor has too many fields: {0}")]
    TooManyFields(usize),

    #[error("unsupported field type '{0}'")]
    UnsupportedFieldType(char),

    #[error("only byte array fields are supported")]
    OnlyByteArrays,
}

impl From<io::Error> for NbtError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            NbtError::UnexpectedEof
        } else {
            NbtError::Io(e)
        }
    }
}
