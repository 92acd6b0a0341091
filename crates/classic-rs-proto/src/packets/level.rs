//! Map transfer: LevelDataChunk (0x03) and LevelFinalise (0x04) — Server → Client.
//!
//! LevelInit (0x02) has no payload. The chunks concatenate into a gzip
//! stream holding a big-endian `u32` block count followed by the blocks.

use bytes::Buf;

use crate::codec::{ensure_remaining, read_array, ProtoDecode};
use crate::error::ProtoError;

/// Size of the data field of a map chunk.
pub const CHUNK_DATA_SIZE: usize = 1024;

#[derive(Debug, Clone)]
pub struct LevelDataChunk {
    /// Bytes of `data` that are in use.
    pub length: u16,
    pub data: [u8; CHUNK_DATA_SIZE],
    /// Server-side progress, 0..=100.
    pub percent: u8,
}

impl LevelDataChunk {
    pub fn payload(&self) -> &[u8] {
        &self.data[..(self.length as usize).min(CHUNK_DATA_SIZE)]
    }
}

impl ProtoDecode for LevelDataChunk {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 2)?;
        let length = buf.get_u16();
        let data = read_array::<CHUNK_DATA_SIZE>(buf)?;
        ensure_remaining(buf, 1)?;
        Ok(Self {
            length,
            data,
            percent: buf.get_u8(),
        })
    }
}

/// End of the map transfer, carrying the map dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelFinalise {
    pub width: u16,
    pub height: u16,
    pub length: u16,
}

impl ProtoDecode for LevelFinalise {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 6)?;
        Ok(Self {
            width: buf.get_u16(),
            height: buf.get_u16(),
            length: buf.get_u16(),
        })
    }
}
