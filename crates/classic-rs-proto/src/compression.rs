//! Gzip framing and raw-deflate adapters for map files and map downloads.
//!
//! The gzip header is consumed by [`GzipHeader`], a small state machine that
//! can be resumed when the underlying reader has no more bytes yet. Once it
//! reports done, the rest of the stream is a raw deflate body handed to
//! [`inflate`].

use std::io::{self, Read, Write};

use byteorder::ReadBytesExt;
use flate2::read::DeflateDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::ProtoError;

const FLAG_HEADER_CRC: u8 = 0x02;
const FLAG_EXTRA: u8 = 0x04;
const FLAG_FILENAME: u8 = 0x08;
const FLAG_COMMENT: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GzipState {
    Magic1,
    Magic2,
    Method,
    Flags,
    Time { left: u8 },
    ExtraFlags,
    Os,
    ExtraLenLo,
    ExtraLenHi { lo: u8 },
    Extra { left: u16 },
    Filename,
    Comment,
    HeaderCrc { left: u8 },
    Done,
}

/// Incremental gzip member header reader.
#[derive(Debug, Clone)]
pub struct GzipHeader {
    state: GzipState,
    flags: u8,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl GzipHeader {
    pub fn new() -> Self {
        Self {
            state: GzipState::Magic1,
            flags: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == GzipState::Done
    }

    /// Consumes header bytes until the header is complete or the source would block.
    ///
    /// Returns `Ok(())` without being done if the source reported `WouldBlock`.
    pub fn read(&mut self, src: &mut impl Read) -> Result<(), ProtoError> {
        while !self.is_done() {
            match self.step(src) {
                Ok(()) => {}
                Err(ProtoError::Io(e)) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn step(&mut self, src: &mut impl Read) -> Result<(), ProtoError> {
        self.state = match self.state {
            GzipState::Magic1 => {
                if src.read_u8()? != 0x1F {
                    return Err(ProtoError::InvalidGzipHeader("bad magic byte 1"));
                }
                GzipState::Magic2
            }
            GzipState::Magic2 => {
                if src.read_u8()? != 0x8B {
                    return Err(ProtoError::InvalidGzipHeader("bad magic byte 2"));
                }
                GzipState::Method
            }
            GzipState::Method => match src.read_u8()? {
                8 => GzipState::Flags,
                other => return Err(ProtoError::UnsupportedGzipMethod(other)),
            },
            GzipState::Flags => {
                self.flags = src.read_u8()?;
                GzipState::Time { left: 4 }
            }
            GzipState::Time { left } => {
                src.read_u8()?;
                if left > 1 {
                    GzipState::Time { left: left - 1 }
                } else {
                    GzipState::ExtraFlags
                }
            }
            GzipState::ExtraFlags => {
                src.read_u8()?;
                GzipState::Os
            }
            GzipState::Os => {
                src.read_u8()?;
                self.after_fixed()
            }
            GzipState::ExtraLenLo => GzipState::ExtraLenHi { lo: src.read_u8()? },
            GzipState::ExtraLenHi { lo } => {
                let len = u16::from_le_bytes([lo, src.read_u8()?]);
                if len == 0 {
                    self.after_extra()
                } else {
                    GzipState::Extra { left: len }
                }
            }
            GzipState::Extra { left } => {
                src.read_u8()?;
                if left > 1 {
                    GzipState::Extra { left: left - 1 }
                } else {
                    self.after_extra()
                }
            }
            GzipState::Filename => {
                if src.read_u8()? == 0 {
                    self.after_filename()
                } else {
                    GzipState::Filename
                }
            }
            GzipState::Comment => {
                if src.read_u8()? == 0 {
                    self.after_comment()
                } else {
                    GzipState::Comment
                }
            }
            GzipState::HeaderCrc { left } => {
                src.read_u8()?;
                if left > 1 {
                    GzipState::HeaderCrc { left: left - 1 }
                } else {
                    GzipState::Done
                }
            }
            GzipState::Done => GzipState::Done,
        };
        Ok(())
    }

    fn after_fixed(&self) -> GzipState {
        if self.flags & FLAG_EXTRA != 0 {
            GzipState::ExtraLenLo
        } else {
            self.after_extra()
        }
    }

    fn after_extra(&self) -> GzipState {
        if self.flags & FLAG_FILENAME != 0 {
            GzipState::Filename
        } else {
            self.after_filename()
        }
    }

    fn after_filename(&self) -> GzipState {
        if self.flags & FLAG_COMMENT != 0 {
            GzipState::Comment
        } else {
            self.after_comment()
        }
    }

    fn after_comment(&self) -> GzipState {
        if self.flags & FLAG_HEADER_CRC != 0 {
            GzipState::HeaderCrc { left: 2 }
        } else {
            GzipState::Done
        }
    }
}

/// Reads a complete gzip header from a blocking source.
pub fn read_gzip_header(src: &mut impl Read) -> Result<(), ProtoError> {
    let mut header = GzipHeader::new();
    while !header.is_done() {
        header.read(src)?;
    }
    Ok(())
}

/// Wraps a raw deflate body in a decompressing reader.
pub fn inflate<R: Read>(src: R) -> DeflateDecoder<R> {
    DeflateDecoder::new(src)
}

/// Consumes the gzip header of `src` and returns a reader over the inflated body.
///
/// The gzip trailer (CRC32 + size) is left unread.
pub fn gzip_reader<R: Read>(mut src: R) -> Result<DeflateDecoder<R>, ProtoError> {
    read_gzip_header(&mut src)?;
    Ok(inflate(src))
}

/// Wraps a sink in a gzip compressor. Call `finish()` to write the trailer.
pub fn gzip_writer<W: Write>(dst: W) -> GzEncoder<W> {
    GzEncoder::new(dst, Compression::default())
}

/// Reads until `buf` is full, reporting the fraction read after each chunk.
pub fn read_with_progress(
    src: &mut impl Read,
    buf: &mut [u8],
    chunk: usize,
    mut progress: impl FnMut(f32),
) -> Result<(), ProtoError> {
    let total = buf.len();
    let mut offset = 0;
    while offset < total {
        let end = (offset + chunk.max(1)).min(total);
        src.read_exact(&mut buf[offset..end])?;
        offset = end;
        progress(offset as f32 / total as f32);
    }
    Ok(())
}
