//! Protocol encoding/decoding traits and helpers.

use bytes::{Buf, BufMut};

use crate::cp437;
use crate::error::ProtoError;

/// Width in bytes of every string field on the classic wire.
pub const STRING_SIZE: usize = 64;

/// Encode a value onto a buffer.
pub trait ProtoEncode {
    fn proto_encode(&self, buf: &mut impl BufMut);
}

/// Decode a value from a buffer.
pub trait ProtoDecode: Sized {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError>;
}

/// Fail with [`ProtoError::BufferTooShort`] unless `needed` bytes remain.
pub fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), ProtoError> {
    if buf.remaining() < needed {
        return Err(ProtoError::BufferTooShort {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Write a classic string: CP437, space-padded to [`STRING_SIZE`] bytes.
///
/// Text longer than the field is cut off; callers that care split first.
pub fn write_string(buf: &mut impl BufMut, s: &str) {
    let mut encoded = cp437::encode(s);
    encoded.truncate(STRING_SIZE);
    buf.put_slice(&encoded);
    buf.put_bytes(b' ', STRING_SIZE - encoded.len());
}

/// Read a classic string, dropping the trailing space padding.
pub fn read_string(buf: &mut impl Buf) -> Result<String, ProtoError> {
    ensure_remaining(buf, STRING_SIZE)?;
    let mut raw = [0u8; STRING_SIZE];
    buf.copy_to_slice(&mut raw);
    let end = raw.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    Ok(cp437::decode(&raw[..end]))
}

/// Read a fixed-size byte field.
pub fn read_array<const N: usize>(buf: &mut impl Buf) -> Result<[u8; N], ProtoError> {
    ensure_remaining(buf, N)?;
    let mut out = [0u8; N];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn string_is_padded() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "Hello");
        assert_eq!(buf.len(), STRING_SIZE);
        assert_eq!(&buf[..5], b"Hello");
        assert!(buf[5..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn string_roundtrip_trims_padding() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "  lead kept");
        let result = read_string(&mut buf.freeze()).unwrap();
        assert_eq!(result, "  lead kept");
    }

    #[test]
    fn string_empty() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "");
        assert_eq!(read_string(&mut buf.freeze()).unwrap(), "");
    }

    #[test]
    fn string_cp437() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "¿ß日");
        assert_eq!(&buf[..3], &[0xA8, 0xE1, b'?']);
    }

    #[test]
    fn string_truncated_to_field() {
        let long = "x".repeat(80);
        let mut buf = BytesMut::new();
        write_string(&mut buf, &long);
        assert_eq!(buf.len(), STRING_SIZE);
    }

    #[test]
    fn string_buffer_too_short() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "Hello");
        let truncated = buf.freeze().slice(..10);
        assert!(matches!(
            read_string(&mut truncated.clone()),
            Err(ProtoError::BufferTooShort { needed: 64, remaining: 10 })
        ));
    }
}
