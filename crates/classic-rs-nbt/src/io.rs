//! Streaming big-endian NBT reader and writer.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use classic_rs_proto::cp437;
use tracing::trace;

use crate::error::NbtError;
use crate::tag::{NbtBytes, NbtKind, NbtTag, NbtValue};

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 512;

/// Characters kept from a string tag.
pub const MAX_STRING_CHARS: usize = 64;

/// Largest accepted encoded string length in bytes.
pub const MAX_STRING_BYTES: usize = MAX_STRING_CHARS * 4;

// -----------------------------------------------------------------------
// Reading
// -----------------------------------------------------------------------

/// Parses one NBT document whose root must be a compound.
///
/// `callback` runs once per tag in post-order, so a compound is reported
/// after all of its children. It returns whether it claimed the tag's byte
/// array (via [`NbtTag::take_bytes`]); unclaimed payloads are dropped as soon
/// as the callback returns.
pub fn read_nbt<R, F, E>(r: &mut R, mut callback: F) -> Result<(), E>
where
    R: Read,
    F: FnMut(&mut NbtTag<'_>) -> Result<bool, E>,
    E: From<NbtError>,
{
    let root = r.read_u8().map_err(NbtError::from)?;
    if root != NbtKind::Compound as u8 {
        return Err(NbtError::ExpectedCompound { got: root }.into());
    }
    let name = read_string(r)?;
    read_tag(r, NbtKind::Compound, name, None, 0, &mut callback)
}

fn read_tag<R, F, E>(
    r: &mut R,
    kind: NbtKind,
    name: String,
    parent: Option<&NbtTag<'_>>,
    depth: usize,
    callback: &mut F,
) -> Result<(), E>
where
    R: Read,
    F: FnMut(&mut NbtTag<'_>) -> Result<bool, E>,
    E: From<NbtError>,
{
    if kind == NbtKind::End {
        return Ok(());
    }
    if depth > MAX_DEPTH {
        return Err(NbtError::NestingTooDeep { limit: MAX_DEPTH }.into());
    }

    let mut tag = NbtTag::new(kind, name, parent);
    let value = match kind {
        NbtKind::Int8 => NbtValue::Int8(r.read_u8().map_err(NbtError::from)?),
        NbtKind::Int16 => NbtValue::Int16(r.read_i16::<BigEndian>().map_err(NbtError::from)?),
        NbtKind::Int32 => NbtValue::Int32(r.read_i32::<BigEndian>().map_err(NbtError::from)?),
        NbtKind::Int64 => NbtValue::Int64(r.read_i64::<BigEndian>().map_err(NbtError::from)?),
        NbtKind::Float32 => {
            NbtValue::Float32(r.read_f32::<BigEndian>().map_err(NbtError::from)?)
        }
        NbtKind::Float64 => {
            NbtValue::Float64(r.read_f64::<BigEndian>().map_err(NbtError::from)?)
        }
        NbtKind::Int8Array => {
            let len = r.read_u32::<BigEndian>().map_err(NbtError::from)? as usize;
            NbtValue::Bytes(NbtBytes::read(r, len)?)
        }
        NbtKind::String => NbtValue::String(read_string(r)?),
        NbtKind::List => {
            let child = NbtKind::from_u8(r.read_u8().map_err(NbtError::from)?)?;
            let count = r.read_u32::<BigEndian>().map_err(NbtError::from)?;
            for _ in 0..count {
                read_tag(r, child, String::new(), Some(&tag), depth + 1, callback)?;
            }
            NbtValue::None
        }
        NbtKind::Compound => {
            loop {
                let child = NbtKind::from_u8(r.read_u8().map_err(NbtError::from)?)?;
                if child == NbtKind::End {
                    break;
                }
                let child_name = read_string(r)?;
                read_tag(r, child, child_name, Some(&tag), depth + 1, callback)?;
            }
            NbtValue::None
        }
        NbtKind::Int32Array => return Err(NbtError::UnsupportedIntArray.into()),
        NbtKind::End => NbtValue::None,
    };
    tag.value = value;

    let claimed = callback(&mut tag)?;
    if !claimed {
        if let NbtValue::Bytes(b) = &tag.value {
            if b.is_big() {
                trace!(name = tag.name(), len = b.len(), "Dropping unclaimed byte array");
            }
        }
    }
    Ok(())
}

/// Reads a length-prefixed UTF-8 string, keeping at most
/// [`MAX_STRING_CHARS`] characters mapped onto code page 437.
pub fn read_string(r: &mut impl Read) -> Result<String, NbtError> {
    let len = r.read_u16::<BigEndian>()? as usize;
    if len > MAX_STRING_BYTES {
        return Err(NbtError::StringTooLong {
            len,
            limit: MAX_STRING_BYTES,
        });
    }
    let mut raw = [0u8; MAX_STRING_BYTES];
    r.read_exact(&mut raw[..len])?;
    Ok(String::from_utf8_lossy(&raw[..len])
        .chars()
        .take(MAX_STRING_CHARS)
        .map(cp437::normalize)
        .collect())
}

// -----------------------------------------------------------------------
// Writing
// -----------------------------------------------------------------------

/// Writes NBT tags sequentially. Callers open and close compounds
/// themselves, so output order is exactly the call order.
pub struct NbtWriter<W: Write> {
    inner: W,
}

impl<W: Write> NbtWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Type byte plus name.
    pub fn tag(&mut self, kind: NbtKind, name: &str) -> Result<(), NbtError> {
        self.inner.write_u8(kind as u8)?;
        self.string_payload(name)
    }

    pub fn begin_compound(&mut self, name: &str) -> Result<(), NbtError> {
        self.tag(NbtKind::Compound, name)
    }

    pub fn end_compound(&mut self) -> Result<(), NbtError> {
        self.inner.write_u8(NbtKind::End as u8)?;
        Ok(())
    }

    /// List header; the caller writes `count` unnamed payloads after it.
    pub fn begin_list(&mut self, name: &str, child: NbtKind, count: u32) -> Result<(), NbtError> {
        self.tag(NbtKind::List, name)?;
        self.inner.write_u8(child as u8)?;
        self.inner.write_u32::<BigEndian>(count)?;
        Ok(())
    }

    pub fn write_u8(&mut self, name: &str, v: u8) -> Result<(), NbtError> {
        self.tag(NbtKind::Int8, name)?;
        self.inner.write_u8(v)?;
        Ok(())
    }

    pub fn write_i16(&mut self, name: &str, v: i16) -> Result<(), NbtError> {
        self.tag(NbtKind::Int16, name)?;
        self.inner.write_i16::<BigEndian>(v)?;
        Ok(())
    }

    pub fn write_i32(&mut self, name: &str, v: i32) -> Result<(), NbtError> {
        self.tag(NbtKind::Int32, name)?;
        self.inner.write_i32::<BigEndian>(v)?;
        Ok(())
    }

    pub fn write_f32(&mut self, name: &str, v: f32) -> Result<(), NbtError> {
        self.tag(NbtKind::Float32, name)?;
        self.inner.write_f32::<BigEndian>(v)?;
        Ok(())
    }

    pub fn write_string(&mut self, name: &str, v: &str) -> Result<(), NbtError> {
        self.tag(NbtKind::String, name)?;
        self.string_payload(v)
    }

    pub fn write_bytes(&mut self, name: &str, v: &[u8]) -> Result<(), NbtError> {
        self.tag(NbtKind::Int8Array, name)?;
        self.inner.write_u32::<BigEndian>(v.len() as u32)?;
        self.inner.write_all(v)?;
        Ok(())
    }

    fn string_payload(&mut self, s: &str) -> Result<(), NbtError> {
        let chars = s.chars().count();
        if chars > MAX_STRING_CHARS {
            return Err(NbtError::StringTooLong {
                len: chars,
                limit: MAX_STRING_CHARS,
            });
        }
        let normalized: String = s.chars().map(cp437::normalize).collect();
        self.inner.write_u16::<BigEndian>(normalized.len() as u16)?;
        self.inner.write_all(normalized.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[derive(Debug, PartialEq)]
    struct Seen {
        name: String,
        kind: NbtKind,
        depth: usize,
    }

    fn collect(data: &[u8]) -> Result<Vec<Seen>, NbtError> {
        let mut seen = Vec::new();
        read_nbt(&mut Cursor::new(data), |tag: &mut NbtTag<'_>| {
            seen.push(Seen {
                name: tag.name().to_string(),
                kind: tag.kind(),
                depth: tag.depth(),
            });
            Ok::<bool, NbtError>(false)
        })?;
        Ok(seen)
    }

    fn sample() -> Vec<u8> {
        let mut w = NbtWriter::new(Vec::new());
        w.begin_compound("Root").unwrap();
        w.write_i16("X", 16).unwrap();
        w.begin_compound("Spawn").unwrap();
        w.write_u8("H", 200).unwrap();
        w.end_compound().unwrap();
        w.begin_list("Items", NbtKind::Int8, 2).unwrap();
        w.inner.write_u8(1).unwrap();
        w.inner.write_u8(2).unwrap();
        w.write_string("Name", "hello").unwrap();
        w.end_compound().unwrap();
        w.into_inner()
    }

    #[test]
    fn post_order_with_depth() {
        let seen = collect(&sample()).unwrap();
        let order: Vec<(&str, usize)> = seen.iter().map(|s| (s.name.as_str(), s.depth)).collect();
        assert_eq!(
            order,
            vec![
                ("X", 1),
                ("H", 2),
                ("Spawn", 1),
                ("", 2),
                ("", 2),
                ("Items", 1),
                ("Name", 1),
                ("Root", 0),
            ]
        );
        assert_eq!(seen[7].kind, NbtKind::Compound);
    }

    #[test]
    fn values_decode() {
        let data = sample();
        let mut h = None;
        let mut name = None;
        read_nbt(&mut Cursor::new(&data), |tag: &mut NbtTag<'_>| {
            if tag.is("h") {
                h = Some(tag.uint8()?);
            }
            if tag.is("name") {
                name = Some(tag.string()?.to_string());
            }
            Ok::<bool, NbtError>(false)
        })
        .unwrap();
        assert_eq!(h, Some(200));
        assert_eq!(name.as_deref(), Some("hello"));
    }

    #[test]
    fn root_must_be_compound() {
        let data = [NbtKind::List as u8, 0, 0, 1, 0, 0, 0, 0];
        assert!(matches!(
            collect(&data),
            Err(NbtError::ExpectedCompound { got: 9 })
        ));
    }

    #[test]
    fn unterminated_compound_is_error() {
        let mut w = NbtWriter::new(Vec::new());
        w.begin_compound("Root").unwrap();
        w.write_i16("X", 1).unwrap();
        let data = w.into_inner();
        assert!(matches!(collect(&data), Err(NbtError::UnexpectedEof)));
    }

    #[test]
    fn int32_array_rejected() {
        let mut w = NbtWriter::new(Vec::new());
        w.begin_compound("").unwrap();
        w.tag(NbtKind::Int32Array, "Ints").unwrap();
        let mut data = w.into_inner();
        data.extend_from_slice(&[0, 0, 0, 0, 0]);
        assert!(matches!(collect(&data), Err(NbtError::UnsupportedIntArray)));
    }

    #[test]
    fn unknown_type_rejected() {
        let data = [10, 0, 0, 42, 0, 0];
        assert!(matches!(collect(&data), Err(NbtError::UnknownTagType(42))));
    }

    #[test]
    fn string_limits() {
        let mut data = vec![10, 0, 0, 8];
        data.extend_from_slice(&[0, 1, b'S']);
        data.extend_from_slice(&300u16.to_be_bytes());
        data.extend(std::iter::repeat(b'a').take(300));
        data.push(0);
        assert!(matches!(
            collect(&data),
            Err(NbtError::StringTooLong { len: 300, .. })
        ));

        let long = "b".repeat(200);
        let mut raw = Vec::new();
        raw.extend_from_slice(&200u16.to_be_bytes());
        raw.extend_from_slice(long.as_bytes());
        let s = read_string(&mut Cursor::new(raw)).unwrap();
        assert_eq!(s.len(), MAX_STRING_CHARS);
    }

    #[test]
    fn writer_rejects_long_strings() {
        let mut w = NbtWriter::new(Vec::new());
        assert!(matches!(
            w.write_string("S", &"x".repeat(65)),
            Err(NbtError::StringTooLong { len: 65, limit: 64 })
        ));
    }

    #[test]
    fn strings_map_to_cp437() {
        let mut raw = Vec::new();
        let text = "é日";
        raw.extend_from_slice(&(text.len() as u16).to_be_bytes());
        raw.extend_from_slice(text.as_bytes());
        assert_eq!(read_string(&mut Cursor::new(raw)).unwrap(), "é?");
    }

    #[test]
    fn claimed_bytes_are_moved_out() {
        let mut w = NbtWriter::new(Vec::new());
        w.begin_compound("").unwrap();
        w.write_bytes("BlockArray", &[5u8; 100]).unwrap();
        w.end_compound().unwrap();
        let data = w.into_inner();

        let mut blocks = None;
        read_nbt(&mut Cursor::new(&data), |tag: &mut NbtTag<'_>| {
            if tag.is("BlockArray") {
                blocks = Some(tag.take_bytes()?);
                return Ok(true);
            }
            Ok::<bool, NbtError>(false)
        })
        .unwrap();
        assert_eq!(blocks, Some(vec![5u8; 100]));
    }

    #[test]
    fn callback_error_aborts() {
        let data = sample();
        let mut calls = 0;
        let result = read_nbt(&mut Cursor::new(&data), |tag: &mut NbtTag<'_>| {
            calls += 1;
            tag.int32()?;
            Ok::<bool, NbtError>(false)
        });
        assert!(matches!(result, Err(NbtError::TypeMismatch { .. })));
        assert_eq!(calls, 1);
    }
}
