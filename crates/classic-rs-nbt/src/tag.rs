//! NBT tag types.
//!
//! Tags only live for the duration of a streaming parse. Each one keeps a
//! borrowed link to its enclosing tag so callbacks can check where they are.

use std::fmt;
use std::io::Read;

use crate::error::NbtError;

/// Byte arrays shorter than this are stored inline.
pub const SMALL_SIZE: usize = 64;

/// The on-disk tag type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NbtKind {
    End = 0,
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    Float32 = 5,
    Float64 = 6,
    Int8Array = 7,
    String = 8,
    List = 9,
    Compound = 10,
    Int32Array = 11,
}

impl NbtKind {
    pub fn from_u8(v: u8) -> Result<Self, NbtError> {
        Ok(match v {
            0 => Self::End,
            1 => Self::Int8,
            2 => Self::Int16,
            3 => Self::Int32,
            4 => Self::Int64,
            5 => Self::Float32,
            6 => Self::Float64,
            7 => Self::Int8Array,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            11 => Self::Int32Array,
            other => return Err(NbtError::UnknownTagType(other)),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::End => "End",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Int8Array => "Int8Array",
            Self::String => "String",
            Self::List => "List",
            Self::Compound => "Compound",
            Self::Int32Array => "Int32Array",
        }
    }
}

impl fmt::Display for NbtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload of a byte array tag.
#[derive(Clone, PartialEq, Eq)]
pub enum NbtBytes {
    Small { data: [u8; SMALL_SIZE], len: u8 },
    Big(Vec<u8>),
}

impl NbtBytes {
    pub(crate) fn read(r: &mut impl Read, len: usize) -> Result<Self, NbtError> {
        if len < SMALL_SIZE {
            let mut data = [0u8; SMALL_SIZE];
            r.read_exact(&mut data[..len])?;
            Ok(Self::Small {
                data,
                len: len as u8,
            })
        } else {
            let mut data = vec![0u8; len];
            r.read_exact(&mut data)?;
            Ok(Self::Big(data))
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Small { data, len } => &data[..*len as usize],
            Self::Big(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the payload lives on the heap.
    pub fn is_big(&self) -> bool {
        matches!(self, Self::Big(_))
    }

    pub fn into_vec(self) -> Vec<u8> {
        match self {
            Self::Small { data, len } => data[..len as usize].to_vec(),
            Self::Big(v) => v,
        }
    }
}

impl fmt::Debug for NbtBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[B; {} elements]", self.len())
    }
}

/// The value carried by a tag. Lists and compounds carry nothing: their
/// children are delivered to the callback before the container itself.
#[derive(Debug, Clone, PartialEq)]
pub enum NbtValue {
    None,
    Int8(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bytes(NbtBytes),
    String(String),
}

/// A fully parsed tag, handed to the read callback.
#[derive(Debug)]
pub struct NbtTag<'p> {
    pub(crate) parent: Option<&'p NbtTag<'p>>,
    pub(crate) kind: NbtKind,
    pub(crate) name: String,
    pub(crate) value: NbtValue,
}

impl<'p> NbtTag<'p> {
    pub(crate) fn new(kind: NbtKind, name: String, parent: Option<&'p NbtTag<'p>>) -> Self {
        Self {
            parent,
            kind,
            name,
            value: NbtValue::None,
        }
    }

    pub fn kind(&self) -> NbtKind {
        self.kind
    }

    /// Tag name; empty for list elements.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive name comparison.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn parent(&self) -> Option<&NbtTag<'p>> {
        self.parent
    }

    /// Number of enclosing tags; the root is 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cur = self.parent;
        while let Some(p) = cur {
            depth += 1;
            cur = p.parent;
        }
        depth
    }

    /// Walks `n` levels up the parent chain.
    pub fn ancestor(&self, n: usize) -> Option<&NbtTag<'p>> {
        let mut cur = self.parent?;
        for _ in 1..n {
            cur = cur.parent?;
        }
        Some(cur)
    }

    pub fn value(&self) -> &NbtValue {
        &self.value
    }

    fn mismatch(&self, expected: NbtKind) -> NbtError {
        NbtError::TypeMismatch {
            expected: expected.name(),
            got: self.kind.name(),
        }
    }

    /// Int8 value, as the unsigned byte stored on disk.
    pub fn uint8(&self) -> Result<u8, NbtError> {
        match self.value {
            NbtValue::Int8(v) => Ok(v),
            _ => Err(self.mismatch(NbtKind::Int8)),
        }
    }

    pub fn int8(&self) -> Result<i8, NbtError> {
        self.uint8().map(|v| v as i8)
    }

    pub fn int16(&self) -> Result<i16, NbtError> {
        match self.value {
            NbtValue::Int16(v) => Ok(v),
            _ => Err(self.mismatch(NbtKind::Int16)),
        }
    }

    pub fn int32(&self) -> Result<i32, NbtError> {
        match self.value {
            NbtValue::Int32(v) => Ok(v),
            _ => Err(self.mismatch(NbtKind::Int32)),
        }
    }

    pub fn int64(&self) -> Result<i64, NbtError> {
        match self.value {
            NbtValue::Int64(v) => Ok(v),
            _ => Err(self.mismatch(NbtKind::Int64)),
        }
    }

    pub fn float32(&self) -> Result<f32, NbtError> {
        match self.value {
            NbtValue::Float32(v) => Ok(v),
            _ => Err(self.mismatch(NbtKind::Float32)),
        }
    }

    pub fn float64(&self) -> Result<f64, NbtError> {
        match self.value {
            NbtValue::Float64(v) => Ok(v),
            _ => Err(self.mismatch(NbtKind::Float64)),
        }
    }

    pub fn string(&self) -> Result<&str, NbtError> {
        match &self.value {
            NbtValue::String(s) => Ok(s),
            _ => Err(self.mismatch(NbtKind::String)),
        }
    }

    pub fn bytes(&self) -> Result<&[u8], NbtError> {
        match &self.value {
            NbtValue::Bytes(b) => Ok(b.as_slice()),
            _ => Err(self.mismatch(NbtKind::Int8Array)),
        }
    }

    pub fn byte_at(&self, index: usize) -> Result<u8, NbtError> {
        let bytes = self.bytes()?;
        bytes
            .get(index)
            .copied()
            .ok_or(NbtError::IndexOutOfBounds {
                index,
                len: bytes.len(),
            })
    }

    /// Takes ownership of a byte array payload, leaving the tag empty.
    pub fn take_bytes(&mut self) -> Result<Vec<u8>, NbtError> {
        match std::mem::replace(&mut self.value, NbtValue::None) {
            NbtValue::Bytes(b) => Ok(b.into_vec()),
            other => {
                self.value = other;
                Err(self.mismatch(NbtKind::Int8Array))
            }
        }
    }
}
