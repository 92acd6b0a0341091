//! Base data types used throughout the classic protocol and map formats.

use std::fmt;
use std::ops::{Div, Sub};

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

// ---------------------------------------------------------------------------
// Vec3 (f32 x3)
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Integer block coordinates containing this point.
    pub fn floor(&self) -> (i32, i32, i32) {
        (
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Div<f32> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl fmt::Debug for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Fixed-point coordinates (1/32 block units, i16 big-endian)
// ---------------------------------------------------------------------------

/// Number of fixed-point units per block.
pub const FIXED_POINT_SCALE: f32 = 32.0;

/// A position in 1/32 block units, as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedPos {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl FixedPos {
    pub fn from_vec3(v: Vec3) -> Self {
        Self {
            x: (v.x * FIXED_POINT_SCALE) as i16,
            y: (v.y * FIXED_POINT_SCALE) as i16,
            z: (v.z * FIXED_POINT_SCALE) as i16,
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(
            self.x as f32 / FIXED_POINT_SCALE,
            self.y as f32 / FIXED_POINT_SCALE,
            self.z as f32 / FIXED_POINT_SCALE,
        )
    }
}

impl ProtoEncode for FixedPos {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i16(self.x);
        buf.put_i16(self.y);
        buf.put_i16(self.z);
    }
}

impl ProtoDecode for FixedPos {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 6)?;
        Ok(Self {
            x: buf.get_i16(),
            y: buf.get_i16(),
            z: buf.get_i16(),
        })
    }
}

// ---------------------------------------------------------------------------
// Block coordinates (i16 big-endian, whole blocks)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl BlockPos {
    pub fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

impl ProtoEncode for BlockPos {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i16(self.x);
        buf.put_i16(self.y);
        buf.put_i16(self.z);
    }
}

impl ProtoDecode for BlockPos {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 6)?;
        Ok(Self {
            x: buf.get_i16(),
            y: buf.get_i16(),
            z: buf.get_i16(),
        })
    }
}

// ---------------------------------------------------------------------------
// Packed angles
// ---------------------------------------------------------------------------

/// Converts a packed angle (`angle / 256` of a full turn) to degrees.
pub fn packed_to_degrees(packed: u8) -> f32 {
    packed as f32 * 360.0 / 256.0
}

/// Converts degrees to a packed angle, wrapping into `0..256`.
pub fn degrees_to_packed(degrees: f32) -> u8 {
    ((degrees * 256.0 / 360.0) as i32 & 0xFF) as u8
}
