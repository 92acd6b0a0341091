//! PositionUpdate (0x08) — Client → Server, EntityTeleport (0x08) —
//! Server → Client.

use bytes::{Buf, BufMut};

use super::message::SELF_ID;
use super::{id, ClassicPacket};
use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{degrees_to_packed, FixedPos, Vec3};

/// The local player's position and orientation.
#[derive(Debug, Clone, Copy)]
pub struct PositionUpdate {
    pub pos: Vec3,
    /// Degrees.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
}

impl ProtoEncode for PositionUpdate {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(SELF_ID);
        FixedPos::from_vec3(self.pos).proto_encode(buf);
        buf.put_u8(degrees_to_packed(self.yaw));
        buf.put_u8(degrees_to_packed(self.pitch));
    }
}

impl ClassicPacket for PositionUpdate {
    const OPCODE: u8 = id::POSITION_UPDATE;
}

/// Absolute position of an entity. Id `0xFF` moves the local player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityTeleport {
    pub entity_id: u8,
    pub pos: Vec3,
    /// Packed yaw.
    pub yaw: u8,
    /// Packed pitch.
    pub pitch: u8,
}

impl EntityTeleport {
    pub fn is_self(&self) -> bool {
        self.entity_id == SELF_ID
    }
}

impl ProtoDecode for EntityTeleport {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 1)?;
        let entity_id = buf.get_u8();
        let pos = FixedPos::proto_decode(buf)?.to_vec3();
        ensure_remaining(buf, 2)?;
        Ok(Self {
            entity_id,
            pos,
            yaw: buf.get_u8(),
            pitch: buf.get_u8(),
        })
    }
}
