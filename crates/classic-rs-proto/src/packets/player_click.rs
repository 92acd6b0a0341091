//! PlayerClick (0x22) — Client → Server.

use bytes::BufMut;

use super::{id, ClassicPacket};
use crate::codec::ProtoEncode;
use crate::types::BlockPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MouseButton {
    Left = 0,
    Right = 1,
    Middle = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MouseAction {
    Pressed = 0,
    Released = 1,
}

/// A mouse click with what the player is looking at.
#[derive(Debug, Clone, Copy)]
pub struct PlayerClick {
    pub button: MouseButton,
    pub action: MouseAction,
    /// Degrees.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    /// Targeted entity id, or 255 for none.
    pub target_entity: u8,
    pub target_block: BlockPos,
    /// Face of the targeted block, or 255 for none.
    pub target_face: u8,
}

impl ProtoEncode for PlayerClick {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.button as u8);
        buf.put_u8(self.action as u8);
        buf.put_i16((self.yaw / 360.0 * 65536.0) as i32 as i16);
        buf.put_i16((self.pitch / 360.0 * 65536.0) as i32 as i16);
        buf.put_u8(self.target_entity);
        self.target_block.proto_encode(buf);
        buf.put_u8(self.target_face);
    }
}

impl ClassicPacket for PlayerClick {
    const OPCODE: u8 = id::PLAYER_CLICK;
}
