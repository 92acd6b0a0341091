//! Classic protocol packet definitions.
//!
//! Every packet is `[opcode u8][fixed-size payload]`. [`ProtoEncode`] and
//! [`ProtoDecode`] impls cover the payload only; [`encode_packet`] prepends
//! the opcode for outbound packets.

pub mod ext;
pub mod handshake;
pub mod kick;
pub mod level;
pub mod login;
pub mod message;
pub mod player_click;
pub mod position;
pub mod set_block;
pub mod two_way_ping;

use bytes::BufMut;

use crate::codec::ProtoEncode;

pub use ext::{ExtEntry, ExtInfo, HackControl};
pub use handshake::{Handshake, SetPermission};
pub use kick::Kick;
pub use level::{LevelDataChunk, LevelFinalise};
pub use login::Login;
pub use message::{ChatMessage, MessageOut};
pub use player_click::{MouseAction, MouseButton, PlayerClick};
pub use position::{EntityTeleport, PositionUpdate};
pub use set_block::{SetBlock, SetBlockClient, SetBlockMode};
pub use two_way_ping::TwoWayPing;

/// A packet with a fixed opcode.
pub trait ClassicPacket: ProtoEncode {
    const OPCODE: u8;
}

/// Write `[opcode][payload]` for an outbound packet.
pub fn encode_packet<P: ClassicPacket>(packet: &P, buf: &mut impl BufMut) {
    buf.put_u8(P::OPCODE);
    packet.proto_encode(buf);
}

/// Classic opcodes.
pub mod id {
    pub const HANDSHAKE: u8 = 0x00;
    pub const PING: u8 = 0x01;
    pub const LEVEL_INIT: u8 = 0x02;
    pub const LEVEL_DATA_CHUNK: u8 = 0x03;
    pub const LEVEL_FINALISE: u8 = 0x04;
    pub const SET_BLOCK_CLIENT: u8 = 0x05;
    pub const SET_BLOCK: u8 = 0x06;
    pub const ADD_ENTITY: u8 = 0x07;
    /// Outbound position of the local player.
    pub const POSITION_UPDATE: u8 = 0x08;
    /// Inbound absolute position of an entity (0xFF is the local player).
    pub const ENTITY_TELEPORT: u8 = 0x08;
    pub const RELPOS_AND_ORIENTATION: u8 = 0x09;
    pub const RELPOS_UPDATE: u8 = 0x0A;
    pub const ORIENTATION_UPDATE: u8 = 0x0B;
    pub const REMOVE_ENTITY: u8 = 0x0C;
    pub const MESSAGE: u8 = 0x0D;
    pub const KICK: u8 = 0x0E;
    pub const SET_PERMISSION: u8 = 0x0F;
    pub const EXT_INFO: u8 = 0x10;
    pub const EXT_ENTRY: u8 = 0x11;
    pub const HACK_CONTROL: u8 = 0x20;
    pub const PLAYER_CLICK: u8 = 0x22;
    pub const TWO_WAY_PING: u8 = 0x2B;
}

/// Payload sizes of inbound packets, excluding the opcode byte.
pub mod size {
    pub const HANDSHAKE: usize = 130;
    pub const PING: usize = 0;
    pub const LEVEL_INIT: usize = 0;
    pub const LEVEL_DATA_CHUNK: usize = 1027;
    pub const LEVEL_FINALISE: usize = 6;
    pub const SET_BLOCK: usize = 7;
    pub const ADD_ENTITY: usize = 73;
    pub const ENTITY_TELEPORT: usize = 9;
    pub const RELPOS_AND_ORIENTATION: usize = 6;
    pub const RELPOS_UPDATE: usize = 4;
    pub const ORIENTATION_UPDATE: usize = 3;
    pub const REMOVE_ENTITY: usize = 1;
    pub const MESSAGE: usize = 65;
    pub const KICK: usize = 64;
    pub const SET_PERMISSION: usize = 1;
    pub const EXT_INFO: usize = 66;
    pub const EXT_ENTRY: usize = 68;
    pub const HACK_CONTROL: usize = 7;
    pub const TWO_WAY_PING: usize = 3;
}

/// Protocol version sent in the login packet.
pub const PROTOCOL_VERSION: u8 = 7;

/// Login "user type" byte announcing extension support.
pub const CPE_MAGIC: u8 = 0x42;
