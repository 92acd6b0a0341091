//! SetBlockClient (0x05) — Client → Server, SetBlock (0x06) — Server → Client.

use bytes::{Buf, BufMut};

use super::{id, ClassicPacket};
use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::BlockPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SetBlockMode {
    Delete = 0,
    Place = 1,
}

/// A block the local player placed or broke.
///
/// For deletes, `block` is the block the player is holding.
#[derive(Debug, Clone, Copy)]
pub struct SetBlockClient {
    pub pos: BlockPos,
    pub mode: SetBlockMode,
    pub block: u8,
}

impl ProtoEncode for SetBlockClient {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.pos.proto_encode(buf);
        buf.put_u8(self.mode as u8);
        buf.put_u8(self.block);
    }
}

impl ClassicPacket for SetBlockClient {
    const OPCODE: u8 = id::SET_BLOCK_CLIENT;
}

/// A server-side block change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetBlock {
    pub pos: BlockPos,
    pub block: u8,
}

impl ProtoDecode for SetBlock {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let pos = BlockPos::proto_decode(buf)?;
        ensure_remaining(buf, 1)?;
        Ok(Self {
            pos,
            block: buf.get_u8(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::encode_packet;
    use bytes::BytesMut;

    #[test]
    fn encode_place() {
        let pkt = SetBlockClient {
            pos: BlockPos::new(1, 2, 3),
            mode: SetBlockMode::Place,
            block: 4,
        };
        let mut buf = BytesMut::new();
        encode_packet(&pkt, &mut buf);
        assert_eq!(&buf[..], &[0x05, 0, 1, 0, 2, 0, 3, 1, 4]);
    }

    #[test]
    fn decode_set_block() {
        let raw: &[u8] = &[0, 10, 0, 20, 0, 30, 49];
        let pkt = SetBlock::proto_decode(&mut &raw[..]).unwrap();
        assert_eq!(pkt.pos, BlockPos::new(10, 20, 30));
        assert_eq!(pkt.block, 49);
    }
}
