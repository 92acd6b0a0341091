//! TwoWayPing (0x2B) — Bidirectional.

use bytes::{Buf, BufMut};

use super::{id, ClassicPacket};
use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// A latency probe. `server_to_client` marks who started the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoWayPing {
    pub server_to_client: bool,
    pub data: u16,
}

impl ProtoEncode for TwoWayPing {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.server_to_client as u8);
        buf.put_u16(self.data);
    }
}

impl ProtoDecode for TwoWayPing {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 3)?;
        Ok(Self {
            server_to_client: buf.get_u8() != 0,
            data: buf.get_u16(),
        })
    }
}

impl ClassicPacket for TwoWayPing {
    const OPCODE: u8 = id::TWO_WAY_PING;
}
