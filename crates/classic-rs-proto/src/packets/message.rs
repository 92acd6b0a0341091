//! Message (0x0D) — Bidirectional.

use bytes::{Buf, BufMut};

use super::{id, ClassicPacket};
use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// Player id byte the client sends in place of its own id.
pub const SELF_ID: u8 = 0xFF;

/// A chat line sent by the client.
///
/// With the LongerMessages extension the first byte flags a partial
/// message (1 = more pieces follow). Otherwise it is always `0xFF`.
#[derive(Debug, Clone)]
pub struct MessageOut {
    pub partial: Option<bool>,
    pub text: String,
}

impl ProtoEncode for MessageOut {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        let flag = match self.partial {
            Some(p) => p as u8,
            None => SELF_ID,
        };
        buf.put_u8(flag);
        write_string(buf, &self.text);
    }
}

impl ClassicPacket for MessageOut {
    const OPCODE: u8 = id::MESSAGE;
}

/// A chat line received from the server.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Sender id, or the message type when extensions are active.
    pub kind: u8,
    pub text: String,
}

impl ProtoDecode for ChatMessage {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 1)?;
        let kind = buf.get_u8();
        let text = read_string(buf)?;
        Ok(Self { kind, text })
    }
}
