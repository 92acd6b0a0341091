//! Kick (0x0E) — Server → Client.

use bytes::Buf;

use crate::codec::{read_string, ProtoDecode};
use crate::error::ProtoError;

/// Sent by the server right before it closes the connection.
#[derive(Debug, Clone)]
pub struct Kick {
    pub reason: String,
}

impl ProtoDecode for Kick {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            reason: read_string(buf)?,
        })
    }
}
