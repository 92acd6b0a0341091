//! Handshake (0x00) and SetPermission (0x0F) — Server → Client.

use bytes::Buf;

use crate::codec::{ensure_remaining, read_string, ProtoDecode};
use crate::error::ProtoError;

/// User type byte of an operator.
pub const USER_TYPE_OP: u8 = 0x64;

/// Server identification, sent in reply to the login.
#[derive(Debug, Clone)]
pub struct Handshake {
    pub protocol_version: u8,
    pub server_name: String,
    pub motd: String,
    pub user_type: u8,
}

impl ProtoDecode for Handshake {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 1)?;
        let protocol_version = buf.get_u8();
        let server_name = read_string(buf)?;
        let motd = read_string(buf)?;
        ensure_remaining(buf, 1)?;
        Ok(Self {
            protocol_version,
            server_name,
            motd,
            user_type: buf.get_u8(),
        })
    }
}

impl Handshake {
    pub fn is_op(&self) -> bool {
        self.user_type == USER_TYPE_OP
    }
}

/// Change of the player's user type after login.
#[derive(Debug, Clone, Copy)]
pub struct SetPermission {
    pub user_type: u8,
}

impl ProtoDecode for SetPermission {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 1)?;
        Ok(Self {
            user_type: buf.get_u8(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::write_string;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn decode_handshake() {
        let mut buf = BytesMut::new();
        buf.put_u8(7);
        write_string(&mut buf, "My Server");
        write_string(&mut buf, "Welcome");
        buf.put_u8(USER_TYPE_OP);
        assert_eq!(buf.len(), crate::packets::size::HANDSHAKE);
        let hs = Handshake::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(hs.protocol_version, 7);
        assert_eq!(hs.server_name, "My Server");
        assert_eq!(hs.motd, "Welcome");
        assert!(hs.is_op());
    }
}
