//! Protocol extension negotiation (both directions) and HackControl —
//! Server → Client.

use bytes::{Buf, BufMut};

use super::{id, ClassicPacket};
use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// ExtInfo (0x10): server software name and extension count.
#[derive(Debug, Clone)]
pub struct ExtInfo {
    pub app_name: String,
    pub extension_count: u16,
}

impl ExtInfo {
    /// Old D3 servers append a stray byte to HackControl packets.
    pub fn is_d3_server(&self) -> bool {
        self.app_name.starts_with("D3 server")
    }
}

impl ProtoDecode for ExtInfo {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let app_name = read_string(buf)?;
        ensure_remaining(buf, 2)?;
        Ok(Self {
            app_name,
            extension_count: buf.get_u16(),
        })
    }
}

impl ProtoEncode for ExtInfo {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.app_name);
        buf.put_u16(self.extension_count);
    }
}

impl ClassicPacket for ExtInfo {
    const OPCODE: u8 = id::EXT_INFO;
}

/// ExtEntry (0x11): one supported extension.
#[derive(Debug, Clone)]
pub struct ExtEntry {
    pub name: String,
    pub version: i32,
}

impl ProtoDecode for ExtEntry {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let name = read_string(buf)?;
        ensure_remaining(buf, 4)?;
        Ok(Self {
            name,
            version: buf.get_i32(),
        })
    }
}

impl ProtoEncode for ExtEntry {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.name);
        buf.put_i32(self.version);
    }
}

impl ClassicPacket for ExtEntry {
    const OPCODE: u8 = id::EXT_ENTRY;
}

/// HackControl (0x20): which movement hacks the player may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HackControl {
    pub flying: bool,
    pub noclip: bool,
    pub speeding: bool,
    pub respawning: bool,
    pub third_person: bool,
    /// Jump height in 1/32 blocks, or -1 for the default.
    pub jump_height: i16,
}

impl ProtoDecode for HackControl {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 7)?;
        Ok(Self {
            flying: buf.get_u8() != 0,
            noclip: buf.get_u8() != 0,
            speeding: buf.get_u8() != 0,
            respawning: buf.get_u8() != 0,
            third_person: buf.get_u8() != 0,
            jump_height: buf.get_i16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::encode_packet;
    use bytes::BytesMut;

    #[test]
    fn detects_d3() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "D3 server 1.0");
        buf.put_u16(4);
        let info = ExtInfo::proto_decode(&mut buf.freeze()).unwrap();
        assert!(info.is_d3_server());
        assert_eq!(info.extension_count, 4);
    }

    #[test]
    fn hack_control_default_jump() {
        let raw: &[u8] = &[1, 0, 1, 1, 0, 0xFF, 0xFF];
        let hc = HackControl::proto_decode(&mut &raw[..]).unwrap();
        assert!(hc.flying && !hc.noclip && hc.speeding);
        assert_eq!(hc.jump_height, -1);
    }

    #[test]
    fn client_entries_match_inbound_sizes() {
        let mut buf = BytesMut::new();
        encode_packet(
            &ExtInfo {
                app_name: "classic-rs".into(),
                extension_count: 2,
            },
            &mut buf,
        );
        assert_eq!(buf.len(), 1 + crate::packets::size::EXT_INFO);
        assert_eq!(&buf[buf.len() - 2..], &[0, 2]);

        let mut buf = BytesMut::new();
        encode_packet(
            &ExtEntry {
                name: "TwoWayPing".into(),
                version: 1,
            },
            &mut buf,
        );
        assert_eq!(buf.len(), 1 + crate::packets::size::EXT_ENTRY);
        assert_eq!(buf[0], 0x11);
        let entry = ExtEntry::proto_decode(&mut buf.split_off(1).freeze()).unwrap();
        assert_eq!(entry.name, "TwoWayPing");
        assert_eq!(entry.version, 1);
    }
}
