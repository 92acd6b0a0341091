//! Login (0x00) — Client → Server.

use bytes::BufMut;

use super::{id, ClassicPacket, CPE_MAGIC, PROTOCOL_VERSION};
use crate::codec::{write_string, ProtoEncode};

/// First packet the client sends after the TCP connection is up.
///
/// Wire format:
/// ```text
/// u8:        protocol version (7)
/// string64:  username
/// string64:  verification key (mppass)
/// u8:        0x42 if extensions are wanted, else 0
/// ```
#[derive(Debug, Clone)]
pub struct Login {
    pub username: String,
    pub mppass: String,
    pub use_cpe: bool,
}

impl ProtoEncode for Login {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(PROTOCOL_VERSION);
        write_string(buf, &self.username);
        write_string(buf, &self.mppass);
        buf.put_u8(if self.use_cpe { CPE_MAGIC } else { 0 });
    }
}

impl ClassicPacket for Login {
    const OPCODE: u8 = id::HANDSHAKE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::encode_packet;
    use bytes::BytesMut;

    #[test]
    fn login_is_131_bytes() {
        let pkt = Login {
            username: "Notch".into(),
            mppass: "secret".into(),
            use_cpe: true,
        };
        let mut buf = BytesMut::new();
        encode_packet(&pkt, &mut buf);
        assert_eq!(buf.len(), 131);
        assert_eq!(buf[0], 0x00);
        assert_eq!(buf[1], 7);
        assert_eq!(&buf[2..7], b"Notch");
        assert_eq!(&buf[66..72], b"secret");
        assert_eq!(buf[130], 0x42);
    }

    #[test]
    fn login_without_cpe() {
        let pkt = Login {
            username: "a".into(),
            mppass: String::new(),
            use_cpe: false,
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(buf[129], 0);
    }
}
