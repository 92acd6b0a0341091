use thiserror::Error;

use classic_rs_proto::error::ProtoError;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),

    #[error("invalid opcode: 0x{0:02X}")]
    InvalidOpcode(u8),

    #[error("no handler for opcode 0x{0:02X}")]
    UnsupportedOpcode(u8),

    #[error("packet of {len} bytes does not fit the {capacity} byte write buffer")]
    PacketTooLarge { len: usize, capacity: usize },
}
