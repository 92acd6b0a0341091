use std::time::Duration;

/// Give up on a connect attempt that has not completed after this long.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Silence from the server for this long triggers the liveness probe.
pub const LIVENESS_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum spacing between two liveness probes.
pub const PROBE_INTERVAL: Duration = Duration::from_secs(1);

/// Capacity of the inbound buffer.
pub const READ_BUFFER_SIZE: usize = 4096 * 5;

/// Most bytes pulled off the socket in one tick.
pub const READ_CHUNK_SIZE: usize = 4096 * 4;

/// Capacity of the outbound buffer (the login packet is the largest).
pub const WRITE_BUFFER_SIZE: usize = 131;

/// Maintenance work runs once every this many ticks.
pub const MAINTENANCE_TICKS: u32 = 3;

/// Number of probes the ping tracker remembers.
pub const PING_SLOTS: usize = 10;

/// Characters per chat line on the wire.
pub const CHAT_LINE_LEN: usize = 64;

/// Block ids usable without the CustomBlocks extension.
pub const BUILTIN_BLOCKS_CLASSIC: usize = 50;

/// Block ids usable with the CustomBlocks extension.
pub const BUILTIN_BLOCKS_CPE: usize = 66;
