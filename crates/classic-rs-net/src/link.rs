//! The outbound half of a multiplayer connection.
//!
//! Packet handlers get a `&mut Link` so they can reply to the server or end
//! the session from inside the dispatch loop.

use std::io;
use std::time::Instant;

use bytes::BytesMut;
use classic_rs_proto::packets::{encode_packet, ClassicPacket};
use tracing::{info, warn};

use crate::constants::WRITE_BUFFER_SIZE;
use crate::error::NetError;
use crate::events::{ClientEvent, EventSender};
use crate::socket::Socket;

/// Lifecycle of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// The connect attempt failed. `code` is the OS error, if there was one.
    Failed { code: Option<i32> },
}

impl ConnectionState {
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Disconnected | Self::Failed { .. })
    }
}

pub struct Link {
    pub(crate) socket: Option<Box<dyn Socket>>,
    pub(crate) state: ConnectionState,
    pub(crate) last_packet: Option<Instant>,
    write_buf: BytesMut,
    write_failed: bool,
    events: EventSender,
    d3_fix: bool,
    long_messages: bool,
}

impl Link {
    pub fn new(events: EventSender) -> Self {
        Self {
            socket: None,
            state: ConnectionState::Disconnected,
            last_packet: None,
            write_buf: BytesMut::with_capacity(WRITE_BUFFER_SIZE),
            write_failed: false,
            events,
            d3_fix: false,
            long_messages: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Set once a write failed. The session stays up so the server's last
    /// words (a kick reason, usually) can still be read.
    pub fn write_failed(&self) -> bool {
        self.write_failed
    }

    pub fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }

    /// Skip the stray byte D3 servers append to HackControl.
    pub fn set_d3_fix(&mut self, enabled: bool) {
        self.d3_fix = enabled;
    }

    pub fn d3_fix(&self) -> bool {
        self.d3_fix
    }

    /// Chat is sent with a "more follows" flag instead of the player id.
    pub fn set_long_messages(&mut self, enabled: bool) {
        self.long_messages = enabled;
    }

    pub fn long_messages(&self) -> bool {
        self.long_messages
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    /// Append a framed packet to the write buffer. A full buffer is flushed
    /// first; a packet larger than the buffer is rejected.
    pub fn queue<P: ClassicPacket>(&mut self, packet: &P) -> Result<(), NetError> {
        let mut frame = BytesMut::new();
        encode_packet(packet, &mut frame);
        if frame.len() > WRITE_BUFFER_SIZE {
            return Err(NetError::PacketTooLarge {
                len: frame.len(),
                capacity: WRITE_BUFFER_SIZE,
            });
        }
        if self.write_buf.len() + frame.len() > WRITE_BUFFER_SIZE {
            self.flush();
        }
        self.write_buf.extend_from_slice(&frame);
        Ok(())
    }

    /// Queue a packet and flush immediately.
    pub fn send<P: ClassicPacket>(&mut self, packet: &P) -> Result<(), NetError> {
        self.queue(packet)?;
        self.flush();
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        !self.write_buf.is_empty()
    }

    /// Write out the buffer. Failures only set [`Link::write_failed`].
    pub fn flush(&mut self) {
        if self.state.is_closed() {
            self.write_buf.clear();
            return;
        }
        if let Some(socket) = self.socket.as_mut() {
            let mut written = 0;
            while written < self.write_buf.len() {
                match socket.write(&self.write_buf[written..]) {
                    Ok(0) => {
                        self.write_failed = true;
                        break;
                    }
                    Ok(n) => written += n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        warn!("Failed to write {} bytes: {e}", self.write_buf.len());
                        self.write_failed = true;
                        break;
                    }
                }
            }
        }
        self.write_buf.clear();
    }

    pub(crate) fn clear_write(&mut self) {
        self.write_buf.clear();
        self.write_failed = false;
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// End the session. Calls after the first are ignored.
    pub fn disconnect(&mut self, title: impl Into<String>, reason: impl Into<String>) {
        self.close(ConnectionState::Disconnected, title.into(), reason.into());
    }

    pub(crate) fn close(&mut self, state: ConnectionState, title: String, reason: String) {
        if self.state.is_closed() {
            return;
        }
        info!("Disconnected: {title} ({reason})");
        self.state = state;
        self.free_socket();
        self.emit(ClientEvent::Disconnected { title, reason });
    }

    /// Drop the socket and go back to disconnected without an event.
    pub(crate) fn free(&mut self) {
        self.free_socket();
        self.state = ConnectionState::Disconnected;
        self.last_packet = None;
    }

    pub(crate) fn free_socket(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            socket.shutdown();
        }
    }
}
