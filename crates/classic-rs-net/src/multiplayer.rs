//! Multiplayer connection: connect polling, the read/dispatch loop and
//! outbound classic packets.

use std::io;
use std::time::Instant;

use bytes::{Buf, BytesMut};
use classic_rs_proto::packets::{
    id, Login, MessageOut, PlayerClick, PositionUpdate, SetBlockClient, SetBlockMode,
};
use classic_rs_proto::types::{BlockPos, Vec3};
use classic_rs_world::block_registry::BLOCK_AIR;
use tracing::{debug, error, info, warn};

use crate::constants::*;
use crate::dispatch::DispatchTable;
use crate::error::NetError;
use crate::events::{ClientEvent, EventSender};
use crate::link::{ConnectionState, Link};
use crate::socket::{ConnectStatus, Connector};

/// Where to connect and how to log in.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub address: String,
    pub port: u16,
    pub username: String,
    pub mppass: String,
    pub use_cpe: bool,
}

pub struct Multiplayer<C> {
    config: ConnectionConfig,
    connector: Box<dyn Connector>,
    link: Link,
    read_buf: BytesMut,
    handlers: DispatchTable<C>,
    connect_started: Option<Instant>,
    last_probe: Option<Instant>,
    last_opcode: u8,
    ticks: u32,
}

impl<C> Multiplayer<C> {
    pub fn new(
        config: ConnectionConfig,
        connector: Box<dyn Connector>,
        handlers: DispatchTable<C>,
        events: EventSender,
    ) -> Self {
        Self {
            config,
            connector,
            link: Link::new(events),
            read_buf: BytesMut::with_capacity(READ_BUFFER_SIZE),
            handlers,
            connect_started: None,
            last_probe: None,
            last_opcode: 0,
            ticks: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.link.state
    }

    pub fn link(&mut self) -> &mut Link {
        &mut self.link
    }

    pub fn handlers_mut(&mut self) -> &mut DispatchTable<C> {
        &mut self.handlers
    }

    pub fn begin_connect(&mut self, now: Instant) {
        info!("Connecting to {}:{}", self.config.address, self.config.port);
        self.link.state = ConnectionState::Connecting;
        self.connect_started = Some(now);
        if let Err(e) = self.connector.begin(&self.config.address, self.config.port) {
            self.fail_connect(Some(e));
        }
    }

    /// Advance the connection by one tick. Returns `true` on maintenance
    /// ticks, when the caller should send its position.
    pub fn tick(&mut self, ctx: &mut C, now: Instant) -> Result<bool, NetError> {
        match self.link.state {
            ConnectionState::Connecting => {
                self.tick_connect(now)?;
                return Ok(false);
            }
            ConnectionState::Connected => {}
            _ => return Ok(false),
        }

        self.probe_liveness(now);
        if self.link.state.is_closed() {
            return Ok(false);
        }
        self.read_socket();
        if self.link.state.is_closed() {
            return Ok(false);
        }
        self.dispatch(ctx, now)?;

        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % MAINTENANCE_TICKS != 0 {
            return Ok(false);
        }
        if self.link.has_pending() {
            self.link.flush();
        }
        Ok(!self.link.state.is_closed())
    }

    pub fn disconnect(&mut self, title: impl Into<String>, reason: impl Into<String>) {
        if self.link.state == ConnectionState::Connecting {
            self.connector.cancel();
        }
        self.link.disconnect(title, reason);
    }

    /// Forget every handler and buffered byte and free the socket.
    pub fn reset(&mut self) {
        self.connector.cancel();
        self.handlers.clear();
        self.link.clear_write();
        self.link.free();
        self.read_buf.clear();
        self.last_opcode = 0;
        self.last_probe = None;
    }

    // -----------------------------------------------------------------------
    // Connecting
    // -----------------------------------------------------------------------

    fn tick_connect(&mut self, now: Instant) -> Result<(), NetError> {
        match self.connector.poll() {
            ConnectStatus::Failed(e) => self.fail_connect(Some(e)),
            ConnectStatus::Connected(socket) => {
                self.link.socket = Some(socket);
                self.finish_connect(now)?;
            }
            ConnectStatus::Pending => {
                let started = self.connect_started.unwrap_or(now);
                let elapsed = now.saturating_duration_since(started);
                if elapsed >= CONNECT_TIMEOUT {
                    self.fail_connect(None);
                } else {
                    let left = CONNECT_TIMEOUT - elapsed;
                    self.link.emit(ClientEvent::Loading(
                        left.as_secs_f32() / CONNECT_TIMEOUT.as_secs_f32(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn finish_connect(&mut self, now: Instant) -> Result<(), NetError> {
        info!("Connected to {}:{}", self.config.address, self.config.port);
        self.link.state = ConnectionState::Connected;
        self.link.emit(ClientEvent::Loading(0.0));

        self.read_buf.clear();
        self.link.clear_write();
        self.last_opcode = 0;
        self.last_probe = None;
        self.ticks = 0;

        self.link.send(&Login {
            username: self.config.username.clone(),
            mppass: self.config.mppass.clone(),
            use_cpe: self.config.use_cpe,
        })?;
        self.link.last_packet = Some(now);
        self.link.emit(ClientEvent::Connected);
        Ok(())
    }

    fn fail_connect(&mut self, err: Option<io::Error>) {
        self.connector.cancel();
        let code = err.as_ref().and_then(io::Error::raw_os_error);
        match &err {
            Some(e) => error!(
                code = ?code,
                "Failed to connect to {}:{}: {e}", self.config.address, self.config.port
            ),
            None => error!(
                "Timed out connecting to {}:{}",
                self.config.address, self.config.port
            ),
        }
        let title = format!(
            "Failed to connect to {}:{}",
            self.config.address, self.config.port
        );
        self.link.close(
            ConnectionState::Failed { code },
            title,
            "You failed to connect to the server. It's probably down!".to_owned(),
        );
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// After a long silence, check the socket once a second and drop the
    /// session if it looks dead.
    fn probe_liveness(&mut self, now: Instant) {
        let Some(last) = self.link.last_packet else {
            return;
        };
        if now.saturating_duration_since(last) < LIVENESS_TIMEOUT {
            return;
        }
        if self
            .last_probe
            .is_some_and(|t| now.saturating_duration_since(t) < PROBE_INTERVAL)
        {
            return;
        }
        self.last_probe = Some(now);

        let healthy = match self.link.socket.as_mut() {
            Some(socket) => match (socket.available(), socket.poll_readable()) {
                // readable with nothing to read: the peer hung up
                (Ok(pending), Ok(readable)) => !(pending == 0 && readable),
                _ => false,
            },
            None => false,
        };
        if self.link.write_failed() || !healthy {
            warn!("Liveness probe failed, dropping connection");
            self.link
                .disconnect("Disconnected!", "You've lost connection to the server");
        }
    }

    fn read_socket(&mut self) {
        let Some(socket) = self.link.socket.as_mut() else {
            return;
        };
        let pending = match socket.available() {
            Ok(n) => n,
            Err(e) => return self.read_failed(e),
        };
        if pending == 0 {
            return;
        }

        let start = self.read_buf.len();
        let room = READ_BUFFER_SIZE.saturating_sub(start).min(READ_CHUNK_SIZE);
        let want = pending.min(room);
        self.read_buf.resize(start + want, 0);
        match socket.read(&mut self.read_buf[start..]) {
            Ok(n) => self.read_buf.truncate(start + n),
            Err(e) => {
                self.read_buf.truncate(start);
                self.read_failed(e);
            }
        }
    }

    fn read_failed(&mut self, err: io::Error) {
        warn!("Error reading from server: {err}");
        self.link
            .disconnect("&eLost connection to the server", "I/O error when reading packets");
    }

    /// Run every complete packet in the read buffer through its handler.
    /// A trailing partial packet stays buffered for the next tick.
    fn dispatch(&mut self, ctx: &mut C, now: Instant) -> Result<(), NetError> {
        while let Some(&opcode) = self.read_buf.first() {
            if self.link.d3_fix()
                && self.last_opcode == id::HACK_CONTROL
                && (opcode == 0x00 || opcode == 0xFF)
            {
                warn!("Skipping invalid HackControl byte from D3 server");
                self.read_buf.advance(1);
                self.link.emit(ClientEvent::ResetJumpHeight);
                continue;
            }

            let size = self
                .handlers
                .size(opcode)
                .ok_or(NetError::InvalidOpcode(opcode))?;
            if self.read_buf.len() < 1 + size {
                break;
            }

            let mut payload = self.read_buf.split_to(1 + size).freeze();
            payload.advance(1);
            self.last_opcode = opcode;
            self.link.last_packet = Some(now);

            let handler = self
                .handlers
                .handler(opcode)
                .ok_or(NetError::UnsupportedOpcode(opcode))?;
            handler(ctx, &mut self.link, &mut payload)?;

            if self.link.state.is_closed() {
                debug!("Session closed by handler for opcode 0x{opcode:02X}");
                break;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    /// Send chat in 64 character lines. Every line but the last is flagged
    /// as partial when the server accepts long messages.
    pub fn send_chat(&mut self, text: &str) -> Result<(), NetError> {
        if text.is_empty() || self.link.state != ConnectionState::Connected {
            return Ok(());
        }
        let chars: Vec<char> = text.chars().collect();
        let lines: Vec<&[char]> = chars.chunks(CHAT_LINE_LEN).collect();
        let last = lines.len() - 1;
        for (i, line) in lines.into_iter().enumerate() {
            let partial = self.link.long_messages().then_some(i != last);
            self.link.send(&MessageOut {
                partial,
                text: line.iter().collect(),
            })?;
        }
        Ok(())
    }

    pub fn send_position(&mut self, pos: Vec3, yaw: f32, pitch: f32) -> Result<(), NetError> {
        if self.link.state != ConnectionState::Connected {
            return Ok(());
        }
        self.link.send(&PositionUpdate { pos, yaw, pitch })
    }

    pub fn send_player_click(&mut self, click: &PlayerClick) -> Result<(), NetError> {
        if self.link.state != ConnectionState::Connected {
            return Ok(());
        }
        self.link.send(click)
    }

    /// Report a block the player changed. Breaking a block (new block is
    /// air) is sent as a delete holding `held`.
    pub fn send_block_change(&mut self, pos: BlockPos, block: u8, held: u8) -> Result<(), NetError> {
        if self.link.state != ConnectionState::Connected {
            return Ok(());
        }
        let packet = if block == BLOCK_AIR {
            SetBlockClient {
                pos,
                mode: SetBlockMode::Delete,
                block: held,
            }
        } else {
            SetBlockClient {
                pos,
                mode: SetBlockMode::Place,
                block,
            }
        };
        self.link.send(&packet)
    }
}
