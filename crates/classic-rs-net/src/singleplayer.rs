//! Singleplayer "connection": no socket, chat is echoed locally.

use classic_rs_world::BlockRegistry;
use tracing::info;

use crate::constants::{
    BUILTIN_BLOCKS_CLASSIC, BUILTIN_BLOCKS_CPE, CHAT_LINE_LEN, MAINTENANCE_TICKS,
};
use crate::events::{ClientEvent, EventSender};
use crate::link::ConnectionState;

pub struct Singleplayer {
    events: EventSender,
    state: ConnectionState,
    ticks: u32,
    last_colour: Option<char>,
}

impl Singleplayer {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            state: ConnectionState::Disconnected,
            ticks: 0,
            last_colour: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Enable every built-in block and go straight to connected.
    pub fn begin_connect(&mut self, blocks: &mut BlockRegistry, use_cpe_blocks: bool) {
        let count = if use_cpe_blocks {
            BUILTIN_BLOCKS_CPE
        } else {
            BUILTIN_BLOCKS_CLASSIC
        };
        blocks.allow_builtin(count);
        self.state = ConnectionState::Connected;
        self.ticks = 0;
        info!("Started singleplayer session with {count} blocks");
        let _ = self.events.send(ClientEvent::PermissionsChanged);
    }

    pub fn send_chat(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.last_colour = None;
        let chars: Vec<char> = text.chars().collect();
        for portion in chars.chunks(CHAT_LINE_LEN) {
            self.add_portion(portion);
        }
    }

    fn add_portion(&mut self, portion: &[char]) {
        let mut line = String::with_capacity(portion.len() + 2);
        if let Some(colour) = self.last_colour.filter(|&c| c != 'f') {
            line.push('&');
            line.push(colour);
        }
        line.extend(portion.iter().map(|&c| if c == '%' { '&' } else { c }));
        line.truncate(line.trim_end().len());

        if let Some(colour) = last_colour_code(&line) {
            self.last_colour = Some(colour);
        }
        let _ = self.events.send(ClientEvent::Chat(line));
    }

    /// Returns `true` on maintenance ticks.
    pub fn tick(&mut self) -> bool {
        if self.state != ConnectionState::Connected {
            return false;
        }
        self.ticks = self.ticks.wrapping_add(1);
        self.ticks % MAINTENANCE_TICKS == 0
    }

    pub fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}

/// The colour of the last `&x` code in `text`, lowercased.
fn last_colour_code(text: &str) -> Option<char> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .windows(2)
        .rev()
        .find(|w| w[0] == '&' && w[1].is_ascii_hexdigit())
        .map(|w| w[1].to_ascii_lowercase())
}
