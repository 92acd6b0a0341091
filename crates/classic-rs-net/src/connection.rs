//! The active server connection, chosen once per session.

use std::time::Instant;

use classic_rs_proto::packets::PlayerClick;
use classic_rs_proto::types::{BlockPos, Vec3};
use classic_rs_world::BlockRegistry;

use crate::error::NetError;
use crate::link::{ConnectionState, Link};
use crate::multiplayer::Multiplayer;
use crate::singleplayer::Singleplayer;

pub enum ServerConnection<C> {
    Singleplayer(Singleplayer),
    Multiplayer(Multiplayer<C>),
}

impl<C> ServerConnection<C> {
    pub fn is_singleplayer(&self) -> bool {
        matches!(self, Self::Singleplayer(_))
    }

    pub fn state(&self) -> ConnectionState {
        match self {
            Self::Singleplayer(sp) => sp.state(),
            Self::Multiplayer(mp) => mp.state(),
        }
    }

    /// Singleplayer enables the built-in blocks in `blocks` right away;
    /// multiplayer starts connecting and waits for the server.
    pub fn begin_connect(&mut self, blocks: &mut BlockRegistry, use_cpe_blocks: bool, now: Instant) {
        match self {
            Self::Singleplayer(sp) => sp.begin_connect(blocks, use_cpe_blocks),
            Self::Multiplayer(mp) => mp.begin_connect(now),
        }
    }

    /// Returns `true` on maintenance ticks.
    pub fn tick(&mut self, ctx: &mut C, now: Instant) -> Result<bool, NetError> {
        match self {
            Self::Singleplayer(sp) => Ok(sp.tick()),
            Self::Multiplayer(mp) => mp.tick(ctx, now),
        }
    }

    pub fn send_chat(&mut self, text: &str) -> Result<(), NetError> {
        match self {
            Self::Singleplayer(sp) => {
                sp.send_chat(text);
                Ok(())
            }
            Self::Multiplayer(mp) => mp.send_chat(text),
        }
    }

    pub fn send_position(&mut self, pos: Vec3, yaw: f32, pitch: f32) -> Result<(), NetError> {
        match self {
            Self::Singleplayer(_) => Ok(()),
            Self::Multiplayer(mp) => mp.send_position(pos, yaw, pitch),
        }
    }

    pub fn send_player_click(&mut self, click: &PlayerClick) -> Result<(), NetError> {
        match self {
            Self::Singleplayer(_) => Ok(()),
            Self::Multiplayer(mp) => mp.send_player_click(click),
        }
    }

    pub fn send_block_change(&mut self, pos: BlockPos, block: u8, held: u8) -> Result<(), NetError> {
        match self {
            Self::Singleplayer(_) => Ok(()),
            Self::Multiplayer(mp) => mp.send_block_change(pos, block, held),
        }
    }

    /// The outbound side of the socket. Singleplayer has none.
    pub fn link(&mut self) -> Option<&mut Link> {
        match self {
            Self::Singleplayer(_) => None,
            Self::Multiplayer(mp) => Some(mp.link()),
        }
    }

    pub fn disconnect(&mut self, title: impl Into<String>, reason: impl Into<String>) {
        match self {
            Self::Singleplayer(sp) => sp.disconnect(),
            Self::Multiplayer(mp) => mp.disconnect(title, reason),
        }
    }
}
