//! Client game state: the current map, the local player and what we know
//! about the server.

use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Instant;

use byteorder::{BigEndian, ReadBytesExt};
use classic_rs_net::{ClientEvent, ConnectionState, NetError, PingList, ServerConnection};
use classic_rs_proto::compression::gzip_reader;
use classic_rs_proto::packets::{HackControl, TwoWayPing};
use classic_rs_proto::types::{packed_to_degrees, Vec3};
use classic_rs_world::flat_generator::generate_flat;
use classic_rs_world::world::random_uuid;
use classic_rs_world::{formats, FormatError, Level, LoadEvent, LoadOptions, World};
use tracing::{debug, info, warn};

use crate::textures::TexturePackFetcher;

/// Maintenance ticks between two ping probes.
const PING_INTERVAL_TICKS: u32 = 20;

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec3,
    /// Degrees.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    pub held_block: u8,
    /// Hacks the server allows, `None` if it never said.
    pub hacks: Option<HackControl>,
    /// Jump height in blocks set by the server, `None` for the default.
    pub jump_height: Option<f32>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            held_block: 1,
            hacks: None,
            jump_height: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    pub name: String,
    pub motd: String,
    pub is_op: bool,
    pub app_name: String,
    /// Extensions the server announced, with versions.
    pub extensions: Vec<(String, i32)>,
    /// ExtEntry packets still expected.
    pub pending_extensions: u16,
    pub two_way_ping: bool,
}

impl ServerInfo {
    pub fn supports(&self, name: &str) -> bool {
        self.extensions
            .iter()
            .any(|(ext, _)| ext.eq_ignore_ascii_case(name))
    }
}

/// Compressed map bytes received so far.
#[derive(Debug, Default)]
pub struct MapDownload {
    pub compressed: Vec<u8>,
}

impl MapDownload {
    /// Decompress the map: a big-endian block count, then the blocks.
    pub fn finish(self, width: u16, height: u16, length: u16) -> Result<World, FormatError> {
        let mut r = gzip_reader(Cursor::new(self.compressed))?;
        let count = r.read_u32::<BigEndian>()? as usize;
        let volume = World::volume(width, height, length)?;
        if count != volume {
            return Err(FormatError::BlockCountMismatch {
                expected: volume,
                got: count,
            });
        }
        let mut blocks = vec![0u8; volume];
        r.read_exact(&mut blocks)?;
        World::new(width, height, length, blocks, random_uuid())
    }
}

pub struct Game {
    pub level: Level,
    pub player: Player,
    pub server: ServerInfo,
    pub ping: PingList,
    pub download: Option<MapDownload>,
    pub use_cpe: bool,
    load_opts: LoadOptions,
    textures: Box<dyn TexturePackFetcher>,
    maintenance_ticks: u32,
}

impl Game {
    pub fn new(
        use_cpe: bool,
        load_opts: LoadOptions,
        textures: Box<dyn TexturePackFetcher>,
    ) -> Result<Self, FormatError> {
        Ok(Self {
            level: Level::new(World::empty(0, 0, 0)?),
            player: Player::default(),
            server: ServerInfo::default(),
            ping: PingList::new(),
            download: None,
            use_cpe,
            load_opts,
            textures,
            maintenance_ticks: 0,
        })
    }

    pub fn has_world(&self) -> bool {
        !self.level.world.blocks().is_empty()
    }

    // -----------------------------------------------------------------------
    // Maps
    // -----------------------------------------------------------------------

    /// Replace the current map and move the player to its spawn.
    pub fn set_level(&mut self, level: Level) {
        self.level = level;
        self.player.pos = self.level.spawn.pos;
        self.player.yaw = packed_to_degrees(self.level.spawn.yaw);
        self.player.pitch = packed_to_degrees(self.level.spawn.pitch);
    }

    /// Install a world received from the server, keeping the block
    /// definitions and permissions the server already set up.
    pub fn set_downloaded_world(&mut self, world: World) {
        let blocks = std::mem::take(&mut self.level.blocks);
        let mut level = Level::new(world);
        level.blocks = blocks;
        level.spawn.pos = Vec3::new(
            level.world.width() as f32 / 2.0,
            level.world.height() as f32,
            level.world.length() as f32 / 2.0,
        );
        self.set_level(level);
    }

    pub fn load_map(&mut self, path: &Path) -> Result<(), FormatError> {
        let mut textures = Vec::new();
        let mut permissions_changed = false;
        let level = formats::load(path, &self.load_opts, &mut |event| match event {
            LoadEvent::Progress(p) => debug!("Loading map: {:.0}%", p * 100.0),
            LoadEvent::PermissionsChanged => permissions_changed = true,
            LoadEvent::TexturePack(url) => textures.push(url),
        })?;

        self.set_level(level);
        if permissions_changed {
            debug!("Map changed block permissions");
        }
        for url in textures {
            self.textures.request(&url);
        }
        Ok(())
    }

    /// Load the configured map, or generate a flat one.
    pub fn start_singleplayer(
        &mut self,
        map: Option<&Path>,
        dims: (u16, u16, u16),
    ) -> Result<(), FormatError> {
        match map {
            Some(path) => self.load_map(path),
            None => {
                let (width, height, length) = dims;
                info!("Generating flat {width}x{height}x{length} map");
                let level = generate_flat(width, height, length)?;
                self.set_level(level);
                Ok(())
            }
        }
    }

    pub fn save_map(&self, path: &Path) -> Result<(), FormatError> {
        formats::save(path, &self.level)
    }

    // -----------------------------------------------------------------------
    // Ticking
    // -----------------------------------------------------------------------

    /// Runs on every maintenance tick of the connection.
    pub fn maintenance(
        &mut self,
        conn: &mut ServerConnection<Game>,
        now: Instant,
    ) -> Result<(), NetError> {
        self.textures.check_resources();
        self.maintenance_ticks = self.maintenance_ticks.wrapping_add(1);
        if conn.state() != ConnectionState::Connected
            || self.download.is_some()
            || !self.has_world()
        {
            return Ok(());
        }

        conn.send_position(self.player.pos, self.player.yaw, self.player.pitch)?;
        if self.server.two_way_ping && self.maintenance_ticks % PING_INTERVAL_TICKS == 0 {
            if let Some(link) = conn.link() {
                let data = self.ping.next_ping_data(now);
                link.send(&TwoWayPing {
                    server_to_client: false,
                    data,
                })?;
            }
        }
        Ok(())
    }

    /// React to a connection event. Returns `false` once the session is over.
    pub fn handle_event(&mut self, event: ClientEvent) -> bool {
        match event {
            ClientEvent::Loading(p) => debug!("Loading: {:.0}%", p * 100.0),
            ClientEvent::Connected => info!("Logged in"),
            ClientEvent::Disconnected { title, reason } => {
                warn!("{title}: {reason}");
                return false;
            }
            ClientEvent::PermissionsChanged => debug!("Block permissions changed"),
            ClientEvent::Chat(line) => info!(target: "chat", "{line}"),
            ClientEvent::ResetJumpHeight => self.player.jump_height = None,
        }
        true
    }
}
