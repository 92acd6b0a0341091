//! A loaded map: blocks plus everything a map file carries alongside them.

use classic_rs_proto::types::Vec3;

use crate::block_registry::BlockRegistry;
use crate::env::Environment;
use crate::world::World;

/// Default reach distance in blocks.
pub const DEFAULT_REACH_DISTANCE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spawn {
    pub pos: Vec3,
    /// Packed yaw (`angle / 256` of a turn).
    pub yaw: u8,
    /// Packed pitch.
    pub pitch: u8,
}

#[derive(Debug, Clone)]
pub struct Level {
    pub world: World,
    pub spawn: Spawn,
    pub env: Environment,
    pub blocks: BlockRegistry,
    pub reach_distance: f32,
}

impl Level {
    /// Wraps a world with default spawn, environment and block definitions.
    pub fn new(world: World) -> Self {
        let env = Environment::new(world.height());
        Self {
            world,
            spawn: Spawn::default(),
            env,
            blocks: BlockRegistry::new(),
            reach_distance: DEFAULT_REACH_DISTANCE,
        }
    }

    pub fn spawn_in_bounds(&self) -> bool {
        let (x, y, z) = self.spawn.pos.floor();
        self.world.is_valid_pos(x, y, z)
    }
}

/// Side effects of a load, delivered to the caller's listener.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    /// Fraction of the block array read so far.
    Progress(f32),
    /// Custom block definitions changed place/delete permissions.
    PermissionsChanged,
    /// The map asks for a texture pack.
    TexturePack(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Apply custom block definitions found in the map.
    pub allow_custom_blocks: bool,
    /// Report texture pack URLs found in the map.
    pub allow_server_textures: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            allow_custom_blocks: true,
            allow_server_textures: true,
        }
    }
}
