//! Block definitions and per-block permissions for the 256 block ids.
//!
//! Ids below [`BLOCK_CPE_COUNT`] are built in. Maps and servers may define
//! custom blocks over any id; those carry the full set of properties below.

use classic_rs_proto::types::Vec3;

use crate::env::Rgb;

/// Blocks of the original classic game.
pub const BLOCK_ORIGINAL_COUNT: usize = 50;
/// Blocks including the CustomBlocks extension set.
pub const BLOCK_CPE_COUNT: usize = 66;
pub const BLOCK_COUNT: usize = 256;

pub const BLOCK_AIR: u8 = 0;
pub const BLOCK_STONE: u8 = 1;
pub const BLOCK_GRASS: u8 = 2;
pub const BLOCK_DIRT: u8 = 3;
pub const BLOCK_BEDROCK: u8 = 7;
pub const BLOCK_WATER: u8 = 8;
pub const BLOCK_STILL_WATER: u8 = 9;
pub const BLOCK_LAVA: u8 = 10;
pub const BLOCK_STILL_LAVA: u8 = 11;

/// How a block is drawn.
pub mod draw {
    pub const OPAQUE: u8 = 0;
    pub const TRANSPARENT: u8 = 1;
    pub const TRANSPARENT_THICK: u8 = 2;
    pub const TRANSLUCENT: u8 = 3;
    pub const SPRITE: u8 = 4;
    pub const GAS: u8 = 5;
}

/// How entities collide with a block.
pub mod collide {
    pub const GAS: u8 = 0;
    pub const LIQUID: u8 = 1;
    pub const SOLID: u8 = 2;
}

pub mod sound {
    pub const NONE: u8 = 0;
    pub const WOOD: u8 = 1;
    pub const GRAVEL: u8 = 2;
    pub const GRASS: u8 = 3;
    pub const STONE: u8 = 4;
    pub const METAL: u8 = 5;
    pub const GLASS: u8 = 6;
    pub const CLOTH: u8 = 7;
    pub const SAND: u8 = 8;
    pub const SNOW: u8 = 9;
}

/// Texture slots, in the order maps store them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Top = 0,
    Bottom = 1,
    XMin = 2,
    XMax = 3,
    ZMin = 4,
    ZMax = 5,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockDefinition {
    pub name: String,
    pub collide: u8,
    pub speed: f32,
    /// Texture atlas index per [`Face`].
    pub textures: [u8; 6],
    pub blocks_light: bool,
    pub full_bright: bool,
    pub draw: u8,
    /// Sprite variant for [`draw::SPRITE`] blocks.
    pub sprite_offset: u8,
    pub dig_sound: u8,
    pub step_sound: u8,
    /// 0 means no fog inside the block.
    pub fog_density: f32,
    pub fog_color: Rgb,
    pub min_bb: Vec3,
    pub max_bb: Vec3,
}

impl Default for BlockDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            collide: collide::SOLID,
            speed: 1.0,
            textures: [0; 6],
            blocks_light: true,
            full_bright: false,
            draw: draw::OPAQUE,
            sprite_offset: 0,
            dig_sound: sound::NONE,
            step_sound: sound::NONE,
            fog_density: 0.0,
            fog_color: Rgb::new(0, 0, 0),
            min_bb: Vec3::ZERO,
            max_bb: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl BlockDefinition {
    pub fn texture(&self, face: Face) -> u8 {
        self.textures[face as usize]
    }

    /// Sets dig and step sound together. Glass steps sound like stone.
    pub fn set_walk_sound(&mut self, walk: u8) {
        self.dig_sound = walk;
        self.step_sound = if walk == sound::GLASS {
            sound::STONE
        } else {
            walk
        };
    }
}

/// Definitions and place/delete permissions for all block ids.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRegistry {
    defs: Vec<BlockDefinition>,
    custom: [bool; BLOCK_COUNT],
    can_place: [bool; BLOCK_COUNT],
    can_delete: [bool; BLOCK_COUNT],
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            defs: vec![BlockDefinition::default(); BLOCK_COUNT],
            custom: [false; BLOCK_COUNT],
            can_place: [false; BLOCK_COUNT],
            can_delete: [false; BLOCK_COUNT],
        }
    }

    pub fn get(&self, id: u8) -> &BlockDefinition {
        &self.defs[id as usize]
    }

    pub fn get_mut(&mut self, id: u8) -> &mut BlockDefinition {
        &mut self.defs[id as usize]
    }

    /// Marks `id` as carrying a custom definition.
    pub fn define_custom(&mut self, id: u8) {
        self.custom[id as usize] = true;
    }

    pub fn is_custom_defined(&self, id: u8) -> bool {
        self.custom[id as usize]
    }

    /// Custom block ids in ascending order, excluding air.
    pub fn custom_ids(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=u8::MAX).filter(move |&id| self.custom[id as usize])
    }

    pub fn can_place(&self, id: u8) -> bool {
        self.can_place[id as usize]
    }

    pub fn can_delete(&self, id: u8) -> bool {
        self.can_delete[id as usize]
    }

    pub fn set_permissions(&mut self, id: u8, place: bool, delete: bool) {
        self.can_place[id as usize] = place;
        self.can_delete[id as usize] = delete;
    }

    /// Allows placing and deleting every built-in block (ids `1..count`).
    pub fn allow_builtin(&mut self, count: usize) {
        for id in 1..count.min(BLOCK_COUNT) {
            self.set_permissions(id as u8, true, true);
        }
    }
}
