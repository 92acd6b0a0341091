//! Flat world generator.
//!
//! Layers, from the top of the ground down:
//! - Y = height/2 - 1: Grass
//! - Y = height/2 - 2: Dirt
//! - below: Stone
//!
//! Everything from Y = height/2 up is air.

use crate::block_registry::{BLOCK_AIR, BLOCK_DIRT, BLOCK_GRASS, BLOCK_STONE};
use crate::error::FormatError;
use crate::level::Level;
use crate::world::World;
use classic_rs_proto::types::Vec3;

/// Generate a flat world of the given dimensions, spawning at its centre.
pub fn generate_flat(width: u16, height: u16, length: u16) -> Result<Level, FormatError> {
    let mut world = World::empty(width, height, length)?;
    let grass_y = (height / 2) as usize;
    let layer = width as usize * length as usize;

    for (y, slab) in world.blocks_mut().chunks_mut(layer.max(1)).enumerate() {
        let block = layer_block(y, grass_y);
        slab.fill(block);
    }

    let mut level = Level::new(world);
    level.spawn.pos = Vec3::new(width as f32 / 2.0, grass_y as f32, length as f32 / 2.0);
    Ok(level)
}

fn layer_block(y: usize, ground: usize) -> u8 {
    if y >= ground {
        BLOCK_AIR
    } else if y + 1 == ground {
        BLOCK_GRASS
    } else if y + 2 == ground {
        BLOCK_DIRT
    } else {
        BLOCK_STONE
    }
}
