//! MCSharp `.lvl` maps.
//!
//! Gzip-compressed, little-endian header followed by the raw block array.
//! Files with a leading [`LVL_VERSION`] carry an extra permissions field.
//! An optional [`CUSTOM_BLOCKS_MARKER`] trailer overlays custom blocks in
//! 16x16x16 chunks.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use classic_rs_proto::compression::gzip_reader;
use classic_rs_proto::types::Vec3;
use tracing::debug;

use crate::block_registry::BLOCK_CPE_COUNT;
use crate::error::FormatError;
use crate::formats::{read_blocks, try_read_u8};
use crate::level::{Level, LoadEvent, Spawn};
use crate::world::{random_uuid, World};

pub const LVL_VERSION: u16 = 1874;
/// Placeholder id for cells whose real block lives in the custom overlay.
pub const CUSTOM_TILE: u8 = 163;
pub const CUSTOM_BLOCKS_MARKER: u8 = 0xBD;
const CHUNK_SIZE: usize = 16;

/// Canonical ids for the physics blocks `BLOCK_CPE_COUNT..256`.
const PHYSICS_BLOCKS: [u8; 256 - BLOCK_CPE_COUNT] = [
    0, 0, 0, 0, 39, 36, 36, 10, 46, 21, 22, 22, 22, 22, 4, 0,
    22, 21, 0, 22, 23, 24, 22, 26, 27, 28, 30, 31, 32, 33, 34, 35,
    36, 22, 20, 49, 45, 1, 4, 0, 9, 11, 4, 19, 5, 17, 10, 49,
    20, 1, 18, 12, 5, 25, 46, 44, 17, 49, 20, 1, 18, 12, 5, 25,
    36, 34, 0, 9, 11, 46, 44, 0, 9, 11, 8, 10, 22, 27, 22, 8,
    10, 28, 17, 49, 20, 1, 18, 12, 5, 25, 46, 44, 11, 9, 0, 9,
    11, CUSTOM_TILE, 0, 0, 9, 11, 0, 0, 0, 0, 0, 0, 0, 28, 22, 21,
    11, 0, 0, 0, 46, 46, 10, 10, 46, 20, 41, 42, 11, 9, 0, 8,
    10, 10, 8, 0, 22, 22, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 21, 10, 0, 0, 0, 0, 0, 22, 22, 42, 3, 2, 29, 47, 0,
    0, 0, 0, 0, 27, 46, 48, 24, 22, 36, 34, 8, 10, 21, 29, 22,
    10, 22, 22, 41, 19, 35, 21, 29, 49, 34, 16, 41, 0, 22,
];

const fn conversion_table() -> [u8; 256] {
    let mut conv = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        conv[i] = if i < BLOCK_CPE_COUNT {
            i as u8
        } else {
            PHYSICS_BLOCKS[i - BLOCK_CPE_COUNT]
        };
        i += 1;
    }
    conv
}

/// Full id remap table; identity below [`BLOCK_CPE_COUNT`].
pub static CONVERSION: [u8; 256] = conversion_table();

pub fn load(src: impl Read, events: &mut dyn FnMut(LoadEvent)) -> Result<Level, FormatError> {
    let mut r = gzip_reader(src)?;

    let header = r.read_u16::<LittleEndian>()?;
    let versioned = header == LVL_VERSION;
    let width = if versioned {
        r.read_u16::<LittleEndian>()?
    } else {
        header
    };
    let length = r.read_u16::<LittleEndian>()?;
    let height = r.read_u16::<LittleEndian>()?;

    let x = r.read_u16::<LittleEndian>()? as f32;
    let z = r.read_u16::<LittleEndian>()? as f32;
    let y = r.read_u16::<LittleEndian>()? as f32;
    let yaw = r.read_u8()?;
    let pitch = r.read_u8()?;
    if versioned {
        // per-visit and per-build permissions
        r.read_u16::<LittleEndian>()?;
    }

    let volume = World::volume(width, height, length)?;
    let mut blocks = read_blocks(&mut r, volume, events)?;
    convert_physics_blocks(&mut blocks);

    let mut world = World::new(width, height, length, blocks, random_uuid())?;
    if try_read_u8(&mut r)? == Some(CUSTOM_BLOCKS_MARKER) {
        read_custom_blocks(&mut r, &mut world)?;
    }

    debug!(width, height, length, versioned, "Decoded lvl map");
    let mut level = Level::new(world);
    level.spawn = Spawn {
        pos: Vec3::new(x, y, z),
        yaw,
        pitch,
    };
    Ok(level)
}

/// Maps legacy physics block ids onto their canonical counterparts.
///
/// Runs of four ids that are all already canonical are skipped whole.
pub fn convert_physics_blocks(blocks: &mut [u8]) {
    let mut quads = blocks.chunks_exact_mut(4);
    for quad in &mut quads {
        if quad.iter().all(|&b| (b as usize) < BLOCK_CPE_COUNT) {
            continue;
        }
        for b in quad.iter_mut() {
            *b = CONVERSION[*b as usize];
        }
    }
    for b in quads.into_remainder() {
        *b = CONVERSION[*b as usize];
    }
}

/// Applies the custom block overlay. Each chunk is introduced by a flag byte;
/// only cells still holding [`CUSTOM_TILE`] take the overlay value.
fn read_custom_blocks(r: &mut impl Read, world: &mut World) -> Result<(), FormatError> {
    let (width, height, length) = (
        world.width() as usize,
        world.height() as usize,
        world.length() as usize,
    );
    let mut chunk = [0u8; CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE];

    for y in (0..height).step_by(CHUNK_SIZE) {
        for z in (0..length).step_by(CHUNK_SIZE) {
            for x in (0..width).step_by(CHUNK_SIZE) {
                if try_read_u8(r)? != Some(1) {
                    continue;
                }
                r.read_exact(&mut chunk)?;

                for (i, &custom) in chunk.iter().enumerate() {
                    let (xx, yy, zz) = (i & 0xF, (i >> 8) & 0xF, (i >> 4) & 0xF);
                    if x + xx >= width || y + yy >= height || z + zz >= length {
                        continue;
                    }
                    let idx = world.pack(x + xx, y + yy, z + zz);
                    let cell = &mut world.blocks_mut()[idx];
                    if *cell == CUSTOM_TILE {
                        *cell = custom;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use classic_rs_proto::compression::gzip_writer;
    use std::io::{Cursor, Write};

    fn header(out: &mut Vec<u8>, w: u16, l: u16, h: u16, spawn: (u16, u16, u16)) {
        out.write_u16::<LittleEndian>(LVL_VERSION).unwrap();
        out.write_u16::<LittleEndian>(w).unwrap();
        out.write_u16::<LittleEndian>(l).unwrap();
        out.write_u16::<LittleEndian>(h).unwrap();
        out.write_u16::<LittleEndian>(spawn.0).unwrap();
        out.write_u16::<LittleEndian>(spawn.2).unwrap();
        out.write_u16::<LittleEndian>(spawn.1).unwrap();
        out.write_u8(0).unwrap();
        out.write_u8(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
    }

    fn gzip(raw: &[u8]) -> Vec<u8> {
        let mut w = gzip_writer(Vec::new());
        w.write_all(raw).unwrap();
        w.finish().unwrap()
    }

    fn decode(raw: &[u8]) -> Result<Level, FormatError> {
        load(Cursor::new(gzip(raw)), &mut |_| {})
    }

    #[test]
    fn minimal_versioned_map() {
        let mut raw = Vec::new();
        header(&mut raw, 4, 4, 4, (1, 1, 1));
        let blocks: Vec<u8> = (0..64u8).map(|i| i % 50).collect();
        raw.extend_from_slice(&blocks);

        let level = decode(&raw).unwrap();
        assert_eq!(level.world.blocks().len(), 64);
        assert_eq!(level.world.blocks(), &blocks[..]);
        assert_eq!(level.spawn.pos, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!((level.spawn.yaw, level.spawn.pitch), (0, 0));
    }

    #[test]
    fn unversioned_header_is_width() {
        let mut raw = Vec::new();
        for v in [2u16, 3, 1, 0, 0, 0] {
            raw.write_u16::<LittleEndian>(v).unwrap();
        }
        raw.extend_from_slice(&[64, 32]);
        raw.extend_from_slice(&[1; 6]);

        let level = decode(&raw).unwrap();
        assert_eq!(
            (level.world.width(), level.world.length(), level.world.height()),
            (2, 3, 1)
        );
        assert_eq!((level.spawn.yaw, level.spawn.pitch), (64, 32));
    }

    #[test]
    fn physics_blocks_are_remapped() {
        let mut raw = Vec::new();
        header(&mut raw, 2, 1, 1, (0, 0, 0));
        raw.extend_from_slice(&[70, 73]);

        let level = decode(&raw).unwrap();
        assert_eq!(level.world.blocks(), &[39, 10]);
    }

    #[test]
    fn conversion_covers_quads_and_remainder() {
        let mut blocks = [1, 2, 3, 4, 1, 70, 2, 3, 5, 73, 6];
        convert_physics_blocks(&mut blocks);
        assert_eq!(blocks, [1, 2, 3, 4, 1, 39, 2, 3, 5, 10, 6]);
    }

    #[test]
    fn conversion_is_identity_below_cpe_count() {
        for b in 0..BLOCK_CPE_COUNT {
            assert_eq!(CONVERSION[b], b as u8);
        }
        assert_eq!(CONVERSION[CUSTOM_TILE as usize], CUSTOM_TILE);
    }

    #[test]
    fn custom_block_overlay() {
        // 17 wide so the second chunk column is mostly out of bounds
        let (w, l, h) = (17u16, 1u16, 1u16);
        let mut raw = Vec::new();
        header(&mut raw, w, l, h, (0, 0, 0));
        let mut blocks = vec![1u8; 17];
        blocks[0] = CUSTOM_TILE;
        blocks[16] = CUSTOM_TILE;
        raw.extend_from_slice(&blocks);
        raw.push(CUSTOM_BLOCKS_MARKER);

        let mut chunk = [200u8; 4096];
        chunk[1] = 201;
        raw.push(1);
        raw.extend_from_slice(&chunk);
        chunk[0] = 202;
        raw.push(1);
        raw.extend_from_slice(&chunk);

        let level = decode(&raw).unwrap();
        let out = level.world.blocks();
        assert_eq!(out[0], 200);
        // not a placeholder, left alone
        assert_eq!(out[1], 1);
        assert_eq!(out[16], 202);
    }

    #[test]
    fn skipped_overlay_chunk() {
        let mut raw = Vec::new();
        header(&mut raw, 1, 1, 1, (0, 0, 0));
        raw.push(CUSTOM_TILE);
        raw.push(CUSTOM_BLOCKS_MARKER);
        raw.push(0);

        let level = decode(&raw).unwrap();
        assert_eq!(level.world.blocks(), &[CUSTOM_TILE]);
    }

    #[test]
    fn truncated_blocks_fail() {
        let mut raw = Vec::new();
        header(&mut raw, 4, 4, 4, (0, 0, 0));
        raw.extend_from_slice(&[0; 10]);
        assert!(decode(&raw).is_err());
    }
}
