//! fCraft `.fcm` maps (revision 13).
//!
//! The header is stored uncompressed; metadata and blocks follow as a raw
//! deflate stream.

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use classic_rs_proto::compression::inflate;
use classic_rs_proto::types::{Vec3, FIXED_POINT_SCALE};
use tracing::debug;

use crate::error::FormatError;
use crate::formats::read_blocks;
use crate::level::{Level, LoadEvent, Spawn};
use crate::world::World;

pub const FCM_IDENTIFIER: u32 = 0x0FC2_AF40;
pub const FCM_REVISION: u8 = 13;

/// Creation and modification dates.
const DATES_LEN: usize = 8;
const LAYER_INDEX_LEN: usize = 26;

pub fn load(mut src: impl Read, events: &mut dyn FnMut(LoadEvent)) -> Result<Level, FormatError> {
    if src.read_u32::<LittleEndian>()? != FCM_IDENTIFIER {
        return Err(FormatError::BadMagic("fcm identifier"));
    }
    let revision = src.read_u8()?;
    if revision != FCM_REVISION {
        return Err(FormatError::BadRevision {
            got: revision,
            expected: FCM_REVISION,
        });
    }

    let width = src.read_u16::<LittleEndian>()?;
    let length = src.read_u16::<LittleEndian>()?;
    let height = src.read_u16::<LittleEndian>()?;

    let x = src.read_i32::<LittleEndian>()? as f32 / FIXED_POINT_SCALE;
    let y = src.read_i32::<LittleEndian>()? as f32 / FIXED_POINT_SCALE;
    let z = src.read_i16::<LittleEndian>()? as f32 / FIXED_POINT_SCALE;
    let yaw = src.read_u8()?;
    let pitch = src.read_u8()?;

    let mut dates = [0u8; DATES_LEN];
    src.read_exact(&mut dates)?;
    let mut uuid = [0u8; 16];
    src.read_exact(&mut uuid)?;
    let mut layers = [0u8; LAYER_INDEX_LEN];
    src.read_exact(&mut layers)?;
    let meta_count = src.read_u32::<LittleEndian>()?;

    let mut r = inflate(src);
    for _ in 0..meta_count {
        // group, key, value
        for _ in 0..3 {
            skip_string(&mut r)?;
        }
    }

    let volume = World::volume(width, height, length)?;
    let blocks = read_blocks(&mut r, volume, events)?;
    let world = World::new(width, height, length, blocks, uuid)?;

    debug!(width, height, length, meta_count, "Decoded fcm map");
    let mut level = Level::new(world);
    level.spawn = Spawn {
        pos: Vec3::new(x, y, z),
        yaw,
        pitch,
    };
    Ok(level)
}

fn skip_string(r: &mut impl Read) -> Result<(), FormatError> {
    let len = r.read_u16::<LittleEndian>()? as u64;
    let skipped = io::copy(&mut r.by_ref().take(len), &mut io::sink())?;
    if skipped < len {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(())
}
