//! Minecraft classic `.dat` / `.mine` maps: a gzip-compressed Java
//! serialization stream holding one `Level` object.

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use classic_rs_nbt::java::{read_root_object, JavaField};
use classic_rs_proto::compression::gzip_reader;
use classic_rs_proto::types::Vec3;
use tracing::{debug, trace};

use crate::error::FormatError;
use crate::level::Level;
use crate::world::{random_uuid, World};

pub const DAT_MAGIC: i32 = 0x271B_B788;
pub const DAT_VERSION: u8 = 0x02;

#[derive(Default)]
struct DatFields {
    width: i32,
    height: i32,
    length: i32,
    blocks: Option<Vec<u8>>,
    spawn: [i32; 3],
}

impl DatFields {
    fn apply(&mut self, field: &mut JavaField) -> Result<(), FormatError> {
        // "height" is the horizontal extent here, "depth" the vertical one
        if field.is("width") {
            self.width = field.int32()?;
        } else if field.is("height") {
            self.length = field.int32()?;
        } else if field.is("depth") {
            self.height = field.int32()?;
        } else if field.is("blocks") {
            self.blocks = Some(field.take_bytes()?);
        } else if field.is("xSpawn") {
            self.spawn[0] = field.int32()?;
        } else if field.is("ySpawn") {
            self.spawn[1] = field.int32()?;
        } else if field.is("zSpawn") {
            self.spawn[2] = field.int32()?;
        } else {
            trace!(name = %field.name, "Ignoring level field");
        }
        Ok(())
    }

    fn dimensions(&self) -> Result<(u16, u16, u16), FormatError> {
        let invalid = || FormatError::InvalidDimensions {
            width: self.width as i64,
            height: self.height as i64,
            length: self.length as i64,
        };
        Ok((
            u16::try_from(self.width).map_err(|_| invalid())?,
            u16::try_from(self.height).map_err(|_| invalid())?,
            u16::try_from(self.length).map_err(|_| invalid())?,
        ))
    }
}

pub fn load(src: impl Read) -> Result<Level, FormatError> {
    let mut r = gzip_reader(src)?;
    if r.read_i32::<BigEndian>()? != DAT_MAGIC {
        return Err(FormatError::BadMagic("dat header"));
    }
    let version = r.read_u8()?;
    if version != DAT_VERSION {
        return Err(FormatError::BadRevision {
            got: version,
            expected: DAT_VERSION,
        });
    }

    let mut desc = read_root_object(&mut r)?;
    debug!(class = %desc.name, fields = desc.fields.len(), "Read dat root object");

    let mut fields = DatFields::default();
    for field in &mut desc.fields {
        fields.apply(field)?;
    }

    let (width, height, length) = fields.dimensions()?;
    let blocks = fields.blocks.take().ok_or(FormatError::MissingBlocks)?;
    let world = World::new(width, height, length, blocks, random_uuid())?;

    let mut level = Level::new(world);
    let [x, y, z] = fields.spawn;
    level.spawn.pos = Vec3::new(x as f32, y as f32, z as f32);
    Ok(level)
}
