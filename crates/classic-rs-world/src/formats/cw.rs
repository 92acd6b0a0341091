//! ClassicWorld (`.cw`) maps: gzip-compressed NBT.
//!
//! Layout, by depth below the root compound:
//!
//! ```text
//! ClassicWorld
//! ├─ X Y Z UUID BlockArray          (1)
//! ├─ Spawn ─ X Y Z H P              (2)
//! └─ Metadata ─ CPE ─ <extension>   (3)
//!                     ├─ fields     (4)
//!                     └─ compounds ─ fields (5)
//! ```
//!
//! Tags arrive post-order, so a compound is seen after its children. Colour
//! and block-definition fields are collected into cursor state and applied
//! when their compound closes.

use std::io::{Read, Write};

use classic_rs_nbt::{read_nbt, NbtTag, NbtWriter};
use classic_rs_proto::compression::{gzip_reader, gzip_writer};
use classic_rs_proto::types::Vec3;
use tracing::{debug, trace};

use crate::block_registry::{draw, BlockDefinition, BlockRegistry};
use crate::env::{
    Environment, Rgb, DEFAULT_CLOUD, DEFAULT_FOG, DEFAULT_SHADOW, DEFAULT_SKY, DEFAULT_SUNLIGHT,
};
use crate::error::FormatError;
use crate::level::{Level, LoadEvent, LoadOptions, Spawn, DEFAULT_REACH_DISTANCE};
use crate::world::{random_uuid, World};

const FORMAT_VERSION: u8 = 1;
const EXTENSION_VERSION: i32 = 1;
/// Spawn coordinates of older writers were scaled by this.
const LEGACY_SPAWN_SCALE: f32 = 32.0;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

struct CwReader<'a> {
    opts: &'a LoadOptions,
    width: u16,
    height: u16,
    length: u16,
    uuid: Option<[u8; 16]>,
    blocks: Option<Vec<u8>>,
    spawn: Spawn,
    env: Environment,
    edge_height_set: bool,
    registry: BlockRegistry,
    reach_distance: f32,
    cur_id: u8,
    colour: (i16, i16, i16),
    /// Delivered only once the whole map decoded.
    pending: Vec<LoadEvent>,
}

impl<'a> CwReader<'a> {
    fn new(opts: &'a LoadOptions) -> Self {
        Self {
            opts,
            width: 0,
            height: 0,
            length: 0,
            uuid: None,
            blocks: None,
            spawn: Spawn::default(),
            env: Environment::new(0),
            edge_height_set: false,
            registry: BlockRegistry::new(),
            reach_distance: DEFAULT_REACH_DISTANCE,
            cur_id: 0,
            colour: (0, 0, 0),
            pending: Vec::new(),
        }
    }

    fn visit(&mut self, tag: &mut NbtTag<'_>) -> Result<bool, FormatError> {
        match tag.depth() {
            1 => self.visit_root_field(tag),
            2 => self.visit_spawn_field(tag),
            4 => self.visit_extension_field(tag),
            5 => self.visit_extension_compound_field(tag),
            _ => Ok(false),
        }
    }

    fn visit_root_field(&mut self, tag: &mut NbtTag<'_>) -> Result<bool, FormatError> {
        if tag.is("X") {
            self.width = tag.int16()? as u16;
        } else if tag.is("Y") {
            self.height = tag.int16()? as u16;
        } else if tag.is("Z") {
            self.length = tag.int16()? as u16;
        } else if tag.is("UUID") {
            let bytes = tag.bytes()?;
            let uuid: [u8; 16] = bytes
                .try_into()
                .map_err(|_| FormatError::BadUuid(bytes.len()))?;
            self.uuid = Some(uuid);
        } else if tag.is("BlockArray") {
            self.blocks = Some(tag.take_bytes()?);
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    fn visit_spawn_field(&mut self, tag: &NbtTag<'_>) -> Result<bool, FormatError> {
        if !tag.parent().is_some_and(|p| p.is("Spawn")) {
            return Ok(false);
        }
        let spawn = &mut self.spawn;
        if tag.is("X") {
            spawn.pos.x = tag.int16()? as f32;
        } else if tag.is("Y") {
            spawn.pos.y = tag.int16()? as f32;
        } else if tag.is("Z") {
            spawn.pos.z = tag.int16()? as f32;
        } else if tag.is("H") {
            spawn.yaw = tag.uint8()?;
        } else if tag.is("P") {
            spawn.pitch = tag.uint8()?;
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    /// Fields directly inside a CPE extension compound.
    fn visit_extension_field(&mut self, tag: &NbtTag<'_>) -> Result<bool, FormatError> {
        if !in_cpe_metadata(tag, 2) {
            return Ok(false);
        }
        let Some(ext) = tag.parent() else {
            return Ok(false);
        };

        if ext.is("ClickDistance") && tag.is("Distance") {
            self.reach_distance = tag.int16()? as f32 / 32.0;
            return Ok(true);
        }
        if ext.is("EnvWeatherType") && tag.is("WeatherType") {
            self.env.weather = tag.uint8()?;
            return Ok(true);
        }

        if ext.is("EnvMapAppearance") {
            if tag.is("SideBlock") {
                self.env.side_block = tag.uint8()?;
            } else if tag.is("EdgeBlock") {
                self.env.edge_block = tag.uint8()?;
            } else if tag.is("SideLevel") {
                self.env.edge_height = tag.int16()?;
                self.edge_height_set = true;
            } else if tag.is("TextureURL") {
                let url = tag.string()?;
                if self.opts.allow_server_textures && !url.is_empty() {
                    self.pending.push(LoadEvent::TexturePack(url.to_owned()));
                }
                self.env.texture_url = url.to_owned();
            } else {
                return Ok(false);
            }
            return Ok(true);
        }

        if ext.is("EnvColors") {
            let (target, default) = if tag.is("Sky") {
                (&mut self.env.sky, DEFAULT_SKY)
            } else if tag.is("Cloud") {
                (&mut self.env.cloud, DEFAULT_CLOUD)
            } else if tag.is("Fog") {
                (&mut self.env.fog, DEFAULT_FOG)
            } else if tag.is("Sunlight") {
                (&mut self.env.sunlight, DEFAULT_SUNLIGHT)
            } else if tag.is("Ambient") {
                (&mut self.env.shadow, DEFAULT_SHADOW)
            } else {
                return Ok(false);
            };
            let (r, g, b) = self.colour;
            *target = Rgb::checked(r, g, b).unwrap_or(default);
            return Ok(true);
        }

        if ext.is("BlockDefinitions") {
            if !starts_with_ignore_case(tag.name(), "Block") {
                return Ok(false);
            }
            if self.opts.allow_custom_blocks {
                self.finish_block_definition();
            }
            self.cur_id = 0;
            return Ok(true);
        }
        Ok(false)
    }

    fn finish_block_definition(&mut self) {
        let id = self.cur_id;
        let def = self.registry.get_mut(id);
        // Shape is 0 for sprites, whose BlockDraw then holds the sprite offset.
        if def.sprite_offset == 0 {
            def.sprite_offset = def.draw;
            def.draw = draw::SPRITE;
        } else {
            def.sprite_offset = 0;
        }
        self.registry.define_custom(id);
        self.registry.set_permissions(id, true, true);
        if !self.pending.contains(&LoadEvent::PermissionsChanged) {
            self.pending.push(LoadEvent::PermissionsChanged);
        }
        trace!(id, "Defined custom block");
    }

    /// Fields of a compound nested in a CPE extension.
    fn visit_extension_compound_field(&mut self, tag: &NbtTag<'_>) -> Result<bool, FormatError> {
        if !in_cpe_metadata(tag, 3) {
            return Ok(false);
        }
        let Some(ext) = tag.ancestor(2) else {
            return Ok(false);
        };

        if ext.is("EnvColors") {
            if tag.is("R") {
                self.colour.0 = tag.int16()?;
            } else if tag.is("G") {
                self.colour.1 = tag.int16()?;
            } else if tag.is("B") {
                self.colour.2 = tag.int16()?;
            } else {
                return Ok(false);
            }
            return Ok(true);
        }

        if ext.is("BlockDefinitions") && self.opts.allow_custom_blocks {
            if tag.is("ID") {
                self.cur_id = tag.uint8()?;
                return Ok(true);
            }
            let def = self.registry.get_mut(self.cur_id);
            return read_block_field(def, tag);
        }
        Ok(false)
    }

    fn finish(mut self) -> Result<(Level, Vec<LoadEvent>), FormatError> {
        let blocks = self.blocks.take().ok_or(FormatError::MissingBlocks)?;
        let uuid = self.uuid.unwrap_or_else(random_uuid);
        let world = World::new(self.width, self.height, self.length, blocks, uuid)?;

        if !self.edge_height_set {
            self.env.edge_height = (self.height / 2) as i16;
        }
        let mut level = Level::new(world);
        level.spawn = self.spawn;
        level.env = self.env;
        level.blocks = self.registry;
        level.reach_distance = self.reach_distance;

        if !level.spawn_in_bounds() {
            debug!(spawn = ?level.spawn.pos, "Spawn outside map, assuming legacy scale");
            level.spawn.pos = level.spawn.pos / LEGACY_SPAWN_SCALE;
        }
        Ok((level, self.pending))
    }
}

fn read_block_field(def: &mut BlockDefinition, tag: &NbtTag<'_>) -> Result<bool, FormatError> {
    if tag.is("CollideType") {
        def.collide = tag.uint8()?;
    } else if tag.is("Speed") {
        def.speed = tag.float32()?;
    } else if tag.is("TransmitsLight") {
        def.blocks_light = tag.uint8()? == 0;
    } else if tag.is("FullBright") {
        def.full_bright = tag.uint8()? != 0;
    } else if tag.is("BlockDraw") {
        def.draw = tag.uint8()?;
    } else if tag.is("Shape") {
        def.sprite_offset = tag.uint8()?;
    } else if tag.is("Name") {
        def.name = tag.string()?.to_owned();
    } else if tag.is("Textures") {
        for (face, tex) in def.textures.iter_mut().enumerate() {
            *tex = tag.byte_at(face)?;
        }
    } else if tag.is("WalkSound") {
        def.set_walk_sound(tag.uint8()?);
    } else if tag.is("Fog") {
        def.fog_density = match tag.byte_at(0)? {
            // 0xFF comes from older writers and means no fog
            0 | 0xFF => 0.0,
            b => (b as f32 + 1.0) / 128.0,
        };
        def.fog_color = Rgb::new(tag.byte_at(1)?, tag.byte_at(2)?, tag.byte_at(3)?);
    } else if tag.is("Coords") {
        let c = |i| -> Result<f32, FormatError> { Ok(tag.byte_at(i)? as f32 / 16.0) };
        def.min_bb = Vec3::new(c(0)?, c(1)?, c(2)?);
        def.max_bb = Vec3::new(c(3)?, c(4)?, c(5)?);
    } else {
        return Ok(false);
    }
    Ok(true)
}

/// Whether the tag `cpe_up` levels above `tag` is `CPE`, itself directly
/// inside `Metadata`.
fn in_cpe_metadata(tag: &NbtTag<'_>, cpe_up: usize) -> bool {
    tag.ancestor(cpe_up).is_some_and(|t| t.is("CPE"))
        && tag.ancestor(cpe_up + 1).is_some_and(|t| t.is("Metadata"))
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Decodes a ClassicWorld map. Permission and texture pack events are only
/// delivered if decoding succeeds.
pub fn load(
    src: impl Read,
    opts: &LoadOptions,
    events: &mut dyn FnMut(LoadEvent),
) -> Result<Level, FormatError> {
    let mut r = gzip_reader(src)?;
    let mut reader = CwReader::new(opts);
    read_nbt(&mut r, |tag| reader.visit(tag))?;

    let (level, pending) = reader.finish()?;
    for event in pending {
        events(event);
    }
    Ok(level)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes `level` as a gzip-compressed ClassicWorld map.
pub fn save(level: &Level, dst: impl Write) -> Result<(), FormatError> {
    let mut w = NbtWriter::new(gzip_writer(dst));
    write_level(&mut w, level)?;
    w.into_inner().finish()?;
    Ok(())
}

fn write_level<W: Write>(w: &mut NbtWriter<W>, level: &Level) -> Result<(), FormatError> {
    let world = &level.world;
    w.begin_compound("ClassicWorld")?;
    w.write_u8("FormatVersion", FORMAT_VERSION)?;
    w.write_bytes("UUID", world.uuid())?;
    w.write_i16("X", world.width() as i16)?;
    w.write_i16("Y", world.height() as i16)?;
    w.write_i16("Z", world.length() as i16)?;

    let spawn = &level.spawn;
    w.begin_compound("Spawn")?;
    w.write_i16("X", spawn.pos.x as i16)?;
    w.write_i16("Y", spawn.pos.y as i16)?;
    w.write_i16("Z", spawn.pos.z as i16)?;
    w.write_u8("H", spawn.yaw)?;
    w.write_u8("P", spawn.pitch)?;
    w.end_compound()?;

    w.write_bytes("BlockArray", world.blocks())?;

    w.begin_compound("Metadata")?;
    w.begin_compound("CPE")?;
    write_extensions(w, level)?;
    w.end_compound()?;
    w.end_compound()?;

    w.end_compound()?;
    Ok(())
}

fn write_extensions<W: Write>(w: &mut NbtWriter<W>, level: &Level) -> Result<(), FormatError> {
    let env = &level.env;

    w.begin_compound("ClickDistance")?;
    w.write_i32("ExtensionVersion", EXTENSION_VERSION)?;
    w.write_i16("Distance", (level.reach_distance * 32.0) as i16)?;
    w.end_compound()?;

    w.begin_compound("EnvWeatherType")?;
    w.write_i32("ExtensionVersion", EXTENSION_VERSION)?;
    w.write_u8("WeatherType", env.weather)?;
    w.end_compound()?;

    w.begin_compound("EnvMapAppearance")?;
    w.write_i32("ExtensionVersion", EXTENSION_VERSION)?;
    w.write_u8("SideBlock", env.side_block)?;
    w.write_u8("EdgeBlock", env.edge_block)?;
    w.write_i16("SideLevel", env.edge_height)?;
    w.write_string("TextureURL", &env.texture_url)?;
    w.end_compound()?;

    w.begin_compound("EnvColors")?;
    w.write_i32("ExtensionVersion", EXTENSION_VERSION)?;
    write_colour(w, "Sky", env.sky)?;
    write_colour(w, "Cloud", env.cloud)?;
    write_colour(w, "Fog", env.fog)?;
    write_colour(w, "Ambient", env.shadow)?;
    write_colour(w, "Sunlight", env.sunlight)?;
    w.end_compound()?;

    w.begin_compound("BlockDefinitions")?;
    w.write_i32("ExtensionVersion", EXTENSION_VERSION)?;
    for id in level.blocks.custom_ids() {
        write_block_definition(w, id, level.blocks.get(id))?;
    }
    w.end_compound()?;
    Ok(())
}

fn write_colour<W: Write>(w: &mut NbtWriter<W>, name: &str, c: Rgb) -> Result<(), FormatError> {
    w.begin_compound(name)?;
    w.write_i16("R", c.r as i16)?;
    w.write_i16("G", c.g as i16)?;
    w.write_i16("B", c.b as i16)?;
    w.end_compound()?;
    Ok(())
}

fn write_block_definition<W: Write>(
    w: &mut NbtWriter<W>,
    id: u8,
    def: &BlockDefinition,
) -> Result<(), FormatError> {
    let sprite = def.draw == draw::SPRITE;

    w.begin_compound(&format!("Block{id}"))?;
    w.write_u8("ID", id)?;
    w.write_string("Name", &def.name)?;
    w.write_u8("CollideType", def.collide)?;
    w.write_f32("Speed", def.speed)?;
    w.write_bytes("Textures", &def.textures)?;

    w.write_u8("TransmitsLight", u8::from(!def.blocks_light))?;
    w.write_u8("WalkSound", def.dig_sound)?;
    w.write_u8("FullBright", u8::from(def.full_bright))?;
    w.write_u8("Shape", if sprite { 0 } else { (def.max_bb.y * 16.0) as u8 })?;
    w.write_u8("BlockDraw", if sprite { def.sprite_offset } else { def.draw })?;

    let density = if def.fog_density == 0.0 {
        0
    } else {
        (def.fog_density * 128.0 - 1.0) as u8
    };
    let c = def.fog_color;
    w.write_bytes("Fog", &[density, c.r, c.g, c.b])?;

    let (min, max) = (def.min_bb, def.max_bb);
    let coords = [min.x, min.y, min.z, max.x, max.y, max.z].map(|f| (f * 16.0) as u8);
    w.write_bytes("Coords", &coords)?;
    w.end_compound()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_registry::{collide, sound};
    use byteorder::{BigEndian, WriteBytesExt};
    use classic_rs_nbt::NbtKind;
    use std::io::Cursor;

    fn sample_level() -> Level {
        let mut world = World::empty(8, 6, 4).unwrap();
        world.set(1, 2, 3, 45);
        world.set(7, 5, 0, 200);
        let mut level = Level::new(world);
        level.spawn = Spawn {
            pos: Vec3::new(3.0, 4.0, 2.0),
            yaw: 64,
            pitch: 200,
        };
        level.reach_distance = 7.5;
        level.env.weather = 2;
        level.env.sky = Rgb::new(1, 2, 3);
        level.env.shadow = Rgb::new(40, 50, 60);
        level.env.edge_height = -2;
        level.env.side_block = 12;

        let solid = level.blocks.get_mut(200);
        solid.name = "Marble".into();
        solid.collide = collide::SOLID;
        solid.speed = 1.5;
        solid.textures = [1, 2, 3, 4, 5, 6];
        solid.blocks_light = false;
        solid.full_bright = true;
        solid.draw = draw::TRANSLUCENT;
        solid.set_walk_sound(sound::GLASS);
        solid.fog_density = 10.0 / 128.0;
        solid.fog_color = Rgb::new(9, 8, 7);
        solid.min_bb = Vec3::new(0.0, 0.0, 0.125);
        solid.max_bb = Vec3::new(1.0, 0.5, 1.0);
        level.blocks.define_custom(200);

        let flower = level.blocks.get_mut(70);
        flower.name = "Rose".into();
        flower.collide = collide::GAS;
        flower.draw = draw::SPRITE;
        flower.sprite_offset = 3;
        level.blocks.define_custom(70);
        level
    }

    fn encode(level: &Level) -> Vec<u8> {
        let mut out = Vec::new();
        save(level, &mut out).unwrap();
        out
    }

    #[test]
    fn roundtrip() {
        let level = sample_level();
        let mut events = Vec::new();
        let back = load(
            Cursor::new(encode(&level)),
            &LoadOptions::default(),
            &mut |e| events.push(e),
        )
        .unwrap();

        assert_eq!(back.world, level.world);
        assert_eq!(back.spawn, level.spawn);
        assert_eq!(back.reach_distance, 7.5);
        assert_eq!(back.env, level.env);
        for id in [70, 200] {
            assert!(back.blocks.is_custom_defined(id));
            assert!(back.blocks.can_place(id) && back.blocks.can_delete(id));
            assert_eq!(back.blocks.get(id), level.blocks.get(id), "block {id}");
        }
        assert!(!back.blocks.is_custom_defined(1));
        assert_eq!(events, vec![LoadEvent::PermissionsChanged]);
    }

    #[test]
    fn custom_blocks_can_be_ignored() {
        let opts = LoadOptions {
            allow_custom_blocks: false,
            allow_server_textures: true,
        };
        let mut events = Vec::new();
        let back = load(Cursor::new(encode(&sample_level())), &opts, &mut |e| {
            events.push(e)
        })
        .unwrap();
        assert!(!back.blocks.is_custom_defined(200));
        assert_eq!(back.blocks.get(200), &BlockDefinition::default());
        assert!(events.is_empty());
    }

    #[test]
    fn texture_url_requests_pack() {
        let mut level = sample_level();
        level.env.texture_url = "http://example.com/t.zip".into();
        let bytes = encode(&level);

        let mut events = Vec::new();
        load(Cursor::new(bytes.clone()), &LoadOptions::default(), &mut |e| {
            events.push(e)
        })
        .unwrap();
        assert!(events.contains(&LoadEvent::TexturePack("http://example.com/t.zip".into())));

        let opts = LoadOptions {
            allow_custom_blocks: true,
            allow_server_textures: false,
        };
        events.clear();
        load(Cursor::new(bytes), &opts, &mut |e| events.push(e)).unwrap();
        assert_eq!(events, vec![LoadEvent::PermissionsChanged]);
    }

    fn gzip_nbt(build: impl FnOnce(&mut NbtWriter<Vec<u8>>)) -> Vec<u8> {
        let mut w = NbtWriter::new(Vec::new());
        build(&mut w);
        let mut gz = gzip_writer(Vec::new());
        gz.write_all(&w.into_inner()).unwrap();
        gz.finish().unwrap()
    }

    fn minimal(w: &mut NbtWriter<Vec<u8>>, spawn: (i16, i16, i16)) {
        w.write_i16("X", 2).unwrap();
        w.write_i16("Y", 2).unwrap();
        w.write_i16("Z", 2).unwrap();
        w.write_bytes("BlockArray", &[1; 8]).unwrap();
        w.begin_compound("Spawn").unwrap();
        w.write_i16("X", spawn.0).unwrap();
        w.write_i16("Y", spawn.1).unwrap();
        w.write_i16("Z", spawn.2).unwrap();
        w.end_compound().unwrap();
    }

    fn decode(bytes: Vec<u8>) -> Result<Level, FormatError> {
        load(Cursor::new(bytes), &LoadOptions::default(), &mut |_| {})
    }

    #[test]
    fn legacy_spawn_is_rescaled() {
        let bytes = gzip_nbt(|w| {
            w.begin_compound("ClassicWorld").unwrap();
            minimal(w, (32, 48, 16));
            w.end_compound().unwrap();
        });
        let level = decode(bytes).unwrap();
        assert_eq!(level.spawn.pos, Vec3::new(1.0, 1.5, 0.5));
        // no UUID tag, so a random one is assigned
        assert_ne!(level.world.uuid(), &[0u8; 16]);
        assert_eq!(level.env.edge_height, 1);
    }

    #[test]
    fn out_of_range_colour_uses_default() {
        let bytes = gzip_nbt(|w| {
            w.begin_compound("ClassicWorld").unwrap();
            minimal(w, (0, 0, 0));
            w.begin_compound("Metadata").unwrap();
            w.begin_compound("CPE").unwrap();
            w.begin_compound("EnvColors").unwrap();
            w.begin_compound("Sky").unwrap();
            w.write_i16("R", 300).unwrap();
            w.write_i16("G", 0).unwrap();
            w.write_i16("B", 0).unwrap();
            w.end_compound().unwrap();
            w.begin_compound("Cloud").unwrap();
            w.write_i16("R", 10).unwrap();
            w.write_i16("G", 20).unwrap();
            w.write_i16("B", 30).unwrap();
            w.end_compound().unwrap();
            w.end_compound().unwrap();
            w.end_compound().unwrap();
            w.end_compound().unwrap();
            w.end_compound().unwrap();
        });
        let level = decode(bytes).unwrap();
        assert_eq!(level.env.sky, DEFAULT_SKY);
        assert_eq!(level.env.cloud, Rgb::new(10, 20, 30));
    }

    #[test]
    fn legacy_fog_density() {
        let bytes = gzip_nbt(|w| {
            w.begin_compound("ClassicWorld").unwrap();
            minimal(w, (0, 0, 0));
            w.begin_compound("Metadata").unwrap();
            w.begin_compound("CPE").unwrap();
            w.begin_compound("BlockDefinitions").unwrap();
            for (id, fog) in [(80u8, 0xFFu8), (81, 0), (82, 63)] {
                w.begin_compound(&format!("Block{id}")).unwrap();
                w.write_u8("ID", id).unwrap();
                w.write_u8("Shape", 16).unwrap();
                w.write_bytes("Fog", &[fog, 1, 2, 3]).unwrap();
                w.end_compound().unwrap();
            }
            w.end_compound().unwrap();
            w.end_compound().unwrap();
            w.end_compound().unwrap();
            w.end_compound().unwrap();
        });
        let level = decode(bytes).unwrap();
        assert_eq!(level.blocks.get(80).fog_density, 0.0);
        assert_eq!(level.blocks.get(81).fog_density, 0.0);
        assert_eq!(level.blocks.get(82).fog_density, 0.5);
        assert_eq!(level.blocks.get(82).fog_color, Rgb::new(1, 2, 3));
    }

    #[test]
    fn root_list_is_rejected() {
        let mut raw = vec![NbtKind::List as u8];
        raw.write_u16::<BigEndian>(0).unwrap();
        raw.write_u8(NbtKind::Int8 as u8).unwrap();
        raw.write_u32::<BigEndian>(0).unwrap();
        let mut gz = gzip_writer(Vec::new());
        gz.write_all(&raw).unwrap();

        let err = decode(gz.finish().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Nbt(classic_rs_nbt::NbtError::ExpectedCompound { got: 9 })
        ));
    }

    #[test]
    fn missing_block_array() {
        let bytes = gzip_nbt(|w| {
            w.begin_compound("ClassicWorld").unwrap();
            w.write_i16("X", 1).unwrap();
            w.end_compound().unwrap();
        });
        assert!(matches!(decode(bytes), Err(FormatError::MissingBlocks)));
    }

    #[test]
    fn bad_uuid_length() {
        let bytes = gzip_nbt(|w| {
            w.begin_compound("ClassicWorld").unwrap();
            w.write_bytes("UUID", &[0; 4]).unwrap();
            w.end_compound().unwrap();
        });
        assert!(matches!(decode(bytes), Err(FormatError::BadUuid(4))));
    }
}
