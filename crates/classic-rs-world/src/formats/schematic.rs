//! MCEdit `.schematic` export.

use std::io::Write;

use classic_rs_nbt::{NbtKind, NbtWriter};
use classic_rs_proto::compression::gzip_writer;

use crate::error::FormatError;
use crate::world::World;

/// Writes the block array with zeroed block data and no entities.
pub fn save(world: &World, dst: impl Write) -> Result<(), FormatError> {
    let mut w = NbtWriter::new(gzip_writer(dst));
    w.begin_compound("Schematic")?;
    w.write_string("Materials", "Classic")?;
    w.write_i16("Width", world.width() as i16)?;
    w.write_i16("Height", world.height() as i16)?;
    w.write_i16("Length", world.length() as i16)?;
    w.write_bytes("Blocks", world.blocks())?;
    w.write_bytes("Data", &vec![0u8; world.blocks().len()])?;
    w.begin_list("Entities", NbtKind::Compound, 0)?;
    w.begin_list("TileEntities", NbtKind::Compound, 0)?;
    w.end_compound()?;
    w.into_inner().finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use classic_rs_nbt::{read_nbt, NbtError};
    use classic_rs_proto::compression::gzip_reader;
    use std::io::Cursor;

    #[test]
    fn writes_expected_tags() {
        let mut world = World::empty(3, 2, 2).unwrap();
        world.set(2, 1, 1, 17);
        let mut out = Vec::new();
        save(&world, &mut out).unwrap();

        let mut seen = Vec::new();
        let mut blocks = Vec::new();
        let mut data = Vec::new();
        read_nbt(&mut gzip_reader(Cursor::new(out)).unwrap(), |tag| -> Result<bool, NbtError> {
            let name = tag.name().to_owned();
            seen.push((tag.depth(), tag.kind(), name.clone()));
            match name.as_str() {
                "Blocks" => blocks = tag.take_bytes()?,
                "Data" => data = tag.take_bytes()?,
                "Materials" => assert_eq!(tag.string()?, "Classic"),
                "Width" => assert_eq!(tag.int16()?, 3),
                "Height" => assert_eq!(tag.int16()?, 2),
                "Length" => assert_eq!(tag.int16()?, 2),
                _ => return Ok(false),
            }
            Ok(true)
        })
        .unwrap();

        assert_eq!(blocks, world.blocks());
        assert_eq!(data, vec![0; 12]);
        let names: Vec<&str> = seen.iter().map(|(_, _, n)| n.as_str()).collect();
        assert_eq!(
            names,
            [
                "Materials",
                "Width",
                "Height",
                "Length",
                "Blocks",
                "Data",
                "Entities",
                "TileEntities",
                "Schematic"
            ]
        );
        assert_eq!(seen[6].1, NbtKind::List);
        assert_eq!(seen[8].0, 0);
    }
}
