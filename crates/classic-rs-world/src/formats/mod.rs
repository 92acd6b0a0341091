//! Map file formats.
//!
//! Readers: `.lvl` (MCSharp), `.fcm` (fCraft), `.cw` (ClassicWorld) and
//! `.dat`/`.mine` (Minecraft classic). Writers: `.cw` and `.schematic`.

pub mod cw;
pub mod dat;
pub mod fcm;
pub mod lvl;
pub mod schematic;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use classic_rs_proto::compression::read_with_progress;
use tracing::info;

use crate::error::FormatError;
use crate::level::{Level, LoadEvent, LoadOptions};

/// Bytes read between progress reports.
const PROGRESS_CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFormat {
    Lvl,
    Fcm,
    ClassicWorld,
    Dat,
    Schematic,
}

impl MapFormat {
    /// Picks a format from a file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "lvl" => Some(Self::Lvl),
            "fcm" => Some(Self::Fcm),
            "cw" => Some(Self::ClassicWorld),
            "dat" | "mine" => Some(Self::Dat),
            "schematic" => Some(Self::Schematic),
            _ => None,
        }
    }

    pub fn can_load(self) -> bool {
        !matches!(self, Self::Schematic)
    }

    pub fn can_save(self) -> bool {
        matches!(self, Self::ClassicWorld | Self::Schematic)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Lvl => "lvl",
            Self::Fcm => "fcm",
            Self::ClassicWorld => "cw",
            Self::Dat => "dat",
            Self::Schematic => "schematic",
        }
    }
}

fn format_of(path: &Path) -> Result<MapFormat, FormatError> {
    MapFormat::from_path(path)
        .ok_or_else(|| FormatError::UnsupportedFormat(path.display().to_string()))
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Decodes a map from `src`.
///
/// On failure nothing is returned and no events other than progress have
/// been delivered.
pub fn load_from(
    format: MapFormat,
    src: impl Read,
    opts: &LoadOptions,
    events: &mut dyn FnMut(LoadEvent),
) -> Result<Level, FormatError> {
    let level = match format {
        MapFormat::Lvl => lvl::load(src, events)?,
        MapFormat::Fcm => fcm::load(src, events)?,
        MapFormat::ClassicWorld => cw::load(src, opts, events)?,
        MapFormat::Dat => dat::load(src)?,
        MapFormat::Schematic => {
            return Err(FormatError::UnsupportedFormat(format!(
                "{} maps cannot be loaded",
                format.name()
            )))
        }
    };
    events(LoadEvent::Progress(1.0));
    info!(
        format = format.name(),
        width = level.world.width(),
        height = level.world.height(),
        length = level.world.length(),
        "Map loaded"
    );
    Ok(level)
}

/// Opens and decodes the map at `path`, choosing the format by extension.
pub fn load(
    path: &Path,
    opts: &LoadOptions,
    events: &mut dyn FnMut(LoadEvent),
) -> Result<Level, FormatError> {
    let format = format_of(path)?;
    if !format.can_load() {
        return Err(FormatError::UnsupportedFormat(format!(
            "{} maps cannot be loaded",
            format.name()
        )));
    }
    let file = File::open(path)?;
    load_from(format, BufReader::new(file), opts, events)
}

/// Reads a raw block array of `volume` bytes, reporting progress.
pub(crate) fn read_blocks(
    src: &mut impl Read,
    volume: usize,
    events: &mut dyn FnMut(LoadEvent),
) -> Result<Vec<u8>, FormatError> {
    let mut blocks = vec![0u8; volume];
    read_with_progress(src, &mut blocks, PROGRESS_CHUNK, |f| {
        events(LoadEvent::Progress(f))
    })?;
    Ok(blocks)
}

/// Reads one byte, or `None` at end of stream.
pub(crate) fn try_read_u8(src: &mut impl Read) -> Result<Option<u8>, FormatError> {
    let mut byte = [0u8; 1];
    loop {
        match src.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

pub fn save_to(format: MapFormat, level: &Level, dst: impl Write) -> Result<(), FormatError> {
    match format {
        MapFormat::ClassicWorld => cw::save(level, dst),
        MapFormat::Schematic => schematic::save(&level.world, dst),
        other => Err(FormatError::UnsupportedFormat(format!(
            "{} maps cannot be saved",
            other.name()
        ))),
    }
}

/// Writes `level` to `path`, choosing the format by extension.
pub fn save(path: &Path, level: &Level) -> Result<(), FormatError> {
    let format = format_of(path)?;
    if !format.can_save() {
        return Err(FormatError::UnsupportedFormat(format!(
            "{} maps cannot be saved",
            format.name()
        )));
    }
    let mut out = BufWriter::new(File::create(path)?);
    save_to(format, level, &mut out)?;
    out.flush()?;
    info!(path = %path.display(), format = format.name(), "Map saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn format_by_extension() {
        let f = |p: &str| MapFormat::from_path(&PathBuf::from(p));
        assert_eq!(f("maps/a.lvl"), Some(MapFormat::Lvl));
        assert_eq!(f("b.FCM"), Some(MapFormat::Fcm));
        assert_eq!(f("c.Cw"), Some(MapFormat::ClassicWorld));
        assert_eq!(f("level.mine"), Some(MapFormat::Dat));
        assert_eq!(f("level.dat"), Some(MapFormat::Dat));
        assert_eq!(f("x.schematic"), Some(MapFormat::Schematic));
        assert_eq!(f("x.txt"), None);
        assert_eq!(f("noext"), None);
    }

    #[test]
    fn schematic_is_write_only() {
        let mut events = |_e: LoadEvent| {};
        let err = load_from(
            MapFormat::Schematic,
            Cursor::new(Vec::new()),
            &LoadOptions::default(),
            &mut events,
        );
        assert!(matches!(err, Err(FormatError::UnsupportedFormat(_))));
        assert!(!MapFormat::Lvl.can_save());
        assert!(MapFormat::Schematic.can_save());
    }

    #[test]
    fn try_read_at_end() {
        let mut src = Cursor::new(vec![7u8]);
        assert_eq!(try_read_u8(&mut src).unwrap(), Some(7));
        assert_eq!(try_read_u8(&mut src).unwrap(), None);
    }

    #[test]
    fn block_progress_reaches_one() {
        let data = vec![1u8; PROGRESS_CHUNK * 2 + 10];
        let mut seen = Vec::new();
        let blocks = read_blocks(&mut Cursor::new(data.clone()), data.len(), &mut |e| {
            seen.push(e)
        })
        .unwrap();
        assert_eq!(blocks, data);
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.last(), Some(&LoadEvent::Progress(1.0)));
    }
}
