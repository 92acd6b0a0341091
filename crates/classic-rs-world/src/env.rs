//! Environment settings of a map: colours, weather and edge blocks.

use crate::block_registry::{BLOCK_BEDROCK, BLOCK_WATER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Builds a colour from wide components, or `None` if any is outside `0..=255`.
    pub fn checked(r: i16, g: i16, b: i16) -> Option<Self> {
        Some(Self::new(
            u8::try_from(r).ok()?,
            u8::try_from(g).ok()?,
            u8::try_from(b).ok()?,
        ))
    }
}

pub const DEFAULT_SKY: Rgb = Rgb::from_hex(0x99CCFF);
pub const DEFAULT_CLOUD: Rgb = Rgb::from_hex(0xFFFFFF);
pub const DEFAULT_FOG: Rgb = Rgb::from_hex(0xFFFFFF);
pub const DEFAULT_SUNLIGHT: Rgb = Rgb::from_hex(0xFFFFFF);
pub const DEFAULT_SHADOW: Rgb = Rgb::from_hex(0x9B9B9B);

pub mod weather {
    pub const SUNNY: u8 = 0;
    pub const RAINY: u8 = 1;
    pub const SNOWY: u8 = 2;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub sky: Rgb,
    pub cloud: Rgb,
    pub fog: Rgb,
    pub sunlight: Rgb,
    pub shadow: Rgb,
    pub weather: u8,
    pub weather_speed: f32,
    pub weather_fade: f32,
    pub edge_block: u8,
    pub side_block: u8,
    pub edge_height: i16,
    pub texture_url: String,
}

impl Environment {
    /// Defaults for a map of the given height.
    pub fn new(height: u16) -> Self {
        Self {
            sky: DEFAULT_SKY,
            cloud: DEFAULT_CLOUD,
            fog: DEFAULT_FOG,
            sunlight: DEFAULT_SUNLIGHT,
            shadow: DEFAULT_SHADOW,
            weather: weather::SUNNY,
            weather_speed: 1.0,
            weather_fade: 1.0,
            edge_block: BLOCK_WATER,
            side_block: BLOCK_BEDROCK,
            edge_height: (height / 2) as i16,
            texture_url: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let env = Environment::new(64);
        assert_eq!(env.sky, Rgb::new(0x99, 0xCC, 0xFF));
        assert_eq!(env.shadow, Rgb::new(0x9B, 0x9B, 0x9B));
        assert_eq!(env.edge_block, 8);
        assert_eq!(env.side_block, 7);
        assert_eq!(env.edge_height, 32);
    }

    #[test]
    fn checked_colour() {
        assert_eq!(Rgb::checked(1, 2, 3), Some(Rgb::new(1, 2, 3)));
        assert_eq!(Rgb::checked(256, 0, 0), None);
        assert_eq!(Rgb::checked(0, -1, 0), None);
    }
}
