//! The block grid of a loaded map.

use rand::RngCore;

use crate::error::FormatError;

/// A map's dimensions, blocks and identity.
///
/// Blocks are stored one byte per cell at `x + z * width + y * width * length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    width: u16,
    height: u16,
    length: u16,
    blocks: Vec<u8>,
    uuid: [u8; 16],
}

impl World {
    /// Number of cells for the given dimensions, failing if it does not fit a 32-bit count.
    pub fn volume(width: u16, height: u16, length: u16) -> Result<usize, FormatError> {
        (width as u32)
            .checked_mul(height as u32)
            .and_then(|v| v.checked_mul(length as u32))
            .map(|v| v as usize)
            .ok_or(FormatError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
                length: length as i64,
            })
    }

    /// Takes ownership of `blocks`, which must hold exactly one byte per cell.
    pub fn new(
        width: u16,
        height: u16,
        length: u16,
        blocks: Vec<u8>,
        uuid: [u8; 16],
    ) -> Result<Self, FormatError> {
        let expected = Self::volume(width, height, length)?;
        if blocks.len() != expected {
            return Err(FormatError::BlockCountMismatch {
                expected,
                got: blocks.len(),
            });
        }
        Ok(Self {
            width,
            height,
            length,
            blocks,
            uuid,
        })
    }

    /// An all-air world with a random UUID.
    pub fn empty(width: u16, height: u16, length: u16) -> Result<Self, FormatError> {
        let volume = Self::volume(width, height, length)?;
        Self::new(width, height, length, vec![0; volume], random_uuid())
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn uuid(&self) -> &[u8; 16] {
        &self.uuid
    }

    pub fn blocks(&self) -> &[u8] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [u8] {
        &mut self.blocks
    }

    pub fn into_blocks(self) -> Vec<u8> {
        self.blocks
    }

    pub fn is_valid_pos(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && x < self.width as i32
            && y < self.height as i32
            && z < self.length as i32
    }

    /// Index of a cell. Coordinates must be in bounds.
    pub fn pack(&self, x: usize, y: usize, z: usize) -> usize {
        x + z * self.width as usize + y * self.width as usize * self.length as usize
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<u8> {
        if !self.is_valid_pos(x, y, z) {
            return None;
        }
        Some(self.blocks[self.pack(x as usize, y as usize, z as usize)])
    }

    /// Sets a block, returning the previous one; `None` if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: u8) -> Option<u8> {
        if !self.is_valid_pos(x, y, z) {
            return None;
        }
        let idx = self.pack(x as usize, y as usize, z as usize);
        Some(std::mem::replace(&mut self.blocks[idx], block))
    }
}

pub fn random_uuid() -> [u8; 16] {
    let mut uuid = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut uuid);
    // version 4, variant 1
    uuid[6] = (uuid[6] & 0x0F) | 0x40;
    uuid[8] = (uuid[8] & 0x3F) | 0x80;
    uuid
}
