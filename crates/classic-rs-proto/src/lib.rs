//! Minecraft Classic protocol types, text encoding and stream adapters.

pub mod codec;
pub mod compression;
pub mod cp437;
pub mod error;
pub mod packets;
pub mod types;
