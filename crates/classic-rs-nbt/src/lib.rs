//! NBT (Named Binary Tag) reading and writing for classic map files.
//!
//! - [`read_nbt`]: streaming big-endian reader delivering tags post-order to a callback.
//! - [`NbtWriter`]: sequential big-endian writer.
//! - [`java`]: the Java serialization subset used by `.dat` maps.

pub mod error;
mod io;
pub mod java;
pub mod tag;

pub use error::NbtError;
pub use io::{read_nbt, read_string, NbtWriter, MAX_STRING_BYTES, MAX_STRING_CHARS};
pub use tag::{NbtBytes, NbtKind, NbtTag, NbtValue, SMALL_SIZE};
