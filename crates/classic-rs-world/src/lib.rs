//! World management: the block grid, block definitions, environment, map
//! formats and generation.

pub mod block_registry;
pub mod env;
pub mod error;
pub mod flat_generator;
pub mod formats;
pub mod level;
pub mod world;

pub use block_registry::{BlockDefinition, BlockRegistry};
pub use env::{Environment, Rgb};
pub use error::FormatError;
pub use formats::MapFormat;
pub use level::{Level, LoadEvent, LoadOptions, Spawn};
pub use world::World;
