//! Data-driven arena content and loaders.
//!
//! This crate turns files into the values the runtime consumes:
//! - Map layouts (plain text, one character per cell)
//! - Arena configuration (TOML)
//!
//! Content is read once at startup; nothing here is touched by entity tasks.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadedMap, MapLoader};
