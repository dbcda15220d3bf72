//! Subcommand implementations.
//!
//! Each command works against any [`roastery_site::store::KeyValueStore`],
//! so the binary runs them on the configured file store and tests run them
//! in memory.

pub mod cart;
pub mod email;
pub mod menu;
pub mod theme;
