//! Roastery Core - Shared types library.
//!
//! This crate provides common types used across all Roastery components:
//! - `site` - Headless page engine (cart, theme, testimonials, newsletter)
//! - `cli` - Command-line tools for inspecting and editing persisted state
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no timers,
//! no storage access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for prices, emails, themes, and ids

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
