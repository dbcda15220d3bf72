//! Core types for Roastery.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod notice;
pub mod price;
pub mod theme;

pub use email::{Email, EmailError};
pub use id::*;
pub use notice::NotificationKind;
pub use price::{Price, PriceError, PricePolicy, format_amount, round_to_cents};
pub use theme::{Theme, ThemeParseError};
