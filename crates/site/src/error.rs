//! Unified error handling.
//!
//! Page actions never fail outward; problems inside a page session surface
//! as notifications. `SiteError` covers the paths that can fail before or
//! around a session: configuration, menu files and direct store access.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;
use crate::testimonials::RotatorError;

/// Application-level error type for the site engine.
#[derive(Debug, Error)]
pub enum SiteError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Testimonial selection failed.
    #[error("Testimonial error: {0}")]
    Rotator(#[from] RotatorError),

    /// A file outside the store could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON input was malformed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The page event loop is gone.
    #[error("Page closed")]
    PageClosed,
}

/// Result type alias for `SiteError`.
pub type Result<T> = std::result::Result<T, SiteError>;
