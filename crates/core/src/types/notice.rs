//! Notification kinds.

use serde::{Deserialize, Serialize};

/// Severity of a transient on-page notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Error,
}

impl NotificationKind {
    /// CSS modifier used by the page (`notification-info`, ...).
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Info => "notification-info",
            Self::Success => "notification-success",
            Self::Error => "notification-error",
        }
    }
}
