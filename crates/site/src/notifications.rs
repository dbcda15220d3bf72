//! Transient on-page notifications.
//!
//! Dismissal timing lives with the page controller, which schedules a
//! `DismissNotification` event for every notification it shows.

use roastery_core::{NotificationId, NotificationKind};

use crate::view::PageView;

/// A message shown to the user until its lifetime elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
}

/// Notifications currently on screen.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    next_id: u64,
    active: Vec<Notification>,
}

impl Notifications {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a new notification and return its id.
    pub fn push<V: PageView + ?Sized>(
        &mut self,
        view: &mut V,
        kind: NotificationKind,
        message: impl Into<String>,
    ) -> NotificationId {
        self.next_id += 1;
        let notification = Notification {
            id: NotificationId::new(self.next_id),
            kind,
            message: message.into(),
        };
        tracing::debug!(id = %notification.id, ?kind, message = %notification.message, "Notification shown");

        view.show_notification(&notification);
        let id = notification.id;
        self.active.push(notification);
        id
    }

    /// Remove notification `id`. Unknown ids are ignored.
    ///
    /// Returns whether a notification was removed.
    pub fn dismiss<V: PageView + ?Sized>(&mut self, view: &mut V, id: NotificationId) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        if self.active.len() == before {
            return false;
        }
        view.dismiss_notification(id);
        true
    }

    /// Notifications currently shown, oldest first.
    #[must_use]
    pub fn active(&self) -> &[Notification] {
        &self.active
    }
}
