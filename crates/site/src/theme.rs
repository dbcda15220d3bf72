//! Theme preference manager.

use roastery_core::Theme;

use crate::store::{KeyValueStore, read_or_absent, write_best_effort};
use crate::view::PageView;

/// Tracks the light/dark preference and keeps store and document in step.
#[derive(Debug, Clone)]
pub struct ThemePreference {
    key: String,
    theme: Theme,
}

impl ThemePreference {
    /// Load the preference stored under `key`.
    ///
    /// Missing or unrecognized values fall back to [`Theme::Light`].
    #[must_use]
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Self {
        let theme = read_or_absent(store, key)
            .and_then(|raw| {
                raw.parse::<Theme>()
                    .map_err(|e| tracing::debug!(error = %e, "Ignoring stored theme"))
                    .ok()
            })
            .unwrap_or_default();

        Self {
            key: key.to_owned(),
            theme,
        }
    }

    /// Current theme.
    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip light/dark, persist, and re-apply.
    pub fn toggle<S, V>(&mut self, store: &mut S, view: &mut V) -> Theme
    where
        S: KeyValueStore + ?Sized,
        V: PageView + ?Sized,
    {
        self.theme = self.theme.toggled();
        tracing::debug!(theme = %self.theme, "Theme toggled");
        write_best_effort(store, &self.key, self.theme.as_str());
        self.apply(view);
        self.theme
    }

    /// Reflect the current theme on the document. Idempotent.
    pub fn apply<V: PageView + ?Sized>(&self, view: &mut V) {
        view.apply_theme(self.theme);
    }
}
