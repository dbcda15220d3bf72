//! Theme preference inspection and toggling.
//!
//! # Usage
//!
//! ```bash
//! roastery theme show
//! roastery theme toggle
//! ```

use roastery_core::Theme;
use roastery_site::store::{KeyValueStore, StoreError};

/// Read the stored theme. Missing or unrecognized values read as light.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn show<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Theme, StoreError> {
    let theme = store
        .get(key)?
        .and_then(|raw| raw.parse::<Theme>().ok())
        .unwrap_or_default();
    tracing::info!("Theme: {theme}");
    Ok(theme)
}

/// Flip the stored theme and return the new one.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub fn toggle<S: KeyValueStore + ?Sized>(store: &mut S, key: &str) -> Result<Theme, StoreError> {
    let theme = show(store, key)?.toggled();
    store.set(key, theme.as_str())?;
    tracing::info!("Theme switched to {theme}");
    Ok(theme)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use roastery_site::store::MemoryStore;

    use super::*;

    const KEY: &str = "coffee-theme";

    #[test]
    fn test_show_defaults_to_light() {
        assert_eq!(show(&MemoryStore::new(), KEY).unwrap(), Theme::Light);
        let tampered = MemoryStore::new().seeded(KEY, "sepia");
        assert_eq!(show(&tampered, KEY).unwrap(), Theme::Light);
    }

    #[test]
    fn test_toggle_twice() {
        let mut store = MemoryStore::new();
        assert_eq!(toggle(&mut store, KEY).unwrap(), Theme::Dark);
        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(toggle(&mut store, KEY).unwrap(), Theme::Light);
        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("light"));
    }
}
