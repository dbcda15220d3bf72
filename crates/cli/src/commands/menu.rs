//! Menu listing and search.
//!
//! # Usage
//!
//! ```bash
//! roastery menu
//! roastery menu --search milk
//! ```

use roastery_site::SiteConfig;
use roastery_site::error::Result;
use roastery_site::menu::{Menu, house_menu};

/// Load the configured menu, falling back to the house menu.
///
/// # Errors
///
/// Returns an error if a configured menu file cannot be read or parsed.
pub fn load(config: &SiteConfig) -> Result<Menu> {
    match &config.menu_path {
        Some(path) => Menu::from_json_file(path, config.price_policy),
        None => Ok(Menu::from_sources(house_menu(), config.price_policy)),
    }
}

/// Log the entries matching `query` (all of them when `None`).
///
/// Returns the number of entries listed.
pub fn list(menu: &Menu, query: Option<&str>) -> usize {
    let visible = menu.search(query.unwrap_or_default());
    let mut listed = 0;
    for (entry, shown) in menu.entries().iter().zip(visible) {
        if !shown {
            continue;
        }
        listed += 1;
        match entry.price {
            Some(price) => tracing::info!("{} - {} ({})", entry.name, price, entry.description),
            None => tracing::warn!("{} - unavailable, price {:?}", entry.name, entry.price_text),
        }
    }
    tracing::info!("{listed} of {} entries", menu.entries().len());
    listed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_list_filters() {
        let menu = load(&SiteConfig::default()).unwrap();
        assert_eq!(list(&menu, None), 6);
        assert_eq!(list(&menu, Some("MILK")), 2);
        assert_eq!(list(&menu, Some("juice")), 0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name":"Flat White","price":"$4.00"}},{{"name":"Special","price":"ask"}}]"#
        )
        .unwrap();

        let config = SiteConfig {
            menu_path: Some(file.path().to_path_buf()),
            ..SiteConfig::default()
        };
        let menu = load(&config).unwrap();
        assert_eq!(menu.entries().len(), 2);
        assert_eq!(menu.get(1).unwrap().price, None);
    }
}
