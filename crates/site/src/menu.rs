//! Menu catalog and search filter.
//!
//! The presentation layer hands over each menu card as name, description and
//! the price text printed on it. Prices are parsed once, up front, under the
//! configured [`PricePolicy`].

use std::path::Path;

use roastery_core::{Price, PricePolicy};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};
use crate::view::PageView;

/// A menu card as the document presents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSource {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
}

impl MenuSource {
    /// Convenience constructor.
    #[must_use]
    pub fn new(name: &str, description: &str, price: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            price: price.to_owned(),
        }
    }
}

/// A menu entry with its parsed price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub name: String,
    pub description: String,
    pub price_text: String,
    /// `None` when the price text was rejected by the policy.
    pub price: Option<Price>,
}

impl MenuEntry {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// The page's menu entries, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    entries: Vec<MenuEntry>,
}

impl Menu {
    /// Build the menu from document cards.
    #[must_use]
    pub fn from_sources(sources: impl IntoIterator<Item = MenuSource>, policy: PricePolicy) -> Self {
        let entries = sources
            .into_iter()
            .map(|source| {
                let price = Price::parse_with_policy(&source.price, policy);
                if price.is_none() {
                    tracing::warn!(name = %source.name, price = %source.price, "Menu price rejected");
                }
                MenuEntry {
                    name: source.name,
                    description: source.description,
                    price_text: source.price,
                    price,
                }
            })
            .collect();
        Self { entries }
    }

    /// Load menu cards from a JSON array of `{name, description, price}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a menu array.
    pub fn from_json_file(path: &Path, policy: PricePolicy) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| SiteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let sources: Vec<MenuSource> = serde_json::from_str(&raw)?;
        Ok(Self::from_sources(sources, policy))
    }

    /// Entries in document order.
    #[must_use]
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MenuEntry> {
        self.entries.get(index)
    }

    /// Index of the entry named `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    /// Visibility of every entry for `query`.
    ///
    /// Case-insensitive substring match on name or description; an empty
    /// query shows everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<bool> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .map(|entry| needle.is_empty() || entry.matches(&needle))
            .collect()
    }

    /// Apply [`Menu::search`] to the view. Returns the number of visible entries.
    pub fn render_search<V: PageView + ?Sized>(&self, view: &mut V, query: &str) -> usize {
        let visibility = self.search(query);
        for (index, visible) in visibility.iter().enumerate() {
            view.set_menu_entry_visible(index, *visible);
        }
        visibility.into_iter().filter(|visible| *visible).count()
    }
}

/// The house menu used when no menu file is configured.
#[must_use]
pub fn house_menu() -> Vec<MenuSource> {
    vec![
        MenuSource::new("Espresso", "Rich, bold shot of pure coffee", "$3.00"),
        MenuSource::new("Cappuccino", "Espresso with steamed milk foam", "$4.25"),
        MenuSource::new("Latte", "Smooth espresso with steamed milk", "$4.50"),
        MenuSource::new("Mocha", "Espresso, chocolate and whipped cream", "$4.75"),
        MenuSource::new("Cold Brew", "Slow-steeped for 12 hours, served over ice", "$4.00"),
        MenuSource::new("Croissant", "Buttery, flaky French pastry", "$3.50"),
    ]
}
