//! Cart state manager.
//!
//! [`Cart`] is the pure state: an ordered, de-duplicated list of line items.
//! [`CartManager`] owns the authoritative cart for the page, writes it back to
//! the store after every mutation and re-renders the cart widgets.
//!
//! # Stored format
//!
//! ```json
//! [{"name": "Latte", "price": 4.5, "quantity": 2}]
//! ```
//!
//! Loading never fails: an absent or malformed value is an empty cart, and
//! individual entries that break an invariant are dropped.

use roastery_core::{Price, round_to_cents};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::store::{KeyValueStore, read_or_absent, write_best_effort};
use crate::view::PageView;

/// A named product entry with unit price and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    name: String,
    #[serde(rename = "price")]
    unit_price: Price,
    quantity: u32,
}

impl LineItem {
    /// The item's name, unique within a cart.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of one unit.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Number of units, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `unit_price * quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.amount() * Decimal::from(self.quantity)
    }
}

/// Shape of a stored entry before invariants are checked.
#[derive(Deserialize)]
struct StoredLineItem {
    name: String,
    price: Option<Price>,
    quantity: i64,
}

/// The ordered, de-duplicated collection of line items for a session.
///
/// Invariants: every item has `quantity >= 1` and no two items share a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Decode a stored cart, degrading to empty on malformed input.
    ///
    /// Entries with an empty name, a missing or negative price, or a
    /// quantity below 1 are dropped. Duplicate names are merged into the
    /// first occurrence.
    #[must_use]
    pub fn from_json(raw: &str) -> Self {
        let stored: Vec<serde_json::Value> = match serde_json::from_str(raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(error = %e, "Stored cart is malformed, starting empty");
                return Self::new();
            }
        };

        let mut cart = Self::new();
        for value in stored {
            let Ok(entry) = serde_json::from_value::<StoredLineItem>(value) else {
                tracing::debug!("Dropping unreadable stored cart entry");
                continue;
            };
            let (Some(unit_price), Ok(quantity)) = (entry.price, u32::try_from(entry.quantity))
            else {
                tracing::debug!(name = %entry.name, "Dropping stored cart entry with bad price or quantity");
                continue;
            };
            if entry.name.is_empty() || quantity == 0 {
                continue;
            }

            match cart.position(&entry.name) {
                Some(index) => {
                    if let Some(existing) = cart.items.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(quantity);
                    }
                }
                None => cart.items.push(LineItem {
                    name: entry.name,
                    unit_price,
                    quantity,
                }),
            }
        }
        cart
    }

    /// Encode the cart in the stored format.
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be represented as a JSON number.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Line items in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up an item by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name == name)
    }

    /// Add one unit of `name`, appending it if it is new.
    ///
    /// An existing item keeps its original unit price.
    pub fn add(&mut self, name: &str, unit_price: Price) {
        match self.items.iter_mut().find(|item| item.name == name) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(LineItem {
                name: name.to_owned(),
                unit_price,
                quantity: 1,
            }),
        }
    }

    /// Adjust the quantity of `name` by `delta`, removing it at zero or below.
    ///
    /// Returns `false` (and changes nothing) if no item has that name.
    pub fn change_quantity(&mut self, name: &str, delta: i64) -> bool {
        let Some(index) = self.position(name) else {
            return false;
        };
        let Some(current) = self.items.get(index).map(|item| item.quantity) else {
            return false;
        };

        let updated = i64::from(current).saturating_add(delta);
        if updated <= 0 {
            self.items.remove(index);
        } else if let Some(item) = self.items.get_mut(index) {
            item.quantity = u32::try_from(updated).unwrap_or(u32::MAX);
        }
        true
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of all quantities, for the badge.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |sum, item| sum.saturating_add(item.quantity))
    }

    /// Sum of `unit_price * quantity`, rounded to cents.
    #[must_use]
    pub fn total(&self) -> Decimal {
        round_to_cents(self.items.iter().map(LineItem::line_total).sum())
    }
}

/// Owns the page's cart and keeps the store and view in step with it.
#[derive(Debug, Clone)]
pub struct CartManager {
    key: String,
    cart: Cart,
}

impl CartManager {
    /// Load the cart stored under `key`. Never fails.
    #[must_use]
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Self {
        let cart = read_or_absent(store, key)
            .map(|raw| Cart::from_json(&raw))
            .unwrap_or_default();
        tracing::debug!(key, items = cart.items.len(), "Cart loaded");
        Self {
            key: key.to_owned(),
            cart,
        }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Store key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.cart.count()
    }

    /// Cart total rounded to cents.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// Add one unit of `name`, persist and re-render.
    #[instrument(skip(self, store, view), fields(key = %self.key))]
    pub fn add_item<S, V>(&mut self, store: &mut S, view: &mut V, name: &str, unit_price: Price)
    where
        S: KeyValueStore + ?Sized,
        V: PageView + ?Sized,
    {
        self.cart.add(name, unit_price);
        self.persist(store);
        self.render(view);
    }

    /// Adjust the quantity of `name` by `delta`, persist and re-render.
    ///
    /// Unknown names are a no-op: nothing is written or rendered. Returns
    /// whether the cart changed.
    #[instrument(skip(self, store, view), fields(key = %self.key))]
    pub fn change_quantity<S, V>(
        &mut self,
        store: &mut S,
        view: &mut V,
        name: &str,
        delta: i64,
    ) -> bool
    where
        S: KeyValueStore + ?Sized,
        V: PageView + ?Sized,
    {
        if !self.cart.change_quantity(name, delta) {
            tracing::debug!("No cart item with that name");
            return false;
        }
        self.persist(store);
        self.render(view);
        true
    }

    /// Empty the cart, persist and re-render.
    pub fn clear<S, V>(&mut self, store: &mut S, view: &mut V)
    where
        S: KeyValueStore + ?Sized,
        V: PageView + ?Sized,
    {
        self.cart.clear();
        self.persist(store);
        self.render(view);
    }

    /// Write the full cart to the store. Failures are logged and swallowed.
    ///
    /// Returns whether the write landed.
    pub fn persist<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> bool {
        match self.cart.to_json() {
            Ok(raw) => write_best_effort(store, &self.key, &raw),
            Err(e) => {
                tracing::warn!(error = %e, "Cart could not be encoded, keeping in-memory state");
                false
            }
        }
    }

    /// Push badge, items and total to the view.
    pub fn render<V: PageView + ?Sized>(&self, view: &mut V) {
        view.render_cart_badge(self.cart.count());
        view.render_cart_items(self.cart.items());
        view.render_cart_total(self.cart.total());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::view::HeadlessView;

    const KEY: &str = "coffee-cart";

    fn price(cents: i64) -> Price {
        Price::from_cents(cents).unwrap()
    }

    fn names(cart: &Cart) -> Vec<&str> {
        cart.items().iter().map(LineItem::name).collect()
    }

    #[test]
    fn test_add_to_empty_cart() {
        let mut cart = Cart::new();
        cart.add("Latte", price(450));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get("Latte").unwrap().quantity(), 1);
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.total(), Decimal::new(450, 2));
    }

    #[test]
    fn test_add_existing_increments_quantity() {
        let mut cart = Cart::new();
        cart.add("Latte", price(450));
        cart.add("Latte", price(450));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get("Latte").unwrap().quantity(), 2);
        assert_eq!(cart.total().to_string(), "9.00");
    }

    #[test]
    fn test_add_existing_keeps_first_price() {
        let mut cart = Cart::new();
        cart.add("Latte", price(450));
        cart.add("Latte", price(999));
        assert_eq!(cart.get("Latte").unwrap().unit_price(), price(450));
    }

    #[test]
    fn test_change_quantity_to_zero_removes() {
        let mut cart = Cart::new();
        cart.add("Latte", price(450));
        cart.add("Latte", price(450));

        assert!(cart.change_quantity("Latte", -2));
        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_change_quantity_below_zero_removes() {
        let mut cart = Cart::new();
        cart.add("Mocha", price(475));
        assert!(cart.change_quantity("Mocha", -5));
        assert!(cart.get("Mocha").is_none());
    }

    #[test]
    fn test_change_quantity_unknown_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.change_quantity("Mocha", -1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_positive() {
        let mut cart = Cart::new();
        cart.add("Espresso", price(300));
        assert!(cart.change_quantity("Espresso", 3));
        assert_eq!(cart.get("Espresso").unwrap().quantity(), 4);
        assert_eq!(cart.total().to_string(), "12.00");
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut cart = Cart::new();
        cart.add("Latte", price(450));
        cart.add("Mocha", price(475));
        cart.add("Latte", price(450));
        cart.add("Espresso", price(300));
        cart.change_quantity("Mocha", 1);

        assert_eq!(names(&cart), ["Latte", "Mocha", "Espresso"]);
    }

    #[test]
    fn test_invariants_hold_after_mixed_operations() {
        let mut cart = Cart::new();
        let ops: [(&str, i64); 10] = [
            ("Latte", 0),
            ("Mocha", 0),
            ("Latte", -1),
            ("Latte", 0),
            ("Mocha", 2),
            ("Espresso", -3),
            ("Mocha", -3),
            ("Latte", 0),
            ("Cold Brew", 0),
            ("Latte", -1),
        ];
        for (name, delta) in ops {
            if delta == 0 {
                cart.add(name, price(400));
            } else {
                cart.change_quantity(name, delta);
            }

            assert!(cart.items().iter().all(|item| item.quantity() >= 1));
            let mut seen = names(&cart);
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), cart.items().len());
        }
        assert_eq!(names(&cart), ["Latte", "Cold Brew"]);
    }

    #[test]
    fn test_total_rounds_to_cents() {
        let mut cart = Cart::new();
        cart.add("Drip", Price::new(Decimal::new(1_005, 3)).unwrap());
        assert_eq!(cart.total().to_string(), "1.01");
    }

    #[test]
    fn test_from_json_malformed_is_empty() {
        assert!(Cart::from_json("not json").is_empty());
        assert!(Cart::from_json("{\"name\":\"Latte\"}").is_empty());
        assert!(Cart::from_json("").is_empty());
        assert!(Cart::from_json("null").is_empty());
    }

    #[test]
    fn test_from_json_drops_invalid_entries() {
        let raw = r#"[
            {"name": "Latte", "price": 4.5, "quantity": 2},
            {"name": "Ghost", "price": null, "quantity": 1},
            {"name": "Refund", "price": -3, "quantity": 1},
            {"name": "Zero", "price": 1, "quantity": 0},
            {"name": "", "price": 1, "quantity": 1},
            {"price": 1, "quantity": 1},
            "junk",
            {"name": "Mocha", "price": "4.75", "quantity": 1}
        ]"#;
        let cart = Cart::from_json(raw);
        assert_eq!(names(&cart), ["Latte", "Mocha"]);
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_from_json_merges_duplicates() {
        let raw = r#"[
            {"name": "Latte", "price": 4.5, "quantity": 1},
            {"name": "Mocha", "price": 4.75, "quantity": 1},
            {"name": "Latte", "price": 9, "quantity": 2}
        ]"#;
        let cart = Cart::from_json(raw);
        assert_eq!(names(&cart), ["Latte", "Mocha"]);
        assert_eq!(cart.get("Latte").unwrap().quantity(), 3);
        assert_eq!(cart.get("Latte").unwrap().unit_price(), price(450));
    }

    #[test]
    fn test_stored_format() {
        let mut cart = Cart::new();
        cart.add("Latte", price(450));
        assert_eq!(
            cart.to_json().unwrap(),
            r#"[{"name":"Latte","price":4.5,"quantity":1}]"#
        );
    }

    #[test]
    fn test_manager_persist_then_load_round_trips() {
        let mut store = MemoryStore::new();
        let mut view = HeadlessView::new();
        let mut manager = CartManager::load(&store, KEY);

        manager.add_item(&mut store, &mut view, "Latte", price(450));
        manager.add_item(&mut store, &mut view, "Mocha", price(475));
        manager.add_item(&mut store, &mut view, "Latte", price(450));

        let reloaded = CartManager::load(&store, KEY);
        assert_eq!(reloaded.cart(), manager.cart());
    }

    #[test]
    fn test_manager_load_is_idempotent() {
        let store = MemoryStore::new().seeded(
            KEY,
            r#"[{"name":"Latte","price":4.5,"quantity":2},{"name":"Latte","price":4.5,"quantity":1}]"#,
        );
        let first = CartManager::load(&store, KEY);
        let second = CartManager::load(&store, KEY);
        assert_eq!(first.cart(), second.cart());
    }

    #[test]
    fn test_manager_renders_after_mutation() {
        let mut store = MemoryStore::new();
        let mut view = HeadlessView::new();
        let mut manager = CartManager::load(&store, KEY);

        manager.add_item(&mut store, &mut view, "Latte", price(450));
        assert_eq!(view.cart_badge, 1);
        assert_eq!(view.cart_items.len(), 1);
        assert_eq!(view.cart_total.to_string(), "4.50");

        manager.change_quantity(&mut store, &mut view, "Latte", -1);
        assert_eq!(view.cart_badge, 0);
        assert!(view.cart_items.is_empty());
        assert_eq!(view.cart_total.to_string(), "0.00");
    }

    #[test]
    fn test_manager_unknown_change_writes_nothing() {
        let mut store = MemoryStore::new();
        let mut view = HeadlessView::new();
        let mut manager = CartManager::load(&store, KEY);

        assert!(!manager.change_quantity(&mut store, &mut view, "Mocha", -1));
        assert_eq!(store.get(KEY).unwrap(), None);
        assert!(view.log.is_empty());
    }

    #[test]
    fn test_manager_swallows_quota_errors() {
        let mut store = MemoryStore::with_quota(16);
        let mut view = HeadlessView::new();
        let mut manager = CartManager::load(&store, KEY);

        manager.add_item(&mut store, &mut view, "Latte", price(450));

        // In-memory state stays authoritative.
        assert_eq!(manager.count(), 1);
        assert_eq!(view.cart_badge, 1);
        assert_eq!(store.get(KEY).unwrap(), None);
        assert!(!manager.persist(&mut store));
    }

    #[test]
    fn test_manager_clear() {
        let mut store = MemoryStore::new();
        let mut view = HeadlessView::new();
        let mut manager = CartManager::load(&store, KEY);
        manager.add_item(&mut store, &mut view, "Latte", price(450));

        manager.clear(&mut store, &mut view);
        assert!(manager.cart().is_empty());
        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("[]"));
    }
}
