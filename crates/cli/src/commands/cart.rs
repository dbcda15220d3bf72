//! Cart inspection and editing.
//!
//! # Usage
//!
//! ```bash
//! roastery cart show
//! roastery cart add "Cold Brew" '$4.00' --quantity 2
//! roastery cart change Latte -1
//! roastery cart clear
//! ```
//!
//! Unlike the page, these commands fail loudly: a refused store write is an
//! error, not a warning.

use roastery_core::{Price, PriceError, format_amount};
use roastery_site::cart::Cart;
use roastery_site::store::{KeyValueStore, StoreError};
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// Price argument could not be parsed.
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    /// Quantity must be at least 1.
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    /// No cart line with that name.
    #[error("Not in cart: {0}")]
    NotInCart(String),

    /// Store read or write failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Cart could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Load the cart stored under `key`, the way the page does.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Cart, CartCommandError> {
    Ok(store
        .get(key)?
        .map_or_else(Cart::new, |raw| Cart::from_json(&raw)))
}

/// Log every line and the total.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn show<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Cart, CartCommandError> {
    let cart = load(store, key)?;
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return Ok(cart);
    }
    for item in cart.items() {
        tracing::info!(
            "{} x{} @ {} = {}",
            item.name(),
            item.quantity(),
            item.unit_price(),
            format_amount(item.line_total())
        );
    }
    tracing::info!("{} items, total {}", cart.count(), format_amount(cart.total()));
    Ok(cart)
}

/// Add `quantity` of `name` at `price`.
///
/// # Errors
///
/// Returns an error if the price is invalid, the quantity is zero, or the
/// store refuses the write.
pub fn add<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    name: &str,
    price: &str,
    quantity: u32,
) -> Result<Cart, CartCommandError> {
    if quantity == 0 {
        return Err(CartCommandError::ZeroQuantity);
    }
    let price = Price::parse(price)?;
    let mut cart = load(store, key)?;
    cart.add(name, price);
    cart.change_quantity(name, i64::from(quantity) - 1);
    save(store, key, &cart)?;
    tracing::info!("Added {quantity} x {name} at {price}");
    Ok(cart)
}

/// Change the quantity of `name` by `delta`, removing it at zero.
///
/// # Errors
///
/// Returns an error if `name` is not in the cart or the write fails.
pub fn change<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    name: &str,
    delta: i64,
) -> Result<Cart, CartCommandError> {
    let mut cart = load(store, key)?;
    if !cart.change_quantity(name, delta) {
        return Err(CartCommandError::NotInCart(name.to_owned()));
    }
    save(store, key, &cart)?;
    match cart.get(name) {
        Some(item) => tracing::info!("{name} now x{}", item.quantity()),
        None => tracing::info!("Removed {name}"),
    }
    Ok(cart)
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn clear<S: KeyValueStore + ?Sized>(store: &mut S, key: &str) -> Result<(), CartCommandError> {
    save(store, key, &Cart::new())?;
    tracing::info!("Cart cleared");
    Ok(())
}

fn save<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    cart: &Cart,
) -> Result<(), CartCommandError> {
    store.set(key, &cart.to_json()?)?;
    Ok(())
}
