//! Integration tests for Roastery.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p roastery-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart, theme, rotator and email behavior through the public API
//! - `persistence` - State surviving a reload through the file store
//! - `page_session` - A full page session driven over its event loop

#![cfg_attr(not(test), forbid(unsafe_code))]

use roastery_core::PricePolicy;
use roastery_site::SiteConfig;
use roastery_site::menu::{Menu, house_menu};

/// Configuration whose newsletter call always succeeds.
#[must_use]
pub fn test_config() -> SiteConfig {
    SiteConfig {
        newsletter_success_rate: 1.0,
        ..SiteConfig::default()
    }
}

/// The house menu under the default price policy.
#[must_use]
pub fn test_menu() -> Menu {
    Menu::from_sources(house_menu(), PricePolicy::Reject)
}
