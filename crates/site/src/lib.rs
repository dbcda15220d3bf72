//! Roastery Site - Headless page engine for the coffee-shop site.
//!
//! Owns the page's interactive state and keeps it in step with a persistent
//! key-value store and an abstract view.
//!
//! # Architecture
//!
//! - One [`page::Page`] per loaded page, driven by a single event loop
//! - Timers post events back into that loop; none of them touch state directly
//! - State managers talk to the document only through [`view::PageView`]
//! - Persistence goes through [`store::KeyValueStore`], best effort
//!
//! # Modules
//!
//! - [`cart`] - Cart contents, totals and persistence
//! - [`theme`] - Light/dark preference
//! - [`testimonials`] - Testimonial carousel index
//! - [`newsletter`] - Email validation and the simulated subscription call
//! - [`notifications`] - Transient messages
//! - [`menu`] - Menu catalog and search filter
//! - [`page`] - Event routing and initialization order
//! - [`scheduler`] - One-shot and repeating timers
//! - [`session`] - Terminal command parsing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod menu;
pub mod newsletter;
pub mod notifications;
pub mod page;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod testimonials;
pub mod theme;
pub mod view;

pub use config::SiteConfig;
pub use error::{Result, SiteError};
pub use page::{Page, PageEvent, PageHandle};
