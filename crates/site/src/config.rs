//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SITE_STORE_PATH` - JSON file backing the persistent store (default: `.roastery/store.json`)
//! - `SITE_STORE_QUOTA_BYTES` - Refuse store writes past this many bytes
//! - `SITE_CART_KEY` - Store key for the cart (default: `coffee-cart`)
//! - `SITE_THEME_KEY` - Store key for the theme (default: `coffee-theme`)
//! - `SITE_ROTATION_INTERVAL_MS` - Testimonial auto-rotation period (default: 5000)
//! - `SITE_NOTICE_LIFETIME_MS` - How long notifications stay up (default: 3000)
//! - `SITE_CART_NOTICE_LIFETIME_MS` - How long "added to cart" stays up (default: 2000)
//! - `SITE_NEWSLETTER_DELAY_MS` - Simulated subscription latency (default: 1500)
//! - `SITE_NEWSLETTER_SUCCESS_RATE` - Probability the simulated call succeeds (default: 0.9)
//! - `SITE_PRICE_POLICY` - `reject` or `zero` for unparseable menu prices (default: `reject`)
//! - `SITE_MENU_PATH` - JSON menu file (default: built-in house menu)
//! - `SITE_TESTIMONIALS` - Number of testimonials on the page (default: 3)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use roastery_core::PricePolicy;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Page engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    /// JSON file backing the persistent store
    pub store_path: PathBuf,
    /// Optional byte quota for the store
    pub store_quota: Option<usize>,
    /// Store key holding the cart
    pub cart_key: String,
    /// Store key holding the theme
    pub theme_key: String,
    /// Testimonial auto-rotation period
    pub rotation_interval: Duration,
    /// Lifetime of general notifications
    pub notice_lifetime: Duration,
    /// Lifetime of "added to cart" notifications
    pub cart_notice_lifetime: Duration,
    /// Delay before the simulated newsletter call settles
    pub newsletter_delay: Duration,
    /// Probability in `[0, 1]` that the simulated call succeeds
    pub newsletter_success_rate: f64,
    /// What to do with unparseable menu prices
    pub price_policy: PricePolicy,
    /// JSON menu file, if not using the house menu
    pub menu_path: Option<PathBuf>,
    /// Number of testimonials on the page
    pub testimonials: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(".roastery/store.json"),
            store_quota: None,
            cart_key: "coffee-cart".to_string(),
            theme_key: "coffee-theme".to_string(),
            rotation_interval: Duration::from_millis(5000),
            notice_lifetime: Duration::from_millis(3000),
            cart_notice_lifetime: Duration::from_millis(2000),
            newsletter_delay: Duration::from_millis(1500),
            newsletter_success_rate: 0.9,
            price_policy: PricePolicy::Reject,
            menu_path: None,
            testimonials: 3,
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// variables it does not return.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let newsletter_success_rate =
            parse_or(&get, "SITE_NEWSLETTER_SUCCESS_RATE", defaults.newsletter_success_rate)?;
        if !(0.0..=1.0).contains(&newsletter_success_rate) {
            return Err(ConfigError::InvalidEnvVar(
                "SITE_NEWSLETTER_SUCCESS_RATE".to_string(),
                format!("{newsletter_success_rate} is not within [0, 1]"),
            ));
        }

        let price_policy = match get("SITE_PRICE_POLICY") {
            Some(raw) => raw
                .parse::<PricePolicy>()
                .map_err(|e| ConfigError::InvalidEnvVar("SITE_PRICE_POLICY".to_string(), e))?,
            None => defaults.price_policy,
        };

        let store_quota = get("SITE_STORE_QUOTA_BYTES")
            .map(|raw| parse_value("SITE_STORE_QUOTA_BYTES", &raw))
            .transpose()?;

        Ok(Self {
            store_path: get("SITE_STORE_PATH").map_or(defaults.store_path, PathBuf::from),
            store_quota,
            cart_key: get("SITE_CART_KEY").unwrap_or(defaults.cart_key),
            theme_key: get("SITE_THEME_KEY").unwrap_or(defaults.theme_key),
            rotation_interval: millis_or(&get, "SITE_ROTATION_INTERVAL_MS", defaults.rotation_interval)?,
            notice_lifetime: millis_or(&get, "SITE_NOTICE_LIFETIME_MS", defaults.notice_lifetime)?,
            cart_notice_lifetime: millis_or(
                &get,
                "SITE_CART_NOTICE_LIFETIME_MS",
                defaults.cart_notice_lifetime,
            )?,
            newsletter_delay: millis_or(&get, "SITE_NEWSLETTER_DELAY_MS", defaults.newsletter_delay)?,
            newsletter_success_rate,
            price_policy,
            menu_path: get("SITE_MENU_PATH").map(PathBuf::from),
            testimonials: parse_or(&get, "SITE_TESTIMONIALS", defaults.testimonials)?,
        })
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(name).map_or(Ok(default), |raw| parse_value(name, &raw))
}

fn millis_or(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = get(name) else {
        return Ok(default);
    };
    let millis: u64 = parse_value(name, &raw)?;
    if millis == 0 {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_millis(millis))
}
