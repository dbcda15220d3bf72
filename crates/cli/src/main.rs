//! Roastery CLI - Inspect and edit the state the site persists.
//!
//! # Usage
//!
//! ```bash
//! # Show the stored cart
//! roastery cart show
//!
//! # Add two cold brews at $4.00
//! roastery cart add "Cold Brew" '$4.00' -q 2
//!
//! # Flip light/dark
//! roastery theme toggle
//!
//! # Check an address against the newsletter rules
//! roastery email validate someone@example.com
//! ```
//!
//! # Commands
//!
//! - `cart` - Show, add to, change or clear the stored cart
//! - `theme` - Show or toggle the stored theme
//! - `email validate` - Validate a newsletter email address
//! - `menu` - List or search the menu
//!
//! The store location and keys come from the same `SITE_*` variables the site
//! reads; `--store` overrides the path.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roastery_site::SiteConfig;
use roastery_site::store::FileStore;

mod commands;

#[derive(Parser)]
#[command(name = "roastery")]
#[command(author, version, about = "Roastery CLI tools")]
struct Cli {
    /// Store file (overrides `SITE_STORE_PATH`)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or edit the stored cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect or toggle the stored theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Newsletter email tools
    Email {
        #[command(subcommand)]
        action: EmailAction,
    },
    /// List the menu
    Menu {
        /// Only list entries matching this text
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show every line and the total
    Show,
    /// Add an item
    Add {
        /// Item name
        name: String,

        /// Unit price, e.g. `$4.50`
        price: String,

        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change an item's quantity (removed at zero)
    Change {
        /// Item name
        name: String,

        /// Signed change, e.g. `-1`
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Remove every item
    Clear,
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Show the stored theme
    Show,
    /// Switch between light and dark
    Toggle,
}

#[derive(Subcommand)]
enum EmailAction {
    /// Validate an address
    Validate {
        /// Address to check
        address: String,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = SiteConfig::from_env()?;
    let mut store = FileStore::new(cli.store.unwrap_or_else(|| config.store_path.clone()));
    if let Some(quota) = config.store_quota {
        store = store.with_quota(quota);
    }

    match cli.command {
        Commands::Cart { action } => {
            let key = &config.cart_key;
            match action {
                CartAction::Show => {
                    commands::cart::show(&store, key)?;
                }
                CartAction::Add {
                    name,
                    price,
                    quantity,
                } => {
                    commands::cart::add(&mut store, key, &name, &price, quantity)?;
                }
                CartAction::Change { name, delta } => {
                    commands::cart::change(&mut store, key, &name, delta)?;
                }
                CartAction::Clear => commands::cart::clear(&mut store, key)?,
            }
        }
        Commands::Theme { action } => match action {
            ThemeAction::Show => {
                commands::theme::show(&store, &config.theme_key)?;
            }
            ThemeAction::Toggle => {
                commands::theme::toggle(&mut store, &config.theme_key)?;
            }
        },
        Commands::Email { action } => match action {
            EmailAction::Validate { address } => {
                commands::email::validate(&address)?;
            }
        },
        Commands::Menu { search } => {
            let menu = commands::menu::load(&config)?;
            commands::menu::list(&menu, search.as_deref());
        }
    }
    Ok(())
}
