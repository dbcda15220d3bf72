//! Roastery Site - Interactive page session.
//!
//! Loads the persisted cart and theme, attaches a page to a logging view and
//! reads one command per line from stdin (see [`roastery_site::session`]).
//! Timers keep running between commands, so notifications expire and the
//! testimonial carousel advances on its own.
//!
//! Ends on `quit`, end of input, Ctrl+C or SIGTERM.

#![cfg_attr(not(test), forbid(unsafe_code))]

use roastery_site::menu::{Menu, house_menu};
use roastery_site::session::parse_command;
use roastery_site::store::FileStore;
use roastery_site::view::TracingView;
use roastery_site::{Page, PageHandle, SiteConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roastery_site=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SiteConfig::from_env().expect("Failed to load configuration");

    let menu = match &config.menu_path {
        Some(path) => Menu::from_json_file(path, config.price_policy).expect("Failed to load menu"),
        None => Menu::from_sources(house_menu(), config.price_policy),
    };
    tracing::info!(entries = menu.entries().len(), "Menu loaded");

    let mut store = FileStore::new(&config.store_path);
    if let Some(quota) = config.store_quota {
        store = store.with_quota(quota);
    }
    tracing::info!(path = %store.path().display(), "Using store");

    let commands = menu.clone();
    let (page, handle) = Page::attach(config, store, TracingView::new(), menu);
    let session = tokio::spawn(page.run());

    tokio::select! {
        () = read_commands(&handle, &commands) => {},
        () = shutdown_signal() => {},
    }

    // The loop may already be gone after `quit`.
    let _ = handle.unload();
    let page = session.await.expect("Page session panicked");

    let cart = page.cart();
    tracing::info!(
        items = cart.count(),
        total = %roastery_core::format_amount(cart.total()),
        theme = %page.theme().theme(),
        "Session ended"
    );
}

/// Forward stdin commands to the page until `quit` or end of input.
async fn read_commands(handle: &PageHandle, menu: &Menu) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin");
                break;
            }
        };

        match parse_command(&line, menu) {
            Ok(Some(event)) => {
                let unload = matches!(event, roastery_site::PageEvent::Unload);
                if handle.send(event).is_err() || unload {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{e}"),
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, unloading page");
}
