//! State surviving a reload through the file store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use roastery_core::Theme;
use roastery_integration_tests::{test_config, test_menu};
use roastery_site::store::{FileStore, KeyValueStore};
use roastery_site::view::HeadlessView;
use roastery_site::{Page, PageEvent};

#[tokio::test(start_paused = true)]
async fn test_cart_and_theme_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let menu = test_menu();
    let latte = menu.position("Latte").unwrap();
    let mocha = menu.position("Mocha").unwrap();

    let (mut page, _handle) = Page::attach(
        test_config(),
        FileStore::new(&path),
        HeadlessView::new(),
        menu.clone(),
    );
    for entry in [latte, latte, mocha] {
        let _ = page.dispatch(PageEvent::AddToCart { entry });
    }
    let _ = page.dispatch(PageEvent::ToggleTheme);
    page.shutdown();
    drop(page);

    let (page, _handle) = Page::attach(test_config(), FileStore::new(&path), HeadlessView::new(), menu);

    assert_eq!(page.cart().count(), 3);
    assert_eq!(page.cart().total().to_string(), "13.75");
    assert_eq!(page.theme().theme(), Theme::Dark);
    assert_eq!(page.view().cart_badge, 3);
    assert_eq!(page.view().theme, Some(Theme::Dark));
}

#[test]
fn test_stored_format_is_plain_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().join("store.json"));
    store
        .set("coffee-cart", r#"[{"name":"Latte","price":4.5,"quantity":2}]"#)
        .unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let cart: serde_json::Value =
        serde_json::from_str(document["coffee-cart"].as_str().unwrap()).unwrap();

    assert_eq!(cart[0]["name"], "Latte");
    assert_eq!(cart[0]["quantity"], 2);
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_store_file_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "not a document").unwrap();

    let (mut page, _handle) = Page::attach(
        test_config(),
        FileStore::new(&path),
        HeadlessView::new(),
        test_menu(),
    );
    assert!(page.cart().cart().is_empty());
    assert_eq!(page.theme().theme(), Theme::Light);

    let _ = page.dispatch(PageEvent::AddToCart { entry: 0 });
    let _ = page.dispatch(PageEvent::ToggleTheme);
    page.shutdown();
    drop(page);

    let (page, _handle) = Page::attach(
        test_config(),
        FileStore::new(&path),
        HeadlessView::new(),
        test_menu(),
    );
    assert_eq!(page.cart().count(), 1);
    assert_eq!(page.theme().theme(), Theme::Dark);
}
