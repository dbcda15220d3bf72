//! Page controller and event router.
//!
//! [`Page`] owns every piece of page state and is driven by one event loop:
//! user actions and timers both arrive as [`PageEvent`]s on a single channel
//! and are handled one at a time, so no state is ever shared or locked.
//!
//! # Initialization order
//!
//! [`Page::attach`] always runs:
//! 1. Persistent store read (cart, theme)
//! 2. State construction (rotator, newsletter form, notifications)
//! 3. View attach (initial render of theme, cart, panels, testimonial)
//! 4. Timers started (testimonial auto-rotation)

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::time::Duration;

use roastery_core::{NotificationId, NotificationKind, SubmissionId};
use tokio::sync::mpsc;
use tracing::instrument;

use crate::cart::CartManager;
use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::menu::Menu;
use crate::newsletter::{
    FAILURE_MESSAGE, INVALID_EMAIL_MESSAGE, NewsletterError, NewsletterForm, PENDING_MESSAGE,
    SUCCESS_MESSAGE, SimulatedSubscriber, SubscribeOutcome,
};
use crate::notifications::Notifications;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::store::KeyValueStore;
use crate::testimonials::TestimonialRotator;
use crate::theme::ThemePreference;
use crate::view::PageView;

/// Every action the page reacts to, from the user or from a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// "Add to cart" on menu entry `entry`.
    AddToCart { entry: usize },
    /// Quantity buttons in the cart panel.
    ChangeQuantity { name: String, delta: i64 },
    /// Cart icon clicked.
    ToggleCart,
    /// Cart close button or overlay clicked.
    CloseCart,
    /// Hamburger clicked.
    ToggleNav,
    /// A navigation link clicked (closes the mobile menu).
    NavLinkClicked,
    /// Theme toggle clicked.
    ToggleTheme,
    /// Testimonial dot clicked.
    SelectTestimonial(usize),
    /// Auto-rotation tick.
    RotateTestimonials,
    /// Newsletter form submitted.
    SubmitNewsletter { email: String },
    /// Simulated subscription call finished.
    NewsletterSettled(SubmissionId),
    /// Menu search input changed.
    SearchMenu { query: String },
    /// Notification lifetime elapsed.
    DismissNotification(NotificationId),
    /// A required form field lost focus.
    FieldBlurred { field: String, value: String },
    /// The page is going away.
    Unload,
}

/// Posts events into a running page. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PageHandle {
    events: mpsc::UnboundedSender<PageEvent>,
}

impl PageHandle {
    /// Queue `event` for the page.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::PageClosed`] if the page loop has stopped.
    pub fn send(&self, event: PageEvent) -> Result<()> {
        self.events.send(event).map_err(|_| SiteError::PageClosed)
    }

    /// Ask the page loop to stop.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::PageClosed`] if the page loop has already stopped.
    pub fn unload(&self) -> Result<()> {
        self.send(PageEvent::Unload)
    }
}

/// The page's top-level controller.
pub struct Page<S, V> {
    config: SiteConfig,
    store: S,
    view: V,
    menu: Menu,
    cart: CartManager,
    theme: ThemePreference,
    rotator: TestimonialRotator,
    newsletter: NewsletterForm,
    notifications: Notifications,
    cart_open: bool,
    nav_open: bool,
    events: mpsc::UnboundedReceiver<PageEvent>,
    scheduler: Scheduler<PageEvent>,
    rotation: Option<TaskHandle>,
    dismissals: HashMap<NotificationId, TaskHandle>,
    newsletter_call: Option<TaskHandle>,
}

impl<S, V> Page<S, V>
where
    S: KeyValueStore,
    V: PageView,
{
    /// Build the page from the store, render it, and start its timers.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn attach(config: SiteConfig, store: S, view: V, menu: Menu) -> (Self, PageHandle) {
        let subscriber = SimulatedSubscriber::new(config.newsletter_success_rate);
        Self::attach_with_subscriber(config, store, view, menu, subscriber)
    }

    /// [`Page::attach`] with an explicit newsletter outcome source.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn attach_with_subscriber(
        config: SiteConfig,
        store: S,
        mut view: V,
        menu: Menu,
        subscriber: SimulatedSubscriber,
    ) -> (Self, PageHandle) {
        let cart = CartManager::load(&store, &config.cart_key);
        let theme = ThemePreference::load(&store, &config.theme_key);

        let rotator = TestimonialRotator::new(config.testimonials);
        let newsletter = NewsletterForm::new(subscriber);
        let (sender, events) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(&sender);

        theme.apply(&mut view);
        cart.render(&mut view);
        view.set_cart_open(false);
        view.set_nav_open(false);
        if let Some(index) = rotator.current() {
            view.highlight_testimonial(index);
        }

        if config.rotation_interval.is_zero() {
            tracing::warn!("Rotation interval is zero, testimonials will not rotate");
        }
        let rotation = (rotator.len() > 1 && !config.rotation_interval.is_zero()).then(|| {
            scheduler.every(config.rotation_interval, || PageEvent::RotateTestimonials)
        });

        tracing::info!(
            items = cart.cart().items().len(),
            theme = %theme.theme(),
            testimonials = rotator.len(),
            "Page attached"
        );

        let page = Self {
            config,
            store,
            view,
            menu,
            cart,
            theme,
            rotator,
            newsletter,
            notifications: Notifications::new(),
            cart_open: false,
            nav_open: false,
            events,
            scheduler,
            rotation,
            dismissals: HashMap::new(),
            newsletter_call: None,
        };
        (page, PageHandle { events: sender })
    }

    /// Run the event loop until [`PageEvent::Unload`] or until every
    /// [`PageHandle`] is dropped. Cancels all timers and returns the page.
    pub async fn run(mut self) -> Self {
        while let Some(event) = self.events.recv().await {
            if self.dispatch(event).is_break() {
                break;
            }
        }
        self.shutdown();
        tracing::info!("Page unloaded");
        self
    }

    /// Handle every event already queued, without waiting.
    ///
    /// Returns how many events were handled; stops early on `Unload`.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            handled += 1;
            if self.dispatch(event).is_break() {
                self.shutdown();
                break;
            }
        }
        handled
    }

    /// Cancel every timer bound to the page and stop accepting events.
    pub fn shutdown(&mut self) {
        self.events.close();
        self.rotation = None;
        self.newsletter_call = None;
        self.dismissals.clear();
    }

    /// Handle one event.
    #[instrument(skip(self), level = "debug")]
    pub fn dispatch(&mut self, event: PageEvent) -> ControlFlow<()> {
        match event {
            PageEvent::AddToCart { entry } => self.add_to_cart(entry),
            PageEvent::ChangeQuantity { name, delta } => {
                self.cart
                    .change_quantity(&mut self.store, &mut self.view, &name, delta);
            }
            PageEvent::ToggleCart => self.set_cart_open(!self.cart_open),
            PageEvent::CloseCart => self.set_cart_open(false),
            PageEvent::ToggleNav => self.set_nav_open(!self.nav_open),
            PageEvent::NavLinkClicked => self.set_nav_open(false),
            PageEvent::ToggleTheme => {
                self.theme.toggle(&mut self.store, &mut self.view);
            }
            PageEvent::SelectTestimonial(index) => match self.rotator.select(index) {
                Ok(index) => self.view.highlight_testimonial(index),
                Err(e) => tracing::warn!(error = %e, "Ignoring testimonial selection"),
            },
            PageEvent::RotateTestimonials => {
                if let Some(index) = self.rotator.advance() {
                    self.view.highlight_testimonial(index);
                }
            }
            PageEvent::SubmitNewsletter { email } => self.submit_newsletter(&email),
            PageEvent::NewsletterSettled(id) => self.settle_newsletter(id),
            PageEvent::SearchMenu { query } => {
                let visible = self.menu.render_search(&mut self.view, &query);
                tracing::debug!(visible, "Menu filtered");
            }
            PageEvent::DismissNotification(id) => {
                self.dismissals.remove(&id);
                self.notifications.dismiss(&mut self.view, id);
            }
            PageEvent::FieldBlurred { field, value } => {
                self.view.mark_field_invalid(&field, value.trim().is_empty());
            }
            PageEvent::Unload => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn add_to_cart(&mut self, entry: usize) {
        let Some(entry) = self.menu.get(entry) else {
            tracing::warn!(entry, "No menu entry at that index");
            return;
        };
        let (name, price) = (entry.name.clone(), entry.price);

        match price {
            Some(price) => {
                self.cart
                    .add_item(&mut self.store, &mut self.view, &name, price);
                let lifetime = self.config.cart_notice_lifetime;
                self.notify(NotificationKind::Success, format!("Added {name} to cart!"), lifetime);
            }
            None => {
                let lifetime = self.config.notice_lifetime;
                self.notify(
                    NotificationKind::Error,
                    format!("{name} is unavailable right now"),
                    lifetime,
                );
            }
        }
    }

    fn submit_newsletter(&mut self, email: &str) {
        let lifetime = self.config.notice_lifetime;
        match self.newsletter.submit(email) {
            Ok(id) => {
                self.notify(NotificationKind::Info, PENDING_MESSAGE, lifetime);
                let call = self
                    .scheduler
                    .after(self.config.newsletter_delay, PageEvent::NewsletterSettled(id));
                self.newsletter_call = Some(call);
            }
            Err(NewsletterError::InvalidEmail(e)) => {
                tracing::debug!(error = %e, "Newsletter email rejected");
                self.notify(NotificationKind::Error, INVALID_EMAIL_MESSAGE, lifetime);
            }
            Err(NewsletterError::AlreadyPending) => {
                tracing::debug!("Newsletter submission ignored, one already in flight");
            }
        }
    }

    fn settle_newsletter(&mut self, id: SubmissionId) {
        let lifetime = self.config.notice_lifetime;
        match self.newsletter.settle(id) {
            Some(SubscribeOutcome::Subscribed) => {
                self.view.clear_newsletter_input();
                self.notify(NotificationKind::Success, SUCCESS_MESSAGE, lifetime);
            }
            Some(SubscribeOutcome::Failed) => {
                self.notify(NotificationKind::Error, FAILURE_MESSAGE, lifetime);
            }
            None => return,
        }
        self.newsletter_call = None;
    }

    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>, lifetime: Duration) {
        let id = self.notifications.push(&mut self.view, kind, message);
        let dismissal = self
            .scheduler
            .after(lifetime, PageEvent::DismissNotification(id));
        self.dismissals.insert(id, dismissal);
    }

    fn set_cart_open(&mut self, open: bool) {
        self.cart_open = open;
        self.view.set_cart_open(open);
    }

    fn set_nav_open(&mut self, open: bool) {
        self.nav_open = open;
        self.view.set_nav_open(open);
    }
}

impl<S, V> Page<S, V> {
    /// The cart state manager.
    pub const fn cart(&self) -> &CartManager {
        &self.cart
    }

    /// The theme preference.
    pub const fn theme(&self) -> &ThemePreference {
        &self.theme
    }

    /// The testimonial rotator.
    pub const fn rotator(&self) -> &TestimonialRotator {
        &self.rotator
    }

    /// Notifications currently shown.
    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// The menu catalog.
    pub const fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Whether a newsletter call is in flight.
    pub const fn is_subscribing(&self) -> bool {
        self.newsletter.is_pending()
    }

    /// Whether the cart panel is open.
    pub const fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    /// Whether the mobile menu is open.
    pub const fn is_nav_open(&self) -> bool {
        self.nav_open
    }

    /// Whether the auto-rotation timer is running.
    pub fn is_rotating(&self) -> bool {
        self.rotation.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// The configuration the page was attached with.
    pub const fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The persistent store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The view.
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Tear the page apart into its store and view.
    pub fn into_parts(self) -> (S, V) {
        (self.store, self.view)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use roastery_core::{PricePolicy, Theme};

    use super::*;
    use crate::menu::{MenuSource, house_menu};
    use crate::store::MemoryStore;
    use crate::view::HeadlessView;

    type TestPage = Page<MemoryStore, HeadlessView>;

    fn config() -> SiteConfig {
        SiteConfig {
            newsletter_success_rate: 1.0,
            ..SiteConfig::default()
        }
    }

    fn attach(config: SiteConfig, store: MemoryStore) -> (TestPage, PageHandle) {
        let menu = Menu::from_sources(house_menu(), config.price_policy);
        Page::attach(config, store, HeadlessView::new(), menu)
    }

    fn latte(page: &TestPage) -> usize {
        page.menu().position("Latte").unwrap()
    }

    async fn wait(millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_renders_initial_state() {
        let store = MemoryStore::new()
            .seeded("coffee-theme", "dark")
            .seeded("coffee-cart", r#"[{"name":"Latte","price":4.5,"quantity":2}]"#);
        let (page, _handle) = attach(config(), store);

        let view = page.view();
        assert_eq!(view.theme, Some(Theme::Dark));
        assert_eq!(view.cart_badge, 2);
        assert_eq!(view.cart_total.to_string(), "9.00");
        assert_eq!(view.testimonial, Some(0));
        assert!(!view.cart_open);
        assert!(page.is_rotating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_to_cart_notifies_then_dismisses() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());
        let entry = latte(&page);

        let _ = page.dispatch(PageEvent::AddToCart { entry });
        assert_eq!(page.cart().count(), 1);
        assert_eq!(page.view().notification_messages(), ["Added Latte to cart!"]);
        assert!(page.store().get("coffee-cart").unwrap().is_some());

        wait(2_001).await;
        page.process_pending();
        assert!(page.view().notifications.is_empty());
        assert!(page.notifications().active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unparseable_price_is_rejected() {
        let config = config();
        let menu = Menu::from_sources(
            [MenuSource::new("Seasonal", "Ask your barista", "Market price")],
            PricePolicy::Reject,
        );
        let (mut page, _handle) = Page::attach(config, MemoryStore::new(), HeadlessView::new(), menu);

        let _ = page.dispatch(PageEvent::AddToCart { entry: 0 });
        assert!(page.cart().cart().is_empty());
        assert_eq!(
            page.view().notification_messages(),
            ["Seasonal is unavailable right now"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_entry_is_ignored() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());
        let _ = page.dispatch(PageEvent::AddToCart { entry: 99 });
        assert!(page.cart().cart().is_empty());
        assert!(page.view().notifications.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_quantity_unknown_name_is_noop() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());
        let _ = page.dispatch(PageEvent::ChangeQuantity {
            name: "Mocha".to_string(),
            delta: -1,
        });
        assert_eq!(page.cart().count(), 0);
        assert_eq!(page.store().get("coffee-cart").unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panels_toggle() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());

        let _ = page.dispatch(PageEvent::ToggleCart);
        assert!(page.is_cart_open() && page.view().cart_open);
        let _ = page.dispatch(PageEvent::CloseCart);
        assert!(!page.is_cart_open() && !page.view().cart_open);

        let _ = page.dispatch(PageEvent::ToggleNav);
        assert!(page.view().nav_open);
        let _ = page.dispatch(PageEvent::NavLinkClicked);
        assert!(!page.is_nav_open() && !page.view().nav_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_theme_toggle_persists() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());
        assert_eq!(page.theme().theme(), Theme::Light);

        let _ = page.dispatch(PageEvent::ToggleTheme);
        assert_eq!(page.view().theme, Some(Theme::Dark));
        assert_eq!(page.store().get("coffee-theme").unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_rotation_keeps_period_after_manual_select() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());

        wait(5_001).await;
        page.process_pending();
        assert_eq!(page.rotator().current(), Some(1));

        // Manual selection at ~5s does not push the next tick past 10s.
        let _ = page.dispatch(PageEvent::SelectTestimonial(0));
        wait(5_000).await;
        page.process_pending();

        assert_eq!(page.view().testimonial_history(), [0, 1, 0, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_selection_is_ignored() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());
        let _ = page.dispatch(PageEvent::SelectTestimonial(7));
        assert_eq!(page.rotator().current(), Some(0));
        assert_eq!(page.view().testimonial_history(), [0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_rotation_without_testimonials() {
        let config = SiteConfig {
            testimonials: 0,
            ..config()
        };
        let (mut page, _handle) = attach(config, MemoryStore::new());
        assert!(!page.is_rotating());
        assert_eq!(page.view().testimonial, None);

        let _ = page.dispatch(PageEvent::RotateTestimonials);
        assert_eq!(page.rotator().current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rotation_interval_disables_rotation() {
        let config = SiteConfig {
            rotation_interval: Duration::ZERO,
            ..config()
        };
        let (mut page, _handle) = attach(config, MemoryStore::new());
        assert!(!page.is_rotating());

        wait(10_000).await;
        page.process_pending();
        assert_eq!(page.rotator().current(), Some(0));

        let _ = page.dispatch(PageEvent::SelectTestimonial(1));
        assert_eq!(page.rotator().current(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newsletter_success_clears_input() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());

        let _ = page.dispatch(PageEvent::SubmitNewsletter {
            email: "a@b.co".to_string(),
        });
        assert!(page.is_subscribing());
        assert_eq!(page.view().notification_messages(), [PENDING_MESSAGE]);

        wait(1_501).await;
        page.process_pending();

        assert!(!page.is_subscribing());
        assert_eq!(page.view().newsletter_cleared, 1);
        assert_eq!(
            page.view().notification_messages(),
            [PENDING_MESSAGE, SUCCESS_MESSAGE]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_newsletter_failure_keeps_input() {
        let config = SiteConfig {
            newsletter_success_rate: 0.0,
            ..config()
        };
        let (mut page, _handle) = attach(config, MemoryStore::new());

        let _ = page.dispatch(PageEvent::SubmitNewsletter {
            email: "a@b.co".to_string(),
        });
        wait(1_501).await;
        page.process_pending();

        assert_eq!(page.view().newsletter_cleared, 0);
        assert!(page.view().notification_messages().contains(&FAILURE_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newsletter_invalid_email() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());

        let _ = page.dispatch(PageEvent::SubmitNewsletter {
            email: "a@b".to_string(),
        });
        assert!(!page.is_subscribing());
        assert_eq!(page.view().notification_messages(), [INVALID_EMAIL_MESSAGE]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_field_blur_validation() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());

        let _ = page.dispatch(PageEvent::FieldBlurred {
            field: "name".to_string(),
            value: "   ".to_string(),
        });
        assert_eq!(page.view().invalid_fields, ["name"]);

        let _ = page.dispatch(PageEvent::FieldBlurred {
            field: "name".to_string(),
            value: "Ada".to_string(),
        });
        assert!(page.view().invalid_fields.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_menu() {
        let (mut page, _handle) = attach(config(), MemoryStore::new());
        let _ = page.dispatch(PageEvent::SearchMenu {
            query: "cold".to_string(),
        });
        assert_eq!(page.view().hidden_menu_entries, [0, 1, 2, 3, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_unload_and_cancels_timers() {
        let (page, handle) = attach(config(), MemoryStore::new());
        let session = tokio::spawn(page.run());

        handle.send(PageEvent::ToggleTheme).unwrap();
        handle.unload().unwrap();
        let page = session.await.unwrap();

        assert_eq!(page.theme().theme(), Theme::Dark);
        assert!(!page.is_rotating());
        assert!(matches!(
            handle.send(PageEvent::ToggleTheme),
            Err(SiteError::PageClosed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_handles_drop() {
        let (page, handle) = attach(config(), MemoryStore::new());
        let session = tokio::spawn(page.run());

        let entry = 2;
        handle.send(PageEvent::AddToCart { entry }).unwrap();
        drop(handle);

        let page = session.await.unwrap();
        assert_eq!(page.cart().count(), 1);
    }
}
