//! Typed view binding.
//!
//! State managers never look up document elements. They call the small
//! capability surface on [`PageView`], which the presentation layer
//! implements however its markup is structured.

use roastery_core::{NotificationId, Theme};
use rust_decimal::Decimal;

use crate::cart::LineItem;
use crate::notifications::Notification;

/// Everything the page engine needs from the document.
pub trait PageView {
    /// Update the cart badge with the total item count.
    fn render_cart_badge(&mut self, count: u32);

    /// Replace the rendered cart line items.
    fn render_cart_items(&mut self, items: &[LineItem]);

    /// Update the displayed cart total (already rounded to cents).
    fn render_cart_total(&mut self, total: Decimal);

    /// Open or close the cart side panel.
    fn set_cart_open(&mut self, open: bool);

    /// Open or close the mobile navigation menu.
    fn set_nav_open(&mut self, open: bool);

    /// Reflect the current theme on the document.
    fn apply_theme(&mut self, theme: Theme);

    /// Highlight testimonial `index` (and its selector dot).
    fn highlight_testimonial(&mut self, index: usize);

    /// Show a transient notification.
    fn show_notification(&mut self, notification: &Notification);

    /// Remove a notification previously shown.
    fn dismiss_notification(&mut self, id: NotificationId);

    /// Clear the newsletter email input.
    fn clear_newsletter_input(&mut self);

    /// Show or hide menu entry `index`.
    fn set_menu_entry_visible(&mut self, index: usize, visible: bool);

    /// Mark a required form field as invalid (or clear the mark).
    fn mark_field_invalid(&mut self, field: &str, invalid: bool);
}

/// One call made against a [`HeadlessView`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    CartBadge(u32),
    CartItems(Vec<LineItem>),
    CartTotal(Decimal),
    CartOpen(bool),
    NavOpen(bool),
    Theme(Theme),
    Testimonial(usize),
    ShowNotification(Notification),
    DismissNotification(NotificationId),
    ClearNewsletterInput,
    MenuEntryVisible(usize, bool),
    FieldInvalid(String, bool),
}

/// A document model with no markup.
///
/// Keeps the state a real page would display plus, unless built with
/// [`HeadlessView::without_log`], a log of every render call.
#[derive(Debug, Clone, Default)]
pub struct HeadlessView {
    pub cart_badge: u32,
    pub cart_items: Vec<LineItem>,
    pub cart_total: Decimal,
    pub cart_open: bool,
    pub nav_open: bool,
    pub theme: Option<Theme>,
    pub testimonial: Option<usize>,
    pub notifications: Vec<Notification>,
    pub newsletter_cleared: usize,
    pub hidden_menu_entries: Vec<usize>,
    pub invalid_fields: Vec<String>,
    pub log: Vec<RenderOp>,
    skip_log: bool,
}

impl HeadlessView {
    /// Create an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty view that keeps only the displayed state.
    #[must_use]
    pub fn without_log() -> Self {
        Self {
            skip_log: true,
            ..Self::default()
        }
    }

    fn record(&mut self, op: RenderOp) {
        if !self.skip_log {
            self.log.push(op);
        }
    }

    /// Messages of the notifications currently on screen.
    #[must_use]
    pub fn notification_messages(&self) -> Vec<&str> {
        self.notifications.iter().map(|n| n.message.as_str()).collect()
    }

    /// Every testimonial index highlighted so far, in order.
    #[must_use]
    pub fn testimonial_history(&self) -> Vec<usize> {
        self.log
            .iter()
            .filter_map(|op| match op {
                RenderOp::Testimonial(index) => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Forget the render log, keeping the displayed state.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl PageView for HeadlessView {
    fn render_cart_badge(&mut self, count: u32) {
        self.cart_badge = count;
        self.record(RenderOp::CartBadge(count));
    }

    fn render_cart_items(&mut self, items: &[LineItem]) {
        self.cart_items = items.to_vec();
        self.record(RenderOp::CartItems(items.to_vec()));
    }

    fn render_cart_total(&mut self, total: Decimal) {
        self.cart_total = total;
        self.record(RenderOp::CartTotal(total));
    }

    fn set_cart_open(&mut self, open: bool) {
        self.cart_open = open;
        self.record(RenderOp::CartOpen(open));
    }

    fn set_nav_open(&mut self, open: bool) {
        self.nav_open = open;
        self.record(RenderOp::NavOpen(open));
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = Some(theme);
        self.record(RenderOp::Theme(theme));
    }

    fn highlight_testimonial(&mut self, index: usize) {
        self.testimonial = Some(index);
        self.record(RenderOp::Testimonial(index));
    }

    fn show_notification(&mut self, notification: &Notification) {
        self.notifications.push(notification.clone());
        self.record(RenderOp::ShowNotification(notification.clone()));
    }

    fn dismiss_notification(&mut self, id: NotificationId) {
        self.notifications.retain(|n| n.id != id);
        self.record(RenderOp::DismissNotification(id));
    }

    fn clear_newsletter_input(&mut self) {
        self.newsletter_cleared += 1;
        self.record(RenderOp::ClearNewsletterInput);
    }

    fn set_menu_entry_visible(&mut self, index: usize, visible: bool) {
        self.hidden_menu_entries.retain(|&i| i != index);
        if !visible {
            self.hidden_menu_entries.push(index);
            self.hidden_menu_entries.sort_unstable();
        }
        self.record(RenderOp::MenuEntryVisible(index, visible));
    }

    fn mark_field_invalid(&mut self, field: &str, invalid: bool) {
        self.invalid_fields.retain(|f| f != field);
        if invalid {
            self.invalid_fields.push(field.to_owned());
        }
        self.record(RenderOp::FieldInvalid(field.to_owned(), invalid));
    }
}

/// A [`HeadlessView`] that also logs every render call.
///
/// Used by the long-running interactive binary, so the render log is not kept.
#[derive(Debug, Clone)]
pub struct TracingView {
    state: HeadlessView,
}

impl Default for TracingView {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingView {
    /// Create an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: HeadlessView::without_log(),
        }
    }

    /// The displayed state.
    #[must_use]
    pub const fn state(&self) -> &HeadlessView {
        &self.state
    }
}

impl PageView for TracingView {
    fn render_cart_badge(&mut self, count: u32) {
        tracing::info!(count, "Cart badge");
        self.state.render_cart_badge(count);
    }

    fn render_cart_items(&mut self, items: &[LineItem]) {
        for item in items {
            tracing::info!(
                name = item.name(),
                unit_price = %item.unit_price(),
                quantity = item.quantity(),
                "Cart line"
            );
        }
        self.state.render_cart_items(items);
    }

    fn render_cart_total(&mut self, total: Decimal) {
        tracing::info!(total = %roastery_core::format_amount(total), "Cart total");
        self.state.render_cart_total(total);
    }

    fn set_cart_open(&mut self, open: bool) {
        tracing::info!(open, "Cart panel");
        self.state.set_cart_open(open);
    }

    fn set_nav_open(&mut self, open: bool) {
        tracing::info!(open, "Navigation menu");
        self.state.set_nav_open(open);
    }

    fn apply_theme(&mut self, theme: Theme) {
        tracing::info!(%theme, icon = theme.toggle_icon(), "Theme applied");
        self.state.apply_theme(theme);
    }

    fn highlight_testimonial(&mut self, index: usize) {
        tracing::info!(index, "Testimonial shown");
        self.state.highlight_testimonial(index);
    }

    fn show_notification(&mut self, notification: &Notification) {
        tracing::info!(
            id = %notification.id,
            class = notification.kind.css_class(),
            "{}",
            notification.message
        );
        self.state.show_notification(notification);
    }

    fn dismiss_notification(&mut self, id: NotificationId) {
        tracing::debug!(%id, "Notification dismissed");
        self.state.dismiss_notification(id);
    }

    fn clear_newsletter_input(&mut self) {
        tracing::info!("Newsletter input cleared");
        self.state.clear_newsletter_input();
    }

    fn set_menu_entry_visible(&mut self, index: usize, visible: bool) {
        tracing::debug!(index, visible, "Menu entry visibility");
        self.state.set_menu_entry_visible(index, visible);
    }

    fn mark_field_invalid(&mut self, field: &str, invalid: bool) {
        tracing::info!(field, invalid, "Field validation");
        self.state.mark_field_invalid(field, invalid);
    }
}
