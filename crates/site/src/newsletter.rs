//! Newsletter submission handler.
//!
//! Validates the email, then stands in for a subscription call: after a delay
//! the outcome is drawn at random. There is no real network behind it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roastery_core::{Email, EmailError, SubmissionId};
use thiserror::Error;

/// Shown when the email fails validation.
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
/// Shown while the simulated call is in flight.
pub const PENDING_MESSAGE: &str = "Subscribing...";
/// Shown when the simulated call succeeds.
pub const SUCCESS_MESSAGE: &str = "Successfully subscribed to newsletter!";
/// Shown when the simulated call fails.
pub const FAILURE_MESSAGE: &str = "Subscription failed. Please try again.";

/// Why a submission was not started.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NewsletterError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("a subscription is already in progress")]
    AlreadyPending,
}

/// Result of the simulated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    Failed,
}

/// Coin flip standing in for the subscription API.
#[derive(Debug, Clone)]
pub struct SimulatedSubscriber {
    success_rate: f64,
    rng: StdRng,
}

impl SimulatedSubscriber {
    /// Succeed with probability `success_rate`, clamped to `[0, 1]`.
    #[must_use]
    pub fn new(success_rate: f64) -> Self {
        Self::with_rng(success_rate, StdRng::from_os_rng())
    }

    /// Like [`SimulatedSubscriber::new`] with a reproducible draw sequence.
    #[must_use]
    pub fn seeded(success_rate: f64, seed: u64) -> Self {
        Self::with_rng(success_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(success_rate: f64, rng: StdRng) -> Self {
        let success_rate = if success_rate.is_nan() {
            0.0
        } else {
            success_rate.clamp(0.0, 1.0)
        };
        Self { success_rate, rng }
    }

    /// Probability of success.
    #[must_use]
    pub const fn success_rate(&self) -> f64 {
        self.success_rate
    }

    /// Draw one outcome.
    pub fn draw(&mut self) -> SubscribeOutcome {
        if self.rng.random_bool(self.success_rate) {
            SubscribeOutcome::Subscribed
        } else {
            SubscribeOutcome::Failed
        }
    }
}

/// Newsletter form state: at most one simulated call in flight.
#[derive(Debug, Clone)]
pub struct NewsletterForm {
    subscriber: SimulatedSubscriber,
    last_id: SubmissionId,
    pending: Option<(SubmissionId, Email)>,
}

impl NewsletterForm {
    /// Create an idle form.
    #[must_use]
    pub const fn new(subscriber: SimulatedSubscriber) -> Self {
        Self {
            subscriber,
            last_id: SubmissionId::new(0),
            pending: None,
        }
    }

    /// Validate `input` (trimmed) and start a submission.
    ///
    /// # Errors
    ///
    /// Returns [`NewsletterError::InvalidEmail`] if the email is malformed and
    /// [`NewsletterError::AlreadyPending`] if a call is already in flight.
    pub fn submit(&mut self, input: &str) -> Result<SubmissionId, NewsletterError> {
        let email = Email::parse(input.trim())?;
        if self.pending.is_some() {
            return Err(NewsletterError::AlreadyPending);
        }

        self.last_id = self.last_id.next();
        tracing::debug!(id = %self.last_id, domain = email.domain(), "Newsletter submission started");
        self.pending = Some((self.last_id, email));
        Ok(self.last_id)
    }

    /// Settle submission `id` with a fresh draw.
    ///
    /// Returns `None` for an id that is not the one in flight.
    pub fn settle(&mut self, id: SubmissionId) -> Option<SubscribeOutcome> {
        match self.pending.take() {
            Some((pending_id, email)) if pending_id == id => {
                let outcome = self.subscriber.draw();
                tracing::info!(id = %id, domain = email.domain(), ?outcome, "Newsletter submission settled");
                Some(outcome)
            }
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Whether a call is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
