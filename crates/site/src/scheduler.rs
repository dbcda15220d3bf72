//! Timers that post events back into the page loop.
//!
//! Every timer is a tokio task that only sends an event; it never touches page
//! state. The scheduler holds a weak sender, so a pending timer does not keep
//! a finished page's channel open, and every timer hands back a
//! [`TaskHandle`] that aborts it when cancelled or dropped.

use std::time::Duration;

use tokio::sync::mpsc::{UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Cancellation handle for a scheduled timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct TaskHandle {
    task: JoinHandle<()>,
}

impl TaskHandle {
    /// Stop the timer. Events already posted stay queued.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the timer has fired for the last time or been cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Schedules one-shot and repeating events for a page loop.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    events: WeakUnboundedSender<E>,
}

impl<E: Send + 'static> Scheduler<E> {
    /// Create a scheduler posting into the channel behind `events`.
    #[must_use]
    pub fn new(events: &UnboundedSender<E>) -> Self {
        Self {
            events: events.downgrade(),
        }
    }

    /// Post `event` once, after `delay`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn after(&self, delay: Duration, event: E) -> TaskHandle {
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !post(&events, event) {
                tracing::trace!("Timer fired after page closed");
            }
        });
        TaskHandle { task }
    }

    /// Post `make()` every `period`, first after one full period.
    ///
    /// Stops by itself once the page loop is gone.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime or if `period` is zero.
    pub fn every<F>(&self, period: Duration, make: F) -> TaskHandle
    where
        F: Fn() -> E + Send + 'static,
    {
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !post(&events, make()) {
                    tracing::trace!("Repeating timer stopped, page closed");
                    break;
                }
            }
        });
        TaskHandle { task }
    }
}

fn post<E>(events: &WeakUnboundedSender<E>, event: E) -> bool {
    events
        .upgrade()
        .is_some_and(|sender| sender.send(event).is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn drain<E>(rx: &mut mpsc::UnboundedReceiver<E>) -> Vec<E> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(&tx);

        let handle = scheduler.after(Duration::from_millis(100), "done");
        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(drain(&mut rx).is_empty());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(drain(&mut rx), ["done"]);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_fires_each_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(&tx);

        let _handle = scheduler.every(Duration::from_millis(100), || 1u8);
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(drain(&mut rx), [1, 1, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(&tx);

        let handle = scheduler.every(Duration::from_millis(100), || ());
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(&tx);

        drop(scheduler.after(Duration::from_millis(10), ()));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_does_not_keep_channel_open() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let scheduler = Scheduler::new(&tx);
        let handle = scheduler.every(Duration::from_millis(10), || ());

        drop(tx);
        assert!(rx.recv().await.is_none());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handle.is_finished());
    }
}
