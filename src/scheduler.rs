//! Debouncing of viewport-change notifications.
//!
//! `Debouncer` is the timer state machine: every notification pushes a single
//! pending deadline forward, and polling at or after the deadline fires once.
//! `UpdateScheduler` drives a `Debouncer` from a tokio task and emits one
//! trigger per quiet period on a channel.

use std::{ops::Add, time::Duration};

use tokio::{
    sync::{mpsc, oneshot},
    task::{JoinError, JoinHandle},
    time::{sleep_until, Instant},
};
use tracing::{debug, trace, warn};

/// Monotonic timestamp the debouncer can schedule against.
pub trait Tick: Copy + Ord + Add<Duration, Output = Self> {}

impl<T: Copy + Ord + Add<Duration, Output = T>> Tick for T {}

/// Single pending-fire deadline, reset on every notification.
#[derive(Debug, Clone)]
pub struct Debouncer<T = Instant> {
    window: Duration,
    deadline: Option<T>,
    closed: bool,
}

impl<T: Tick> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None, closed: false }
    }

    #[inline] pub fn window(&self) -> Duration { self.window }

    /// Pending fire time, if any.
    #[inline] pub fn deadline(&self) -> Option<T> { self.deadline }

    #[inline] pub fn is_pending(&self) -> bool { self.deadline.is_some() }

    #[inline] pub fn is_closed(&self) -> bool { self.closed }

    /// Record a notification at `now`; returns false once shut down.
    pub fn notify(&mut self, now: T) -> bool {
        if self.closed { return false }
        self.deadline = Some(now + self.window);
        true
    }

    /// Fire if the quiet period has elapsed. Each deadline fires at most once.
    pub fn poll(&mut self, now: T) -> bool {
        match self.deadline {
            Some(deadline) if !self.closed && now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending deadline and ignore everything afterwards.
    pub fn shutdown(&mut self) {
        self.deadline = None;
        self.closed = true;
    }
}

/// Sending half handed to the viewport provider.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<()>,
}

impl Notifier {
    /// Signal a viewport change; returns false once the scheduler has stopped.
    pub fn notify(&self) -> bool { self.tx.send(()).is_ok() }
}

/// Tokio task that turns bursts of notifications into single triggers.
#[derive(Debug)]
pub struct UpdateScheduler {
    notifier: Notifier,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl UpdateScheduler {
    /// Start the debounce task on the current runtime. Triggers arrive on the
    /// returned receiver, `window` after the last notification of each burst.
    pub fn spawn(window: Duration) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let task = tokio::spawn(run(Debouncer::new(window), notify_rx, trigger_tx, cancel_rx));

        let scheduler = Self {
            notifier: Notifier { tx: notify_tx },
            cancel: Some(cancel_tx),
            task: Some(task),
        };
        (scheduler, trigger_rx)
    }

    /// A cloneable handle for sending notifications.
    pub fn notifier(&self) -> Notifier { self.notifier.clone() }

    #[inline] pub fn notify(&self) -> bool { self.notifier.notify() }

    /// Cancel any pending trigger and wait for the task to exit.
    /// No trigger is sent after this returns.
    pub async fn shutdown(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(task) = self.task.take() {
            joined_cleanly(task.await);
        }
    }
}

impl Drop for UpdateScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// False (and a warning) when the task panicked or was aborted.
fn joined_cleanly(result: Result<(), JoinError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) if e.is_panic() => {
            warn!(error = %e, "update scheduler task panicked");
            false
        }
        Err(e) => {
            warn!(error = %e, "update scheduler task did not finish");
            false
        }
    }
}

async fn run(
    mut debouncer: Debouncer<Instant>,
    mut notifications: mpsc::UnboundedReceiver<()>,
    triggers: mpsc::UnboundedSender<()>,
    mut cancel: oneshot::Receiver<()>,
) {
    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            biased;
            _ = &mut cancel => break,
            received = notifications.recv() => match received {
                Some(()) => {
                    debouncer.notify(Instant::now());
                    trace!("viewport notification");
                }
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if debouncer.poll(Instant::now()) && triggers.send(()).is_err() { break }
            }
        }
    }

    debouncer.shutdown();
    debug!("update scheduler stopped");
}
