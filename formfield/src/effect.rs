//! Rate-limited reactions over state cells.
//!
//! An [`Effect`] re-runs a closure whenever one of the cells it watches is
//! written. Change notifications travel over a small wakeup channel; bursts
//! of notifications collapse into a single evaluation, optionally delayed by
//! a rate-limit window so the closure sees only the latest state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::state::{State, Subscription};

/// Information passed to an effect closure on every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectContext {
    initial: bool,
    run: u64,
}

impl EffectContext {
    /// True only for the evaluation made at construction time.
    pub fn is_initial(&self) -> bool {
        self.initial
    }

    /// Number of evaluations triggered by changes so far (0 for the initial one).
    pub fn run(&self) -> u64 {
        self.run
    }
}

/// Builder for an [`Effect`].
pub struct EffectBuilder {
    tx: mpsc::Sender<()>,
    rx: mpsc::Receiver<()>,
    subscriptions: Vec<Subscription>,
    rate_limit: Duration,
}

impl EffectBuilder {
    /// Re-run the effect whenever `state` is written.
    pub fn watch<T: 'static>(mut self, state: &State<T>) -> Self {
        let tx = self.tx.clone();
        self.subscriptions.push(state.subscribe(move |_| {
            // A full buffer already guarantees a pending evaluation.
            let _ = tx.try_send(());
        }));
        self
    }

    /// Coalesce changes over `window` before evaluating.
    ///
    /// A zero window evaluates as soon as the effect task is scheduled.
    pub fn rate_limit(mut self, window: Duration) -> Self {
        self.rate_limit = window;
        self
    }

    /// Evaluate `f` once now, then after every coalesced change.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn<F>(self, f: F) -> Effect
    where
        F: Fn(&EffectContext) + Send + Sync + 'static,
    {
        let Self {
            tx,
            mut rx,
            subscriptions,
            rate_limit,
        } = self;
        // Only the listeners keep senders alive; once they are gone the task ends.
        drop(tx);

        let f = Arc::new(f);
        f(&EffectContext {
            initial: true,
            run: 0,
        });

        let task = tokio::spawn(async move {
            let mut run = 0;
            while rx.recv().await.is_some() {
                if !rate_limit.is_zero() {
                    tokio::time::sleep(rate_limit).await;
                }
                while rx.try_recv().is_ok() {}

                run += 1;
                f(&EffectContext {
                    initial: false,
                    run,
                });
            }
        });

        Effect {
            subscriptions,
            task: Some(task),
        }
    }
}

/// A running reaction. Dropping it tears the reaction down.
#[derive(Debug)]
pub struct Effect {
    subscriptions: Vec<Subscription>,
    task: Option<JoinHandle<()>>,
}

impl Effect {
    /// Start building an effect
    pub fn builder() -> EffectBuilder {
        let (tx, rx) = mpsc::channel(16);
        EffectBuilder {
            tx,
            rx,
            subscriptions: Vec::new(),
            rate_limit: Duration::ZERO,
        }
    }

    /// Stop reacting: drop all subscriptions and abort the effect task.
    pub fn dispose(&mut self) {
        self.subscriptions.clear();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether [`dispose`](Self::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        self.dispose();
    }
}
