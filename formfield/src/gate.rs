//! Activation gating: keep validation off until a field first loses focus.
//!
//! An [`ActivationGate`] watches a focus cell. Arming the gate closes the
//! field's `can_validate` gate and starts an activation cycle; the first
//! time focus is observed to be `false` during the cycle, `can_validate` is
//! opened (it is never closed by the gate itself), the activation hook runs
//! once, and the watch detaches. Further blurs do nothing until the gate is
//! armed again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::state::{State, Subscription};

type Hook = Arc<dyn Fn() + Send + Sync>;

/// Opens a `can_validate` cell on the first blur of each activation cycle.
///
/// Dropping the gate stops the watch.
pub struct ActivationGate {
    focus: State<bool>,
    target: State<bool>,
    hook: Option<Hook>,
    activations: Arc<AtomicU64>,
    watch: Arc<Mutex<Option<Subscription>>>,
}

impl ActivationGate {
    /// Create a disarmed gate between `focus` and `can_validate`.
    pub fn new(focus: &State<bool>, can_validate: &State<bool>) -> Self {
        Self {
            focus: focus.clone(),
            target: can_validate.clone(),
            hook: None,
            activations: Arc::new(AtomicU64::new(0)),
            watch: Arc::new(Mutex::new(None)),
        }
    }

    /// Run `hook` each time the gate activates.
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Start an activation cycle: close `can_validate` and watch for the
    /// next blur. Re-arming an armed gate restarts the cycle.
    pub fn arm(&self) {
        self.target.set_if_changed(false);

        let target = self.target.clone();
        let hook = self.hook.clone();
        let activations = Arc::clone(&self.activations);
        let watch = Arc::downgrade(&self.watch);

        let subscription = self.focus.subscribe(move |&focused| {
            if focused {
                return;
            }
            // Detach first so a re-entrant blur cannot activate twice.
            let Some(watch) = watch.upgrade() else {
                return;
            };
            let detached = watch
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .take();
            let Some(detached) = detached else {
                return;
            };
            drop(detached);

            let current = target.get();
            target.set_if_changed(current || !focused);
            let count = activations.fetch_add(1, Ordering::SeqCst) + 1;
            log::trace!("[gate] activated on blur (activation #{})", count);
            if let Some(hook) = &hook {
                hook();
            }
        });

        let previous = self
            .watch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(subscription);
        drop(previous);
    }

    /// Stop watching without touching `can_validate`.
    pub fn disarm(&self) {
        let previous = self
            .watch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        drop(previous);
    }

    /// Whether the gate is waiting for a blur
    pub fn is_armed(&self) -> bool {
        self.watch
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// How many times the gate has activated
    pub fn activations(&self) -> u64 {
        self.activations.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ActivationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationGate")
            .field("armed", &self.is_armed())
            .field("activations", &self.activations())
            .finish_non_exhaustive()
    }
}
