//! Reactive field state.
//!
//! A [`FieldState`] owns a value and the validators that apply to it.
//! Writing the value schedules a validation run (rate-limited, and only
//! while the `can_validate` gate is open); the run's outcome is written back
//! into the field's error flags unless a newer run has started meanwhile.

mod status;
mod value;

pub use status::{FieldId, FieldStatus};
pub use value::FieldValue;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::task::{AbortHandle, JoinHandle};

use crate::config::FieldConfig;
use crate::effect::Effect;
use crate::gate::ActivationGate;
use crate::state::{State, Subscription};
use crate::validation::{ChainError, ValidationOutcome, Validator, ValidatorChain};

/// Request bookkeeping. The counter identifies the latest request; only a
/// result carrying the current counter value may be committed.
#[derive(Debug, Default)]
struct RequestLedger {
    counter: u64,
    in_flight: Option<AbortHandle>,
    disposed: bool,
}

/// A started request with the snapshot it validates.
struct Request<T> {
    id: u64,
    value: T,
    validators: Arc<[Validator<T>]>,
}

type RunResult = Result<ValidationOutcome, ChainError>;

/// Validation flags, written together so observers never see a mix of two
/// states.
#[derive(Debug, Clone, Default, PartialEq)]
struct Flags {
    error: Option<String>,
    validating: bool,
    has_been_validated: bool,
    last_fault: Option<ChainError>,
}

impl Flags {
    fn has_error(&self) -> bool {
        self.error.as_ref().is_some_and(|msg| !msg.is_empty())
    }
}

struct FieldInner<T> {
    id: FieldId,
    config: FieldConfig,
    value: State<T>,
    validators: State<Arc<[Validator<T>]>>,
    // Bumped on validator changes once the list has been read by a run.
    revalidate: State<u64>,
    validators_tracked: AtomicBool,
    can_validate: State<bool>,
    // Only written while the ledger is held; listeners are notified after
    // it is released.
    flags: State<Flags>,
    ledger: Mutex<RequestLedger>,
    // Lock-free mirrors of the ledger for readers.
    requests: AtomicU64,
    disposed: AtomicBool,
    effect: Mutex<Option<Effect>>,
}

/// The reactive state of a single form field.
///
/// `FieldState` is a cheap-to-clone handle; clones share the same field.
/// It must be created inside a Tokio runtime, since change reactions and
/// validation runs execute as Tokio tasks.
///
/// Result commits are ordered by request, not by completion: a run
/// started before a newer one never overwrites the newer one's result,
/// however late it finishes.
///
/// # Example
///
/// ```no_run
/// use formfield::field::FieldState;
/// use formfield::validation::{email, rules};
///
/// # async fn demo() {
/// let field = FieldState::new(String::new()).with_validators([
///     rules::required("Email is required"),
///     email(),
/// ]);
///
/// field.set_value("ada@example.com".to_string());
/// // ...after the rate-limit window and the run complete:
/// assert!(field.has_success());
/// # }
/// ```
pub struct FieldState<T> {
    inner: Arc<FieldInner<T>>,
}

impl<T> FieldInner<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn ledger(&self) -> MutexGuard<'_, RequestLedger> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Rewrite the flags without notifying. Must be called with the ledger held.
    fn write_flags(&self, f: impl FnOnce(&mut Flags)) -> bool {
        let mut flags = self.flags.get();
        f(&mut flags);
        self.flags.replace_quietly(flags)
    }

    /// Notify flag listeners. Must be called after the ledger is released.
    fn publish(&self, changed: bool) {
        if changed {
            self.flags.notify_current();
        }
    }

    /// Reaction to a coalesced change of value, validators or gate.
    fn on_change(self: &Arc<Self>) {
        if !self.can_validate.get() {
            log::trace!("[field {}] change ignored, validation is gated", self.id);
            return;
        }
        self.validators_tracked.store(true, Ordering::SeqCst);
        // The run commits on its own; its handle is detached.
        if self.start().is_none() {
            log::trace!("[field {}] nothing to run", self.id);
        }
    }

    /// Start a request and spawn its run.
    ///
    /// The run commits its own result, so it completes even when whoever
    /// started it stops waiting.
    fn start(self: &Arc<Self>) -> Option<JoinHandle<RunResult>> {
        let mut ledger = self.ledger();
        let (request, changed) = self.begin(&mut ledger);

        let task = request.map(|request| {
            let chain = ValidatorChain::new(self.config.fault_policy);
            let weak: Weak<Self> = Arc::downgrade(self);
            let task = tokio::spawn(async move {
                let result = chain.run(&request.value, &request.validators).await;
                if let Some(inner) = weak.upgrade() {
                    inner.commit(request.id, &result);
                }
                result
            });
            ledger.in_flight = Some(task.abort_handle());
            task
        });

        drop(ledger);
        self.publish(changed);
        task
    }

    /// Start a new request, superseding every earlier one.
    ///
    /// Returns `None` when there is nothing to run: the field was disposed,
    /// or its validator list is empty (in which case the validation flags
    /// are cleared). The flag is true when the flags changed.
    fn begin(&self, ledger: &mut RequestLedger) -> (Option<Request<T>>, bool) {
        if ledger.disposed {
            return (None, false);
        }

        ledger.counter += 1;
        self.requests.store(ledger.counter, Ordering::SeqCst);
        if let Some(previous) = ledger.in_flight.take()
            && self.config.cancel_superseded
        {
            log::trace!("[field {}] aborting superseded run", self.id);
            previous.abort();
        }

        let validators = self.validators.get();
        if validators.is_empty() {
            log::debug!("[field {}] no validators, clearing validation state", self.id);
            let changed = self.write_flags(|flags| *flags = Flags::default());
            return (None, changed);
        }

        log::debug!(
            "[field {}] starting validation request #{} ({} validators)",
            self.id,
            ledger.counter,
            validators.len()
        );
        let changed = self.write_flags(|flags| flags.validating = true);
        let request = Request {
            id: ledger.counter,
            value: self.value.get(),
            validators,
        };
        (Some(request), changed)
    }

    /// Commit the result of request `id` if it is still the latest one.
    fn commit(&self, id: u64, result: &RunResult) -> bool {
        let changed = {
            let mut ledger = self.ledger();
            if ledger.counter != id {
                log::trace!(
                    "[field {}] discarding stale result of request #{} (latest is #{})",
                    self.id,
                    id,
                    ledger.counter
                );
                return false;
            }
            ledger.in_flight = None;

            let (error, fault) = match result {
                Ok(outcome) => (outcome.message().map(str::to_string), None),
                Err(err) => {
                    log::error!("[field {}] validation request #{} failed: {}", self.id, id, err);
                    (Some(self.config.fault_message.clone()), Some(err.clone()))
                }
            };
            self.write_flags(|flags| {
                *flags = Flags {
                    error,
                    validating: false,
                    has_been_validated: true,
                    last_fault: fault,
                }
            })
        };

        self.publish(changed);
        log::debug!("[field {}] committed request #{}", self.id, id);
        true
    }

    /// Invalidate outstanding requests and mark nothing in flight.
    fn supersede_all(&self, ledger: &mut RequestLedger) -> bool {
        ledger.counter += 1;
        self.requests.store(ledger.counter, Ordering::SeqCst);
        if let Some(task) = ledger.in_flight.take() {
            task.abort();
        }
        self.write_flags(|flags| flags.validating = false)
    }
}

impl<T> Drop for FieldInner<T> {
    fn drop(&mut self) {
        if let Ok(ledger) = self.ledger.get_mut()
            && let Some(task) = ledger.in_flight.take()
        {
            task.abort();
        }
    }
}

impl<T> FieldState<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a field with the default configuration.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn new(initial: T) -> Self {
        Self::with_config(initial, FieldConfig::default())
    }

    /// Create a field with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn with_config(initial: T, config: FieldConfig) -> Self {
        let inner = Arc::new(FieldInner {
            id: FieldId::new(),
            value: State::new(initial),
            validators: State::new(Arc::from(Vec::new())),
            revalidate: State::new(0),
            validators_tracked: AtomicBool::new(false),
            can_validate: State::new(config.can_validate),
            flags: State::new(Flags::default()),
            ledger: Mutex::new(RequestLedger::default()),
            requests: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
            effect: Mutex::new(None),
            config,
        });

        let weak = Arc::downgrade(&inner);
        let effect = Effect::builder()
            .watch(&inner.value)
            .watch(&inner.revalidate)
            .watch(&inner.can_validate)
            .rate_limit(inner.config.rate_limit)
            .spawn(move |cx| {
                // The construction-time evaluation never validates.
                if cx.is_initial() {
                    return;
                }
                if let Some(inner) = weak.upgrade() {
                    inner.on_change();
                }
            });

        if let Ok(mut slot) = inner.effect.lock() {
            *slot = Some(effect);
        }
        log::debug!("[field {}] created", inner.id);

        Self { inner }
    }

    /// Builder form of [`set_validators`](Self::set_validators).
    pub fn with_validators(self, validators: impl IntoIterator<Item = Validator<T>>) -> Self {
        self.set_validators(validators);
        self
    }

    /// Replace the validator list. List order is evaluation order.
    ///
    /// Runs already in flight keep the list they started with. Attaching
    /// validators to a field that has never been triggered does not
    /// validate it; after the first triggered change, replacing the list
    /// schedules a run like a value change does.
    pub fn set_validators(&self, validators: impl IntoIterator<Item = Validator<T>>) {
        let validators: Vec<Validator<T>> = validators.into_iter().collect();
        self.inner.validators.set(Arc::from(validators));
        if self.inner.validators_tracked.load(Ordering::SeqCst) {
            self.inner.revalidate.update(|tick| *tick += 1);
        }
    }

    /// The current validator list
    pub fn validators(&self) -> Arc<[Validator<T>]> {
        self.inner.validators.get()
    }

    /// This field's identifier
    pub fn id(&self) -> FieldId {
        self.inner.id
    }

    /// The configuration the field was built with
    pub fn config(&self) -> &FieldConfig {
        &self.inner.config
    }

    // -------------------------------------------------------------------------
    // Value
    // -------------------------------------------------------------------------

    /// Get the current value
    pub fn value(&self) -> T {
        self.inner.value.get()
    }

    /// Write the value. Writing an equal value is a no-op.
    ///
    /// Returns `true` if the value changed.
    pub fn set_value(&self, value: T) -> bool {
        self.inner.value.set_if_changed(value)
    }

    /// The cell holding the value, for two-way binding by a view.
    pub fn value_state(&self) -> State<T> {
        self.inner.value.clone()
    }

    // -------------------------------------------------------------------------
    // Derived state
    // -------------------------------------------------------------------------

    /// The last committed validation error
    pub fn error(&self) -> Option<String> {
        self.inner.flags.with(|flags| flags.error.clone())
    }

    /// True when the last committed error is a non-empty message
    pub fn has_error(&self) -> bool {
        self.inner.flags.with(Flags::has_error)
    }

    /// True when a run has completed and reported no error
    pub fn has_success(&self) -> bool {
        self.inner
            .flags
            .with(|flags| !flags.has_error() && flags.has_been_validated)
    }

    /// True while a run is in flight
    pub fn is_validating(&self) -> bool {
        self.inner.flags.with(|flags| flags.validating)
    }

    /// True once a run has been committed since the last reset
    pub fn has_been_validated(&self) -> bool {
        self.inner.flags.with(|flags| flags.has_been_validated)
    }

    /// Number of requests started so far (including superseded ones)
    pub fn request_count(&self) -> u64 {
        self.inner.requests.load(Ordering::SeqCst)
    }

    /// The fault behind the current error, under [`FaultPolicy::Report`](crate::config::FaultPolicy::Report)
    pub fn last_fault(&self) -> Option<ChainError> {
        self.inner.flags.with(|flags| flags.last_fault.clone())
    }

    // -------------------------------------------------------------------------
    // Gate
    // -------------------------------------------------------------------------

    /// Whether value changes currently trigger validation
    pub fn can_validate(&self) -> bool {
        self.inner.can_validate.get()
    }

    /// Open or close the gate. Opening it validates the current value.
    pub fn set_can_validate(&self, can_validate: bool) {
        self.inner.can_validate.set_if_changed(can_validate);
    }

    /// Open the gate if it is closed; never closes it.
    pub fn enable_validation(&self) {
        self.inner.can_validate.set_if_changed(true);
    }

    /// Close the gate until `focus` first turns false.
    ///
    /// The returned gate must be kept alive for as long as the policy applies.
    #[must_use = "dropping the gate stops watching focus"]
    pub fn gate_until_blur(&self, focus: &State<bool>) -> ActivationGate {
        let gate = ActivationGate::new(focus, &self.inner.can_validate);
        gate.arm();
        gate
    }

    pub(crate) fn can_validate_state(&self) -> &State<bool> {
        &self.inner.can_validate
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Validate the current value now, bypassing the rate limit and the gate.
    ///
    /// The run takes part in request ordering like any other: it supersedes
    /// earlier runs, and its result is only committed if no newer run has
    /// started by the time it finishes. The outcome of this run is returned
    /// either way. A reported fault is returned as the configured fault
    /// message.
    ///
    /// The run executes on its own task: dropping the returned future stops
    /// the wait, not the run, which still commits when it finishes. A run
    /// aborted by a newer one or by [`dispose`](Self::dispose) yields
    /// [`ValidationOutcome::NoError`].
    pub async fn validate(&self) -> ValidationOutcome {
        let Some(task) = self.inner.start() else {
            return ValidationOutcome::NoError;
        };

        match task.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => ValidationOutcome::Error(self.inner.config.fault_message.clone()),
            Err(err) => {
                log::debug!("[field {}] direct validation was cancelled: {}", self.inner.id, err);
                ValidationOutcome::NoError
            }
        }
    }

    /// Replace the value without validating it.
    ///
    /// Closes the gate, supersedes any in-flight run and clears the
    /// validation flags before writing the value.
    pub fn reset(&self, value: T) {
        self.inner.can_validate.set_if_changed(false);
        let changed = {
            let mut ledger = self.inner.ledger();
            let superseded = self.inner.supersede_all(&mut ledger);
            let cleared = self.inner.write_flags(|flags| *flags = Flags::default());
            superseded || cleared
        };
        self.inner.publish(changed);
        self.inner.value.set_if_changed(value);
        log::debug!("[field {}] reset", self.inner.id);
    }

    /// Tear the field down: stop reacting to changes and drop in-flight work.
    ///
    /// Nothing is committed to the field after this returns.
    pub fn dispose(&self) {
        let effect = self
            .inner
            .effect
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        drop(effect);

        let changed = {
            let mut ledger = self.inner.ledger();
            if ledger.disposed {
                return;
            }
            ledger.disposed = true;
            self.inner.disposed.store(true, Ordering::SeqCst);
            self.inner.supersede_all(&mut ledger)
        };
        self.inner.publish(changed);
        log::debug!("[field {}] disposed", self.inner.id);
    }

    /// Whether [`dispose`](Self::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}

impl<T> FieldState<T>
where
    T: FieldValue + Clone + PartialEq + Send + Sync + 'static,
{
    /// True when the value is filled in
    pub fn has_value(&self) -> bool {
        self.inner.value.with(FieldValue::has_value)
    }

    /// Snapshot of the view-facing state
    pub fn status(&self) -> FieldStatus {
        status_of(&self.inner)
    }

    /// Call `f` with a fresh snapshot whenever the view-facing state changes.
    ///
    /// Each transition is delivered once, and a snapshot equal to the
    /// previous one is skipped. `f` runs with no field lock held, so it may
    /// issue commands to the field.
    pub fn subscribe_status<F>(&self, f: F) -> Subscription
    where
        F: Fn(&FieldStatus) + Send + Sync + 'static,
    {
        let inner = Arc::downgrade(&self.inner);
        let last: Mutex<Option<FieldStatus>> = Mutex::new(None);
        let emit = Arc::new(move || {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let status = status_of(&inner);
            {
                let mut last = last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                if last.as_ref() == Some(&status) {
                    return;
                }
                *last = Some(status.clone());
            }
            f(&status);
        });

        let on_value = Arc::clone(&emit);
        Subscription::combine([
            self.inner.value.subscribe(move |_| on_value()),
            self.inner.flags.subscribe(move |_| emit()),
        ])
    }
}

fn status_of<T>(inner: &FieldInner<T>) -> FieldStatus
where
    T: FieldValue + Clone,
{
    let flags = inner.flags.get();
    let has_error = flags.has_error();
    FieldStatus {
        has_value: inner.value.with(FieldValue::has_value),
        has_error,
        has_success: !has_error && flags.has_been_validated,
        error: flags.error,
        validating: flags.validating,
    }
}

impl<T> Clone for FieldState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug + Clone> std::fmt::Debug for FieldState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldState")
            .field("id", &self.inner.id)
            .field("value", &self.inner.value)
            .field("flags", &self.inner.flags.get())
            .field("can_validate", &self.inner.can_validate.get())
            .finish_non_exhaustive()
    }
}
