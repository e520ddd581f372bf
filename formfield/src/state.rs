use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

/// Reactive state cell with interior mutability.
///
/// `State<T>` is a shared handle: cloning it yields another handle to the
/// same cell. Writes mark the cell dirty and notify every subscribed
/// listener with a snapshot of the new value.
///
/// Listeners run synchronously on the writing thread, after the write lock
/// has been released, so a listener is free to read this cell, write other
/// cells, or drop its own [`Subscription`].
///
/// # Example
///
/// ```
/// use formfield::state::State;
///
/// let name = State::new(String::new());
/// let _sub = name.subscribe(|v| println!("name is now {v}"));
/// name.set("Ada".to_string());
/// assert_eq!(name.get(), "Ada");
/// ```
pub struct State<T> {
    inner: Arc<RwLock<T>>,
    dirty: Arc<AtomicBool>,
    listeners: Arc<Mutex<Listeners<T>>>,
}

impl<T> State<T> {
    /// Create a new state with the given value
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
            dirty: Arc::new(AtomicBool::new(false)),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Read the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    /// Check if the state has been modified since last check
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Number of live subscriptions on this cell
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .map(|guard| guard.entries.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().entries.len())
    }

    /// Whether two handles point at the same cell
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn snapshot_listeners(&self) -> Vec<Listener<T>> {
        let guard = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }
}

impl<T: Clone> State<T> {
    /// Get a clone of the current value
    pub fn get(&self) -> T {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Set a new value and notify listeners
    pub fn set(&self, value: T) {
        let snapshot = value.clone();
        if let Ok(mut guard) = self.inner.write() {
            *guard = value;
            self.dirty.store(true, Ordering::SeqCst);
        } else {
            return;
        }
        self.notify(&snapshot);
    }

    /// Update the value using a closure and notify listeners
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let snapshot = match self.inner.write() {
            Ok(mut guard) => {
                f(&mut guard);
                self.dirty.store(true, Ordering::SeqCst);
                guard.clone()
            }
            Err(_) => return,
        };
        self.notify(&snapshot);
    }

    /// Notify listeners with the value the cell holds right now.
    pub(crate) fn notify_current(&self) {
        let snapshot = self.get();
        self.notify(&snapshot);
    }

    fn notify(&self, value: &T) {
        for listener in self.snapshot_listeners() {
            listener(value);
        }
    }
}

impl<T: Clone + PartialEq> State<T> {
    /// Set a new value only if it differs from the current one.
    ///
    /// Returns `true` if the value changed (and listeners were notified).
    pub fn set_if_changed(&self, value: T) -> bool {
        let snapshot = match self.inner.write() {
            Ok(mut guard) => {
                if *guard == value {
                    return false;
                }
                *guard = value;
                self.dirty.store(true, Ordering::SeqCst);
                guard.clone()
            }
            Err(_) => return false,
        };
        self.notify(&snapshot);
        true
    }

    /// Write without notifying. Returns `true` if the value changed; the
    /// caller is expected to follow up with `notify_current`.
    pub(crate) fn replace_quietly(&self, value: T) -> bool {
        match self.inner.write() {
            Ok(mut guard) => {
                if *guard == value {
                    return false;
                }
                *guard = value;
                self.dirty.store(true, Ordering::SeqCst);
                true
            }
            Err(_) => false,
        }
    }
}

impl<T: 'static> State<T> {
    /// Register a listener that runs after every write.
    ///
    /// The listener stays registered for as long as the returned
    /// [`Subscription`] is alive.
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut guard = self
                .listeners
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let id = guard.next_id;
            guard.next_id += 1;
            guard.entries.push((id, Arc::new(f)));
            id
        };

        let listeners: Weak<Mutex<Listeners<T>>> = Arc::downgrade(&self.listeners);
        Subscription::from_fn(move || {
            if let Some(listeners) = listeners.upgrade() {
                let mut guard = listeners
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                guard.entries.retain(|(entry, _)| *entry != id);
            }
        })
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T: Default> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|value| {
            f.debug_struct("State")
                .field("value", value)
                .field("dirty", &self.is_dirty())
                .field("listeners", &self.listener_count())
                .finish()
        })
    }
}

type Unsubscribe = Box<dyn FnOnce() + Send + Sync>;

/// Handle for a registered listener.
///
/// Dropping the handle removes the listener.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Default)]
pub struct Subscription {
    unsubscribers: Vec<Unsubscribe>,
}

impl Subscription {
    fn from_fn(f: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribers: vec![Box::new(f)],
        }
    }

    /// Merge several subscriptions into a single handle
    pub fn combine(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let mut unsubscribers = Vec::new();
        for mut sub in subscriptions {
            unsubscribers.append(&mut sub.unsubscribers);
        }
        Self { unsubscribers }
    }

    /// Remove the listener(s) now
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Whether this handle still owns any listener
    pub fn is_active(&self) -> bool {
        !self.unsubscribers.is_empty()
    }

    fn release(&mut self) {
        for unsubscribe in self.unsubscribers.drain(..) {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("listeners", &self.unsubscribers.len())
            .finish()
    }
}
