//! Shared, versioned values with change subscriptions.
//!
//! - [`Signal`]: owner handle; can read, write and subscribe.
//! - [`ReadSignal`]: consumer handle; can only read and subscribe.
//! - [`Subscription`]: guard that unsubscribes when dropped.
//!
//! Writes happen under a lock; subscribers run after the lock is released and
//! receive the post-write snapshot, in registration order. A subscriber may
//! therefore write to other signals, or even to the same one.

mod subscription;

pub use subscription::Subscription;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::Weak;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use subscription::Detach;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Shared<T> {
    value: RwLock<Arc<T>>,
    version: AtomicU64,
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(u64, Callback<T>)>>,
}

impl<T: Send + Sync + 'static> Detach for Shared<T> {
    fn detach(&self, id: u64) {
        match self.subscribers.lock() {
            Ok(mut guard) => guard.retain(|(sub_id, _)| *sub_id != id),
            Err(poisoned) => poisoned.into_inner().retain(|(sub_id, _)| *sub_id != id),
        }
    }
}

/// Reactive value with interior mutability.
///
/// Cheap to clone; clones share the same value and subscribers.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use sheet_lib::signal::Signal;
///
/// let count = Signal::new(0);
/// let seen = Arc::new(AtomicUsize::new(0));
///
/// let seen_in_callback = Arc::clone(&seen);
/// let subscription = count.subscribe(move |value: &i32| {
///     seen_in_callback.store(*value as usize, Ordering::SeqCst);
/// });
///
/// count.set(3);
/// assert_eq!(seen.load(Ordering::SeqCst), 3);
///
/// drop(subscription);
/// count.set(4);
/// assert_eq!(seen.load(Ordering::SeqCst), 3);
/// ```
pub struct Signal<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + Sync + 'static> Signal<T> {
    /// Creates a signal holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                value: RwLock::new(Arc::new(value)),
                version: AtomicU64::new(0),
                next_id: AtomicU64::new(0),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Returns a snapshot of the current value.
    pub fn get(&self) -> Arc<T> {
        self.shared
            .value
            .read()
            .map(|guard| Arc::clone(&*guard))
            .unwrap_or_else(|poisoned| Arc::clone(&*poisoned.into_inner()))
    }

    /// Runs `f` against the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let snapshot = self.get();
        f(&*snapshot)
    }

    /// Returns the number of writes applied so far.
    pub fn version(&self) -> u64 {
        self.shared.version.load(Ordering::SeqCst)
    }

    /// Replaces the value and notifies subscribers.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.shared.value.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            *guard = Arc::new(value);
            self.shared.version.fetch_add(1, Ordering::SeqCst);
        }
        self.notify();
    }

    /// Mutates the value and notifies subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T))
    where
        T: Clone,
    {
        self.modify(|value| {
            f(value);
            true
        });
        self.notify();
    }

    /// Mutates the value; subscribers are notified only if `f` returns `true`.
    ///
    /// `f` must leave the value untouched when it returns `false`.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool
    where
        T: Clone,
    {
        let changed = self.modify(f);
        if changed {
            self.notify();
        }
        changed
    }

    /// Registers a callback invoked after every notified write.
    pub fn subscribe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        match self.shared.subscribers.lock() {
            Ok(mut guard) => guard.push((id, Arc::new(f))),
            Err(poisoned) => poisoned.into_inner().push((id, Arc::new(f))),
        }
        let weak: Weak<dyn Detach> = Arc::downgrade(&self.shared) as Weak<dyn Detach>;
        Subscription::new(weak, id)
    }

    /// Returns a read-only handle to this signal.
    pub fn reader(&self) -> ReadSignal<T> {
        ReadSignal { signal: self.clone() }
    }

    /// Returns a handle that does not keep the signal alive.
    pub fn downgrade(&self) -> WeakSignal<T> {
        WeakSignal {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Mutates the value without notifying. Pair with [`Signal::notify`] once
    /// every lock the caller holds has been released.
    pub(crate) fn modify(&self, f: impl FnOnce(&mut T) -> bool) -> bool
    where
        T: Clone,
    {
        let mut guard = self.shared.value.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let changed = f(Arc::make_mut(&mut *guard));
        if changed {
            self.shared.version.fetch_add(1, Ordering::SeqCst);
        }
        changed
    }

    /// Delivers the current value to every subscriber.
    pub(crate) fn notify(&self) {
        let snapshot = self.get();
        let subscribers: Vec<Callback<T>> = match self.shared.subscribers.lock() {
            Ok(guard) => guard.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
            Err(poisoned) => poisoned.into_inner().iter().map(|(_, cb)| Arc::clone(cb)).collect(),
        };
        for callback in subscribers {
            callback(&*snapshot);
        }
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Default + Send + Sync + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug + Send + Sync + 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}

/// Read-only view of a [`Signal`].
pub struct ReadSignal<T> {
    signal: Signal<T>,
}

impl<T: Send + Sync + 'static> ReadSignal<T> {
    /// Returns a snapshot of the current value.
    pub fn get(&self) -> Arc<T> {
        self.signal.get()
    }

    /// Runs `f` against the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.signal.with(f)
    }

    /// Returns the number of writes applied so far.
    pub fn version(&self) -> u64 {
        self.signal.version()
    }

    /// Registers a callback invoked after every notified write.
    pub fn subscribe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.signal.subscribe(f)
    }
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

impl<T: std::fmt::Debug + Send + Sync + 'static> std::fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.signal.fmt(f)
    }
}

/// Non-owning handle to a [`Signal`], used by subscribers that must not keep
/// their target alive.
pub struct WeakSignal<T> {
    shared: Weak<Shared<T>>,
}

impl<T> WeakSignal<T> {
    /// Returns the signal if it is still alive.
    pub fn upgrade(&self) -> Option<Signal<T>> {
        self.shared.upgrade().map(|shared| Signal { shared })
    }
}

impl<T> Clone for WeakSignal<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}
