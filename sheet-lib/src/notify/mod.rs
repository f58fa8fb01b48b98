//! User-visible notification sink

use std::sync::Mutex;

/// Receives user-visible messages. Fire-and-forget: nothing is acknowledged.
pub trait Notifier: Send + Sync {
    /// Reports an error to the user.
    fn error(&self, message: &str);
}

/// Notifier that forwards every message to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        log::error!("{}", message);
    }
}

/// Notifier that keeps messages in memory, for embedders that render their
/// own toasts and for tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    errors: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every error reported so far.
    pub fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Removes and returns every error reported so far.
    pub fn drain(&self) -> Vec<String> {
        match self.errors.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for MemoryNotifier {
    fn error(&self, message: &str) {
        log::error!("{}", message);
        match self.errors.lock() {
            Ok(mut guard) => guard.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
