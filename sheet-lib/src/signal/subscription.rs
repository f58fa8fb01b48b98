//! Subscription guard

use std::sync::Weak;

pub(super) trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

/// Keeps a signal callback registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    target: Option<(Weak<dyn Detach>, u64)>,
}

impl Subscription {
    pub(super) fn new(target: Weak<dyn Detach>, id: u64) -> Self {
        Self {
            target: Some((target, id)),
        }
    }

    /// Unsubscribes now.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some((target, id)) = self.target.take()
            && let Some(target) = target.upgrade()
        {
            target.detach(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.target.is_some())
            .finish()
    }
}
