//! Per-class advisory run lock.
//!
//! At most one coordinator run per class at a time within this process. The
//! lock is released when the [`ClassRunGuard`] drops, whatever way the run
//! ends.

use std::sync::Arc;

use dashmap::DashSet;

/// Set of classes with a run in progress. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct ClassLocks {
    held: Arc<DashSet<String>>,
}

impl ClassLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `class_id`, or `None` if a run already holds it.
    #[must_use]
    pub fn try_acquire(&self, class_id: &str) -> Option<ClassRunGuard> {
        if self.held.insert(class_id.to_string()) {
            Some(ClassRunGuard {
                held: Arc::clone(&self.held),
                class_id: class_id.to_string(),
            })
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_held(&self, class_id: &str) -> bool {
        self.held.contains(class_id)
    }
}

/// Holds a class lock until dropped.
#[derive(Debug)]
pub struct ClassRunGuard {
    held: Arc<DashSet<String>>,
    class_id: String,
}

impl ClassRunGuard {
    #[must_use]
    pub fn class_id(&self) -> &str {
        &self.class_id
    }
}

impl Drop for ClassRunGuard {
    fn drop(&mut self) {
        self.held.remove(&self.class_id);
    }
}
