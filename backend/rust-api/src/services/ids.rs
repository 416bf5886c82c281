use std::sync::atomic::{AtomicI64, Ordering};

use crate::models::EntityId;

/// Source of record identifiers. One generator is shared by every table, so
/// an id is unique across the whole store, not just within its entity type.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> EntityId;

    /// Guarantees that no id below `floor` is issued from now on.
    fn reserve_below(&self, floor: EntityId);
}

/// Monotonic counter starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicI64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: EntityId) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> EntityId {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    fn reserve_below(&self, floor: EntityId) {
        self.next.fetch_max(floor, Ordering::SeqCst);
    }
}
