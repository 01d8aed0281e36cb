//! Per-property critical sections
//!
//! The availability flag of a property and the set of Active leases
//! referencing it form one shared resource. Lifecycle mutations serialize
//! on the property id through this registry; operations against different
//! properties proceed fully in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Registry of one mutex per property id
///
/// Lock handles are created lazily; entries nobody holds a handle to are
/// evicted on the next lookup, so the map tracks only properties with an
/// operation in flight. The map itself is only held long enough to clone
/// a handle out.
#[derive(Debug, Default)]
pub struct PropertyLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PropertyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock handle for a property id
    pub fn handle(&self, property_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        // A strong count of 1 means only the map holds the entry; any
        // thread inside the critical section keeps its clone alive.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(property_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
