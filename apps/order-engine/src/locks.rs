//! # Per-Variant Locks
//!
//! Serializes order placement per variant inside one process.
//!
//! ## Locking Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  order X: [RING-1, NECK-2]        order Y: [NECK-2, RING-1]             │
//! │                                                                         │
//! │  both sort → [NECK-2, RING-1]                                           │
//! │                                                                         │
//! │  X: lock NECK-2 ✓  lock RING-1 ✓  allocate … commit  release            │
//! │  Y: lock NECK-2 ⏳ ─────────────────────────────────► ✓  lock RING-1 ✓   │
//! │                                                                         │
//! │  Same acquisition order everywhere → no deadlock.                       │
//! │  Orders on disjoint variants never wait on each other.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Guards are owned (`'static`), so they can move into the spawned commit
//! task and outlive the caller's future.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

type Registry = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Registry of one async mutex per variant id.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct VariantLocks {
    registry: Registry,
}

/// Held locks of one order. Releasing drops unused registry entries.
#[derive(Debug)]
pub struct VariantGuards {
    variant_ids: Vec<String>,
    guards: Vec<OwnedMutexGuard<()>>,
    registry: Registry,
}

impl VariantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks every distinct id in `variant_ids`, in sorted order.
    pub async fn acquire<'a>(&self, variant_ids: impl IntoIterator<Item = &'a str>) -> VariantGuards {
        let sorted: BTreeSet<&str> = variant_ids.into_iter().collect();
        let mut guards = Vec::with_capacity(sorted.len());

        for id in &sorted {
            let lock = {
                let mut map = self.registry.lock().unwrap_or_else(|e| e.into_inner());
                map.entry(id.to_string()).or_default().clone()
            };
            trace!(variant_id = %id, "Waiting for variant lock");
            guards.push(lock.lock_owned().await);
        }

        VariantGuards {
            variant_ids: sorted.into_iter().map(str::to_string).collect(),
            guards,
            registry: self.registry.clone(),
        }
    }

    /// Number of variants with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.registry.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl VariantGuards {
    /// Variant ids held, sorted.
    pub fn variant_ids(&self) -> &[String] {
        &self.variant_ids
    }
}

impl Drop for VariantGuards {
    fn drop(&mut self) {
        self.guards.clear();

        let mut map = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        for id in &self.variant_ids {
            // only the registry holds it: nobody is waiting
            if map.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
                map.remove(id);
            }
        }
    }
}
