//! Per-template write serialization.
//!
//! Every read-modify-write on a template's records (content versions,
//! sharing record, usage statistics) runs while holding that template's
//! lock. Different templates never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use replydesk_core::types::TemplateId;
use tokio::sync::OwnedMutexGuard;

/// Number of idle entries tolerated before the map is pruned.
const PRUNE_THRESHOLD: usize = 1024;

/// A map of async mutexes keyed by template id.
#[derive(Default)]
pub struct KeyedLocks {
    inner: Mutex<HashMap<TemplateId, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`. The lock is held until the
    /// returned guard is dropped.
    pub async fn lock(&self, id: TemplateId) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            if map.len() >= PRUNE_THRESHOLD {
                // Only the map holds a reference: nobody owns or awaits it.
                map.retain(|_, m| Arc::strong_count(m) > 1);
            }
            Arc::clone(map.entry(id).or_default())
        };
        entry.lock_owned().await
    }

    /// Number of ids currently tracked.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
