use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use sorcha_core::types::RegisterId;

/// Process-wide table of per-register locks (§5 "fine-grained locks keyed
/// by registerId"). Guards mempool admission, docket sealing, and the
/// pending-registration compare-and-remove.
///
/// Critical sections held under these locks are pure in-memory or sled
/// calls — never an `.await` — so a `parking_lot::Mutex` is appropriate.
#[derive(Default)]
pub struct RegisterLocks {
    table: RwLock<HashMap<RegisterId, Arc<Mutex<()>>>>,
}

impl RegisterLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: RegisterId) -> Arc<Mutex<()>> {
        if let Some(existing) = self.table.read().get(&id) {
            return Arc::clone(existing);
        }
        let mut table = self.table.write();
        Arc::clone(table.entry(id).or_insert_with(|| Arc::new(Mutex::new(()))))
    }

    /// Run `f` while holding the exclusive lock for `id`.
    pub fn with_lock<R>(&self, id: RegisterId, f: impl FnOnce() -> R) -> R {
        let mutex = self.entry(id);
        let _guard = mutex.lock();
        f()
    }
}
