use super::{CacheSnapshot, CacheStore};
use crate::error::Result;
use parking_lot::Mutex;

/// In-process cache; contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    snapshot: Mutex<CacheSnapshot>,
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    /// Copy of what was last saved.
    pub fn snapshot(&self) -> CacheSnapshot {
        self.snapshot.lock().clone()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self) -> Result<CacheSnapshot> {
        Ok(self.snapshot.lock().clone())
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        *self.snapshot.lock() = snapshot.clone();
        Ok(())
    }
}
