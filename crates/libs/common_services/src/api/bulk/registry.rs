use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Photos currently owned by a running bulk job. Two jobs never hold the same photo.
#[derive(Debug, Clone, Default)]
pub struct BulkIndexRegistry {
    claimed: Arc<Mutex<HashSet<String>>>,
}

impl BulkIndexRegistry {
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked, every update is a single insert/remove.
        self.claimed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims all `photo_ids` at once, or none of them.
    ///
    /// # Errors
    /// The number of requested photos that another job already holds.
    pub fn claim(&self, photo_ids: &[String]) -> Result<BulkClaim, usize> {
        let mut claimed = self.lock();
        let overlapping = photo_ids.iter().filter(|id| claimed.contains(*id)).count();
        if overlapping > 0 {
            return Err(overlapping);
        }
        let photo_ids: HashSet<String> = photo_ids.iter().cloned().collect();
        claimed.extend(photo_ids.iter().cloned());
        Ok(BulkClaim {
            registry: self.clone(),
            photo_ids,
        })
    }

    #[must_use]
    pub fn is_claimed(&self, photo_id: &str) -> bool {
        self.lock().contains(photo_id)
    }

    #[must_use]
    pub fn claimed_count(&self) -> usize {
        self.lock().len()
    }
}

/// Releases its photos when dropped.
#[derive(Debug)]
pub struct BulkClaim {
    registry: BulkIndexRegistry,
    photo_ids: HashSet<String>,
}

impl BulkClaim {
    #[must_use]
    pub fn len(&self) -> usize {
        self.photo_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.photo_ids.is_empty()
    }
}

impl Drop for BulkClaim {
    fn drop(&mut self) {
        let mut claimed = self.registry.lock();
        for id in &self.photo_ids {
            claimed.remove(id);
        }
    }
}
