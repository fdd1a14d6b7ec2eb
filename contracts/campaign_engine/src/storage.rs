//! # Storage
//!
//! In-memory campaign store with one lock per campaign.
//!
//! | Lock                         | Guards                              | Held for            |
//! |------------------------------|-------------------------------------|---------------------|
//! | `RwLock<Inner>`              | id counter + campaign map           | lookups and inserts |
//! | `Mutex<Campaign>` (per item) | one campaign's full ledger          | one operation       |
//!
//! The map lock is released before a campaign lock is taken, so operations
//! on different campaigns never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::errors::{Error, Result};
use crate::types::{Campaign, CampaignId};

/// Shared handle to one campaign.
pub type CampaignHandle = Arc<Mutex<Campaign>>;

#[derive(Debug, Default)]
struct Inner {
    next_id: CampaignId,
    campaigns: HashMap<CampaignId, CampaignHandle>,
}

#[derive(Debug, Default)]
pub struct CampaignStore {
    inner: RwLock<Inner>,
}

impl CampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a campaign with the next sequential id and store it.
    ///
    /// The id is only consumed when `build` succeeds.
    pub fn insert_with<F>(&self, build: F) -> Result<CampaignId>
    where
        F: FnOnce(CampaignId) -> Result<Campaign>,
    {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = inner.next_id;
        let campaign = build(id)?;
        inner.next_id = id.checked_add(1).ok_or(Error::Overflow)?;
        inner.campaigns.insert(id, Arc::new(Mutex::new(campaign)));
        Ok(id)
    }

    pub fn load(&self, id: CampaignId) -> Result<CampaignHandle> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .campaigns
            .get(&id)
            .cloned()
            .ok_or(Error::CampaignNotFound(id))
    }

    pub fn count(&self) -> u64 {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.next_id
    }
}

/// Lock a campaign. Campaign operations commit only after validation, so a
/// poisoned campaign is still consistent and is taken over as-is.
pub fn lock(handle: &CampaignHandle) -> MutexGuard<'_, Campaign> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}
