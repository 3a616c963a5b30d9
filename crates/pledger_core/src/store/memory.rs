//! In-memory campaign store.
//!
//! Mirrors the SQLite store's contract without durability. Used by tests
//! and by tooling that only needs an ephemeral ledger.

use crate::model::campaign::{Campaign, CampaignId};
use crate::store::{CampaignStore, StoreResult};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Campaign store held entirely in process memory, ordered by key.
#[derive(Debug, Default)]
pub struct MemoryCampaignStore {
    records: Mutex<BTreeMap<CampaignId, Campaign>>,
}

impl MemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<CampaignId, Campaign>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CampaignStore for MemoryCampaignStore {
    fn get(&self, id: &CampaignId) -> StoreResult<Option<Campaign>> {
        Ok(self.lock().get(id).cloned())
    }

    fn insert(&self, id: CampaignId, campaign: &Campaign) -> StoreResult<Option<Campaign>> {
        Ok(self.lock().insert(id, campaign.clone()))
    }

    fn remove(&self, id: &CampaignId) -> StoreResult<Option<Campaign>> {
        Ok(self.lock().remove(id))
    }
}
