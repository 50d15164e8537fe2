//! In-process aggregate store.
//!
//! Clones share one underlying map, so several coordinators can write to
//! the same store the way several browser tabs write to one backend.

use super::{check_write, CampaignStore, StoreError, StoreResult};
use crate::model::campaign::{Campaign, CampaignId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct MemoryCampaignStore {
    documents: Arc<Mutex<BTreeMap<CampaignId, Campaign>>>,
}

impl MemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, BTreeMap<CampaignId, Campaign>>> {
        self.documents
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(
        &self,
        id: CampaignId,
        campaign: &Campaign,
        expected_revision: Option<u64>,
    ) -> StoreResult<Campaign> {
        check_write(id, campaign)?;
        let mut documents = self.lock()?;
        let stored = documents.get(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(expected) = expected_revision {
            if stored.revision != expected {
                return Err(StoreError::Conflict {
                    id,
                    expected,
                    actual: stored.revision,
                });
            }
        }

        let mut next = campaign.clone();
        next.revision = stored.revision + 1;
        documents.insert(id, next.clone());
        Ok(next)
    }
}

impl CampaignStore for MemoryCampaignStore {
    fn fetch(&self, id: CampaignId) -> StoreResult<Campaign> {
        self.lock()?.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn fetch_all_for_user(&self, username: &str) -> StoreResult<Vec<Campaign>> {
        let mut campaigns: Vec<Campaign> = self
            .lock()?
            .values()
            .filter(|campaign| campaign.is_member(username))
            .cloned()
            .collect();
        campaigns.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(campaigns)
    }

    fn create(&self, campaign: &Campaign) -> StoreResult<Campaign> {
        check_write(campaign.id, campaign)?;
        let mut documents = self.lock()?;
        if documents.contains_key(&campaign.id) {
            return Err(StoreError::AlreadyExists(campaign.id));
        }
        let mut created = campaign.clone();
        created.revision = 1;
        documents.insert(created.id, created.clone());
        Ok(created)
    }

    fn replace(&self, id: CampaignId, campaign: &Campaign) -> StoreResult<Campaign> {
        self.write(id, campaign, None)
    }

    fn replace_if_revision(
        &self,
        id: CampaignId,
        campaign: &Campaign,
        expected_revision: u64,
    ) -> StoreResult<Campaign> {
        self.write(id, campaign, Some(expected_revision))
    }
}
