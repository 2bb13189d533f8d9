//! Repository port traits for campaign storage.
//!
//! Each port returns fully materialized trees: a chapter comes back with its
//! locations, events, NPCs and so on already attached.
//!
//! Changes to an existing root go through `update`, which applies the
//! mutation to the stored record atomically. A failed mutation leaves the
//! record untouched. `save` writes a whole record and is meant for creating
//! roots or replacing them wholesale.

use async_trait::async_trait;
use lorekeep_domain::*;

use super::error::RepoError;

/// In-place change to a stored root, applied while the store holds it.
/// It must not call back into the repository.
pub type Mutation<T> = Box<dyn FnOnce(&mut T) -> Result<(), RepoError> + Send>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepo: Send + Sync {
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError>;
    async fn save(&self, campaign: &Campaign) -> Result<(), RepoError>;
    async fn delete(&self, id: CampaignId) -> Result<(), RepoError>;
    /// Campaigns the user masters or plays in.
    async fn list_for_member(&self, user_id: &UserId) -> Result<Vec<Campaign>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChapterRepo: Send + Sync {
    async fn get(&self, id: ChapterId) -> Result<Option<Chapter>, RepoError>;
    /// Ordered by `order`, then title.
    async fn list_for_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Chapter>, RepoError>;
    async fn save(&self, chapter: &Chapter) -> Result<(), RepoError>;
    /// Returns the record as stored after the mutation.
    async fn update(
        &self,
        id: ChapterId,
        mutate: Mutation<Chapter>,
    ) -> Result<Chapter, RepoError>;
    async fn delete(&self, id: ChapterId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WikiRepo: Send + Sync {
    async fn get(&self, id: WikiEntryId) -> Result<Option<WikiEntry>, RepoError>;
    async fn list_for_campaign(&self, campaign_id: CampaignId)
        -> Result<Vec<WikiEntry>, RepoError>;
    async fn save(&self, entry: &WikiEntry) -> Result<(), RepoError>;
    async fn update(
        &self,
        id: WikiEntryId,
        mutate: Mutation<WikiEntry>,
    ) -> Result<WikiEntry, RepoError>;
    async fn delete(&self, id: WikiEntryId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapRepo: Send + Sync {
    async fn get(&self, id: MapId) -> Result<Option<GameMap>, RepoError>;
    async fn list_for_campaign(&self, campaign_id: CampaignId) -> Result<Vec<GameMap>, RepoError>;
    async fn save(&self, map: &GameMap) -> Result<(), RepoError>;
    async fn update(&self, id: MapId, mutate: Mutation<GameMap>) -> Result<GameMap, RepoError>;
    async fn delete(&self, id: MapId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionLogRepo: Send + Sync {
    async fn get(&self, id: SessionLogId) -> Result<Option<SessionLog>, RepoError>;
    /// Most recently played first.
    async fn list_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<SessionLog>, RepoError>;
    async fn save(&self, log: &SessionLog) -> Result<(), RepoError>;
    async fn update(
        &self,
        id: SessionLogId,
        mutate: Mutation<SessionLog>,
    ) -> Result<SessionLog, RepoError>;
    async fn delete(&self, id: SessionLogId) -> Result<(), RepoError>;
}
