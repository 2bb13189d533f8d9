//! Read-side content use cases.
//!
//! Each query runs the access gate, loads the materialized tree and hands it
//! to the projector. Results are JSON values ready to serialize; nothing
//! downstream filters them further.

use std::sync::Arc;

use serde_json::Value;

use lorekeep_domain::{
    project_all, project_entity, CampaignId, CampaignTree, ChapterId, MapId, Projectable,
    SessionLogId, UserId, Viewer, WikiEntryId,
};

use crate::infrastructure::ports::{ChapterRepo, MapRepo, SessionLogRepo, WikiRepo};
use crate::use_cases::access::CampaignAccess;

use super::error::ContentError;

pub struct ContentQueries {
    access: Arc<CampaignAccess>,
    chapters: Arc<dyn ChapterRepo>,
    wiki: Arc<dyn WikiRepo>,
    maps: Arc<dyn MapRepo>,
    session_logs: Arc<dyn SessionLogRepo>,
}

impl ContentQueries {
    pub fn new(
        access: Arc<CampaignAccess>,
        chapters: Arc<dyn ChapterRepo>,
        wiki: Arc<dyn WikiRepo>,
        maps: Arc<dyn MapRepo>,
        session_logs: Arc<dyn SessionLogRepo>,
    ) -> Self {
        Self {
            access,
            chapters,
            wiki,
            maps,
            session_logs,
        }
    }

    /// Campaigns the user belongs to, each projected for that user.
    pub async fn list_campaigns(&self, user_id: &UserId) -> Result<Vec<Value>, ContentError> {
        let memberships = self.access.memberships(user_id).await?;
        let mut projected = Vec::with_capacity(memberships.len());
        for (campaign, viewer) in &memberships {
            if let Some(value) = project_entity(campaign, viewer)? {
                projected.push(value);
            }
        }
        Ok(projected)
    }

    /// The whole campaign tree as `user_id` may see it.
    pub async fn campaign_overview(
        &self,
        campaign_id: CampaignId,
        user_id: &UserId,
    ) -> Result<Value, ContentError> {
        let (campaign, viewer) = self.access.viewer(campaign_id, user_id).await?;

        let mut tree = CampaignTree::new(campaign);
        tree.chapters = self.chapters.list_for_campaign(campaign_id).await?;
        tree.wiki_entries = self.wiki.list_for_campaign(campaign_id).await?;
        tree.maps = self.maps.list_for_campaign(campaign_id).await?;
        tree.session_logs = self.session_logs.list_for_campaign(campaign_id).await?;

        project_one(&tree, &viewer, "Campaign", campaign_id)
    }

    pub async fn list_chapters(
        &self,
        campaign_id: CampaignId,
        user_id: &UserId,
    ) -> Result<Vec<Value>, ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let chapters = self.chapters.list_for_campaign(campaign_id).await?;
        project_list(&chapters, &viewer, campaign_id, "chapters")
    }

    pub async fn get_chapter(
        &self,
        campaign_id: CampaignId,
        chapter_id: ChapterId,
        user_id: &UserId,
    ) -> Result<Value, ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let chapter = self
            .chapters
            .get(chapter_id)
            .await?
            .filter(|c| c.campaign_id == campaign_id)
            .ok_or_else(|| ContentError::not_found("Chapter", chapter_id))?;
        project_one(&chapter, &viewer, "Chapter", chapter_id)
    }

    pub async fn list_wiki(
        &self,
        campaign_id: CampaignId,
        user_id: &UserId,
    ) -> Result<Vec<Value>, ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let entries = self.wiki.list_for_campaign(campaign_id).await?;
        project_list(&entries, &viewer, campaign_id, "wiki entries")
    }

    pub async fn get_wiki_entry(
        &self,
        campaign_id: CampaignId,
        entry_id: WikiEntryId,
        user_id: &UserId,
    ) -> Result<Value, ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let entry = self
            .wiki
            .get(entry_id)
            .await?
            .filter(|e| e.campaign_id == campaign_id)
            .ok_or_else(|| ContentError::not_found("WikiEntry", entry_id))?;
        project_one(&entry, &viewer, "WikiEntry", entry_id)
    }

    pub async fn list_maps(
        &self,
        campaign_id: CampaignId,
        user_id: &UserId,
    ) -> Result<Vec<Value>, ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let maps = self.maps.list_for_campaign(campaign_id).await?;
        project_list(&maps, &viewer, campaign_id, "maps")
    }

    pub async fn get_map(
        &self,
        campaign_id: CampaignId,
        map_id: MapId,
        user_id: &UserId,
    ) -> Result<Value, ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let map = self
            .maps
            .get(map_id)
            .await?
            .filter(|m| m.campaign_id == campaign_id)
            .ok_or_else(|| ContentError::not_found("Map", map_id))?;
        project_one(&map, &viewer, "Map", map_id)
    }

    pub async fn list_session_logs(
        &self,
        campaign_id: CampaignId,
        user_id: &UserId,
    ) -> Result<Vec<Value>, ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let logs = self.session_logs.list_for_campaign(campaign_id).await?;
        project_list(&logs, &viewer, campaign_id, "session logs")
    }

    pub async fn get_session_log(
        &self,
        campaign_id: CampaignId,
        log_id: SessionLogId,
        user_id: &UserId,
    ) -> Result<Value, ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let log = self
            .session_logs
            .get(log_id)
            .await?
            .filter(|l| l.campaign_id == campaign_id)
            .ok_or_else(|| ContentError::not_found("SessionLog", log_id))?;
        project_one(&log, &viewer, "SessionLog", log_id)
    }
}

/// Project a single root. A root hidden from the viewer is reported as not
/// found so its existence is not leaked.
fn project_one<T: Projectable>(
    entity: &T,
    viewer: &Viewer,
    entity_type: &'static str,
    id: impl ToString,
) -> Result<Value, ContentError> {
    project_entity(entity, viewer)?.ok_or_else(|| ContentError::not_found(entity_type, id))
}

fn project_list<T: Projectable>(
    entities: &[T],
    viewer: &Viewer,
    campaign_id: CampaignId,
    what: &'static str,
) -> Result<Vec<Value>, ContentError> {
    let projected = project_all(entities, viewer)?;
    tracing::debug!(
        campaign_id = %campaign_id,
        user_id = %viewer.user_id(),
        role = ?viewer.role(),
        loaded = entities.len(),
        visible = projected.len(),
        "Projected {}",
        what
    );
    Ok(projected)
}
