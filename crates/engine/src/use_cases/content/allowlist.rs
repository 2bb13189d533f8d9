//! Per-player allowlists on maps and markers.
//!
//! An empty allowlist means every player sees a published node; a non-empty
//! one narrows it to the listed players.

use std::collections::BTreeSet;
use std::sync::Arc;

use lorekeep_domain::{Campaign, CampaignId, DomainError, GameMap, MapId, MarkerId, UserId};

use crate::infrastructure::ports::{ClockPort, MapRepo, RepoError};
use crate::use_cases::access::CampaignAccess;

use super::error::ContentError;
use super::publish::same_campaign;

pub struct MarkerAllowlist {
    access: Arc<CampaignAccess>,
    maps: Arc<dyn MapRepo>,
    clock: Arc<dyn ClockPort>,
}

impl MarkerAllowlist {
    pub fn new(
        access: Arc<CampaignAccess>,
        maps: Arc<dyn MapRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            access,
            maps,
            clock,
        }
    }

    /// Replace the allowlist of a marker anywhere under `map_id`.
    pub async fn set_visible_to(
        &self,
        campaign_id: CampaignId,
        map_id: MapId,
        marker_id: MarkerId,
        player_ids: Vec<UserId>,
        user_id: &UserId,
    ) -> Result<(), ContentError> {
        let campaign = self.master_campaign(campaign_id, user_id).await?;
        let allowlist = players_only(&campaign, player_ids)?;
        let count = allowlist.len();
        let now = self.clock.now();

        let mutate = move |map: &mut GameMap| -> Result<(), RepoError> {
            same_campaign(map.campaign_id, campaign_id, "Map", map_id)?;
            let marker = map
                .find_marker_mut(marker_id)
                .ok_or_else(|| RepoError::not_found("Marker", marker_id))?;
            marker.visible_to_players = allowlist;
            map.updated_at = now;
            Ok(())
        };
        self.maps.update(map_id, Box::new(mutate)).await?;

        tracing::info!(
            campaign_id = %campaign_id,
            map_id = %map_id,
            marker_id = %marker_id,
            players = count,
            "Updated marker allowlist"
        );
        Ok(())
    }

    /// Replace the allowlist of `target_id`, which is `map_id` itself or one
    /// of its nested sub-maps.
    pub async fn set_map_visible_to(
        &self,
        campaign_id: CampaignId,
        map_id: MapId,
        target_id: MapId,
        player_ids: Vec<UserId>,
        user_id: &UserId,
    ) -> Result<(), ContentError> {
        let campaign = self.master_campaign(campaign_id, user_id).await?;
        let allowlist = players_only(&campaign, player_ids)?;
        let count = allowlist.len();
        let now = self.clock.now();

        let mutate = move |map: &mut GameMap| -> Result<(), RepoError> {
            same_campaign(map.campaign_id, campaign_id, "Map", map_id)?;
            let target = map
                .find_map_mut(target_id)
                .ok_or_else(|| RepoError::not_found("Map", target_id))?;
            target.visible_to_players = allowlist;
            map.updated_at = now;
            Ok(())
        };
        self.maps.update(map_id, Box::new(mutate)).await?;

        tracing::info!(
            campaign_id = %campaign_id,
            map_id = %target_id,
            players = count,
            "Updated map allowlist"
        );
        Ok(())
    }

    async fn master_campaign(
        &self,
        campaign_id: CampaignId,
        user_id: &UserId,
    ) -> Result<Campaign, ContentError> {
        let (campaign, viewer) = self.access.viewer(campaign_id, user_id).await?;
        if !viewer.is_master() {
            return Err(ContentError::NotMaster("change map visibility"));
        }
        Ok(campaign)
    }
}

/// Allowlists name players; the master always sees everything anyway.
fn players_only(
    campaign: &Campaign,
    player_ids: Vec<UserId>,
) -> Result<BTreeSet<UserId>, ContentError> {
    let mut allowlist = BTreeSet::new();
    for id in player_ids {
        if !campaign.player_ids.contains(&id) {
            return Err(DomainError::validation(format!(
                "{} is not a player in this campaign",
                id
            ))
            .into());
        }
        allowlist.insert(id);
    }
    Ok(allowlist)
}
