//! Toggle the published flag on any content node.

use std::sync::Arc;

use lorekeep_domain::{
    CampaignId, Chapter, ChapterId, CreatureId, EncounterId, EventId, GameMap, LocationId,
    LootItemId, MapId, MarkerId, NpcId, SessionLog, SessionLogId, UserId, WikiEntry, WikiEntryId,
};

use crate::infrastructure::ports::{
    ChapterRepo, ClockPort, MapRepo, RepoError, SessionLogRepo, WikiRepo,
};
use crate::use_cases::access::CampaignAccess;

use super::error::ContentError;

/// Address of a publishable node, from its stored root down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRef {
    Chapter(ChapterId),
    Location {
        chapter_id: ChapterId,
        location_id: LocationId,
    },
    Event {
        chapter_id: ChapterId,
        event_id: EventId,
    },
    Npc {
        chapter_id: ChapterId,
        location_id: LocationId,
        npc_id: NpcId,
    },
    Creature {
        chapter_id: ChapterId,
        location_id: LocationId,
        creature_id: CreatureId,
    },
    LootItem {
        chapter_id: ChapterId,
        location_id: LocationId,
        item_id: LootItemId,
    },
    WikiEntry(WikiEntryId),
    Map(MapId),
    SubMap {
        map_id: MapId,
        sub_map_id: MapId,
    },
    Marker {
        map_id: MapId,
        marker_id: MarkerId,
    },
    SessionLog(SessionLogId),
    Encounter {
        session_log_id: SessionLogId,
        encounter_id: EncounterId,
    },
}

impl ContentRef {
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::Chapter(_) => "Chapter",
            Self::Location { .. } => "Location",
            Self::Event { .. } => "Event",
            Self::Npc { .. } => "Npc",
            Self::Creature { .. } => "Creature",
            Self::LootItem { .. } => "LootItem",
            Self::WikiEntry(_) => "WikiEntry",
            Self::Map(_) => "Map",
            Self::SubMap { .. } => "SubMap",
            Self::Marker { .. } => "Marker",
            Self::SessionLog(_) => "SessionLog",
            Self::Encounter { .. } => "Encounter",
        }
    }
}

/// Master-only publishing.
pub struct PublishContent {
    access: Arc<CampaignAccess>,
    chapters: Arc<dyn ChapterRepo>,
    wiki: Arc<dyn WikiRepo>,
    maps: Arc<dyn MapRepo>,
    session_logs: Arc<dyn SessionLogRepo>,
    clock: Arc<dyn ClockPort>,
}

impl PublishContent {
    pub fn new(
        access: Arc<CampaignAccess>,
        chapters: Arc<dyn ChapterRepo>,
        wiki: Arc<dyn WikiRepo>,
        maps: Arc<dyn MapRepo>,
        session_logs: Arc<dyn SessionLogRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            access,
            chapters,
            wiki,
            maps,
            session_logs,
            clock,
        }
    }

    /// Set `isPublished` on the addressed node inside one atomic update of
    /// its root.
    ///
    /// Publishing a child does not publish its parent: a published NPC in an
    /// unpublished location stays hidden from players.
    pub async fn set_published(
        &self,
        campaign_id: CampaignId,
        target: ContentRef,
        published: bool,
        user_id: &UserId,
    ) -> Result<(), ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        if !viewer.is_master() {
            return Err(ContentError::NotMaster("publish content"));
        }
        let now = self.clock.now();

        match target {
            ContentRef::Chapter(chapter_id)
            | ContentRef::Location { chapter_id, .. }
            | ContentRef::Event { chapter_id, .. }
            | ContentRef::Npc { chapter_id, .. }
            | ContentRef::Creature { chapter_id, .. }
            | ContentRef::LootItem { chapter_id, .. } => {
                let mutate = move |chapter: &mut Chapter| -> Result<(), RepoError> {
                    same_campaign(chapter.campaign_id, campaign_id, "Chapter", chapter_id)?;
                    let flag = match target {
                        ContentRef::Location { location_id, .. } => chapter
                            .location_mut(location_id)
                            .map(|l| &mut l.is_published),
                        ContentRef::Event { event_id, .. } => {
                            chapter.event_mut(event_id).map(|e| &mut e.is_published)
                        }
                        ContentRef::Npc {
                            location_id,
                            npc_id,
                            ..
                        } => chapter
                            .location_mut(location_id)
                            .and_then(|l| l.npc_mut(npc_id))
                            .map(|n| &mut n.is_published),
                        ContentRef::Creature {
                            location_id,
                            creature_id,
                            ..
                        } => chapter
                            .location_mut(location_id)
                            .and_then(|l| l.creature_mut(creature_id))
                            .map(|c| &mut c.is_published),
                        ContentRef::LootItem {
                            location_id,
                            item_id,
                            ..
                        } => chapter
                            .location_mut(location_id)
                            .and_then(|l| l.loot_mut(item_id))
                            .map(|i| &mut i.is_published),
                        _ => Some(&mut chapter.is_published),
                    };
                    set_flag(flag, published, &target)?;
                    chapter.updated_at = now;
                    Ok(())
                };
                self.chapters.update(chapter_id, Box::new(mutate)).await?;
            }
            ContentRef::WikiEntry(entry_id) => {
                let mutate = move |entry: &mut WikiEntry| -> Result<(), RepoError> {
                    same_campaign(entry.campaign_id, campaign_id, "WikiEntry", entry_id)?;
                    entry.is_published = published;
                    entry.updated_at = now;
                    Ok(())
                };
                self.wiki.update(entry_id, Box::new(mutate)).await?;
            }
            ContentRef::Map(map_id)
            | ContentRef::SubMap { map_id, .. }
            | ContentRef::Marker { map_id, .. } => {
                let mutate = move |map: &mut GameMap| -> Result<(), RepoError> {
                    same_campaign(map.campaign_id, campaign_id, "Map", map_id)?;
                    let flag = match target {
                        ContentRef::SubMap { sub_map_id, .. } => map
                            .find_map_mut(sub_map_id)
                            .map(|m| &mut m.is_published),
                        ContentRef::Marker { marker_id, .. } => map
                            .find_marker_mut(marker_id)
                            .map(|m| &mut m.is_published),
                        _ => Some(&mut map.is_published),
                    };
                    set_flag(flag, published, &target)?;
                    map.updated_at = now;
                    Ok(())
                };
                self.maps.update(map_id, Box::new(mutate)).await?;
            }
            ContentRef::SessionLog(log_id)
            | ContentRef::Encounter {
                session_log_id: log_id,
                ..
            } => {
                let mutate = move |log: &mut SessionLog| -> Result<(), RepoError> {
                    same_campaign(log.campaign_id, campaign_id, "SessionLog", log_id)?;
                    let flag = match target {
                        ContentRef::Encounter { encounter_id, .. } => log
                            .encounter_mut(encounter_id)
                            .map(|e| &mut e.is_published),
                        _ => Some(&mut log.is_published),
                    };
                    set_flag(flag, published, &target)?;
                    log.updated_at = now;
                    Ok(())
                };
                self.session_logs.update(log_id, Box::new(mutate)).await?;
            }
        }

        tracing::info!(
            campaign_id = %campaign_id,
            target = target.entity_type(),
            published = published,
            "Updated published flag"
        );
        Ok(())
    }
}

/// Roots from another campaign are reported as missing.
pub(super) fn same_campaign(
    actual: CampaignId,
    expected: CampaignId,
    entity_type: &'static str,
    id: impl ToString,
) -> Result<(), RepoError> {
    if actual == expected {
        Ok(())
    } else {
        Err(RepoError::not_found(entity_type, id))
    }
}

fn set_flag(
    flag: Option<&mut bool>,
    published: bool,
    target: &ContentRef,
) -> Result<(), RepoError> {
    let flag =
        flag.ok_or_else(|| RepoError::not_found(target.entity_type(), format!("{:?}", target)))?;
    *flag = published;
    Ok(())
}
