//! In-memory campaign storage backed by a JSON snapshot file.
//!
//! The snapshot document looks like:
//!
//! ```json
//! { "campaigns": [...], "chapters": [...], "wikiEntries": [...], "maps": [...], "sessionLogs": [...] }
//! ```
//!
//! Every record is checked against its kind descriptor when loaded, so the
//! projector only ever sees well-formed trees.

use std::cmp::Reverse;
use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use lorekeep_domain::{
    Campaign, CampaignId, Chapter, ChapterId, EntityKind, GameMap, MapId, SessionLog,
    SessionLogId, UserId, WikiEntry, WikiEntryId,
};

use crate::infrastructure::ports::{
    CampaignRepo, ChapterRepo, MapRepo, Mutation, RepoError, SessionLogRepo, WikiRepo,
};

/// Top-level collections of a snapshot and the kind of their records.
const COLLECTIONS: [(&str, EntityKind); 5] = [
    ("campaigns", EntityKind::Campaign),
    ("chapters", EntityKind::Chapter),
    ("wikiEntries", EntityKind::WikiEntry),
    ("maps", EntityKind::Map),
    ("sessionLogs", EntityKind::SessionLog),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub wiki_entries: Vec<WikiEntry>,
    #[serde(default)]
    pub maps: Vec<GameMap>,
    #[serde(default)]
    pub session_logs: Vec<SessionLog>,
}

impl Snapshot {
    /// Parse and validate a snapshot document.
    pub fn from_json(json: &str) -> Result<Self, RepoError> {
        let document: Value = serde_json::from_str(json).map_err(RepoError::serialization)?;
        validate_document(&document)?;
        serde_json::from_value(document).map_err(RepoError::serialization)
    }
}

fn validate_document(document: &Value) -> Result<(), RepoError> {
    let object = document
        .as_object()
        .ok_or_else(|| RepoError::serialization("snapshot must be a JSON object"))?;

    for (key, kind) in COLLECTIONS {
        let Some(records) = object.get(key) else {
            continue;
        };
        let records = records
            .as_array()
            .ok_or_else(|| RepoError::serialization(format!("`{key}` must be a list")))?;
        for (index, record) in records.iter().enumerate() {
            kind.descriptor()
                .validate(record)
                .map_err(|e| RepoError::serialization(format!("{key}[{index}]: {e}")))?;
        }
    }
    Ok(())
}

/// Repository adapter holding every record in memory.
#[derive(Default)]
pub struct SnapshotStore {
    campaigns: DashMap<CampaignId, Campaign>,
    chapters: DashMap<ChapterId, Chapter>,
    wiki_entries: DashMap<WikiEntryId, WikiEntry>,
    maps: DashMap<MapId, GameMap>,
    session_logs: DashMap<SessionLogId, SessionLog>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        for campaign in snapshot.campaigns {
            store.campaigns.insert(campaign.id, campaign);
        }
        for chapter in snapshot.chapters {
            store.chapters.insert(chapter.id, chapter);
        }
        for entry in snapshot.wiki_entries {
            store.wiki_entries.insert(entry.id, entry);
        }
        for map in snapshot.maps {
            store.maps.insert(map.id, map);
        }
        for log in snapshot.session_logs {
            store.session_logs.insert(log.id, log);
        }
        store
    }

    pub async fn load(path: &Path) -> Result<Self, RepoError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RepoError::database("load_snapshot", format!("{}: {}", path.display(), e)))?;
        let snapshot = Snapshot::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            campaigns = snapshot.campaigns.len(),
            chapters = snapshot.chapters.len(),
            maps = snapshot.maps.len(),
            session_logs = snapshot.session_logs.len(),
            "Loaded campaign snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            campaigns: self.campaigns.iter().map(|e| e.value().clone()).collect(),
            chapters: self.chapters.iter().map(|e| e.value().clone()).collect(),
            wiki_entries: self.wiki_entries.iter().map(|e| e.value().clone()).collect(),
            maps: self.maps.iter().map(|e| e.value().clone()).collect(),
            session_logs: self.session_logs.iter().map(|e| e.value().clone()).collect(),
        }
    }

    pub async fn persist(&self, path: &Path) -> Result<(), RepoError> {
        let json =
            serde_json::to_string_pretty(&self.to_snapshot()).map_err(RepoError::serialization)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| RepoError::database("persist_snapshot", format!("{}: {}", path.display(), e)))
    }
}

/// Run `mutate` on a copy of the record while holding its shard lock and
/// commit the copy only if the mutation succeeds. The mutation must not touch
/// the store itself.
fn apply_update<K, V>(
    records: &DashMap<K, V>,
    entity_type: &'static str,
    id: K,
    mutate: Mutation<V>,
) -> Result<V, RepoError>
where
    K: Eq + std::hash::Hash + std::fmt::Display,
    V: Clone,
{
    let mut entry = records
        .get_mut(&id)
        .ok_or_else(|| RepoError::not_found(entity_type, &id))?;
    let mut draft = entry.value().clone();
    mutate(&mut draft)?;
    *entry.value_mut() = draft.clone();
    Ok(draft)
}

#[async_trait]
impl CampaignRepo for SnapshotStore {
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError> {
        Ok(self.campaigns.get(&id).map(|e| e.value().clone()))
    }

    async fn save(&self, campaign: &Campaign) -> Result<(), RepoError> {
        self.campaigns.insert(campaign.id, campaign.clone());
        Ok(())
    }

    async fn delete(&self, id: CampaignId) -> Result<(), RepoError> {
        self.campaigns.remove(&id);
        self.chapters.retain(|_, c| c.campaign_id != id);
        self.wiki_entries.retain(|_, w| w.campaign_id != id);
        self.maps.retain(|_, m| m.campaign_id != id);
        self.session_logs.retain(|_, l| l.campaign_id != id);
        Ok(())
    }

    async fn list_for_member(&self, user_id: &UserId) -> Result<Vec<Campaign>, RepoError> {
        let mut campaigns: Vec<Campaign> = self
            .campaigns
            .iter()
            .filter(|e| e.membership().is_member(user_id))
            .map(|e| e.value().clone())
            .collect();
        campaigns.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(campaigns)
    }
}

#[async_trait]
impl ChapterRepo for SnapshotStore {
    async fn get(&self, id: ChapterId) -> Result<Option<Chapter>, RepoError> {
        Ok(self.chapters.get(&id).map(|e| e.value().clone()))
    }

    async fn list_for_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Chapter>, RepoError> {
        let mut chapters: Vec<Chapter> = self
            .chapters
            .iter()
            .filter(|e| e.campaign_id == campaign_id)
            .map(|e| e.value().clone())
            .collect();
        chapters.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.title.cmp(&b.title)));
        Ok(chapters)
    }

    async fn save(&self, chapter: &Chapter) -> Result<(), RepoError> {
        self.chapters.insert(chapter.id, chapter.clone());
        Ok(())
    }

    async fn update(&self, id: ChapterId, mutate: Mutation<Chapter>) -> Result<Chapter, RepoError> {
        apply_update(&self.chapters, "Chapter", id, mutate)
    }

    async fn delete(&self, id: ChapterId) -> Result<(), RepoError> {
        self.chapters.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl WikiRepo for SnapshotStore {
    async fn get(&self, id: WikiEntryId) -> Result<Option<WikiEntry>, RepoError> {
        Ok(self.wiki_entries.get(&id).map(|e| e.value().clone()))
    }

    async fn list_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<WikiEntry>, RepoError> {
        let mut entries: Vec<WikiEntry> = self
            .wiki_entries
            .iter()
            .filter(|e| e.campaign_id == campaign_id)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(entries)
    }

    async fn save(&self, entry: &WikiEntry) -> Result<(), RepoError> {
        self.wiki_entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: WikiEntryId,
        mutate: Mutation<WikiEntry>,
    ) -> Result<WikiEntry, RepoError> {
        apply_update(&self.wiki_entries, "WikiEntry", id, mutate)
    }

    async fn delete(&self, id: WikiEntryId) -> Result<(), RepoError> {
        self.wiki_entries.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl MapRepo for SnapshotStore {
    async fn get(&self, id: MapId) -> Result<Option<GameMap>, RepoError> {
        Ok(self.maps.get(&id).map(|e| e.value().clone()))
    }

    async fn list_for_campaign(&self, campaign_id: CampaignId) -> Result<Vec<GameMap>, RepoError> {
        let mut maps: Vec<GameMap> = self
            .maps
            .iter()
            .filter(|e| e.campaign_id == campaign_id)
            .map(|e| e.value().clone())
            .collect();
        maps.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(maps)
    }

    async fn save(&self, map: &GameMap) -> Result<(), RepoError> {
        self.maps.insert(map.id, map.clone());
        Ok(())
    }

    async fn update(&self, id: MapId, mutate: Mutation<GameMap>) -> Result<GameMap, RepoError> {
        apply_update(&self.maps, "Map", id, mutate)
    }

    async fn delete(&self, id: MapId) -> Result<(), RepoError> {
        self.maps.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl SessionLogRepo for SnapshotStore {
    async fn get(&self, id: SessionLogId) -> Result<Option<SessionLog>, RepoError> {
        Ok(self.session_logs.get(&id).map(|e| e.value().clone()))
    }

    async fn list_for_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<SessionLog>, RepoError> {
        let mut logs: Vec<SessionLog> = self
            .session_logs
            .iter()
            .filter(|e| e.campaign_id == campaign_id)
            .map(|e| e.value().clone())
            .collect();
        // Unplayed logs (no date) sort last.
        logs.sort_by_key(|l| (l.played_at.is_none(), Reverse(l.played_at), Reverse(l.created_at)));
        Ok(logs)
    }

    async fn save(&self, log: &SessionLog) -> Result<(), RepoError> {
        self.session_logs.insert(log.id, log.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: SessionLogId,
        mutate: Mutation<SessionLog>,
    ) -> Result<SessionLog, RepoError> {
        apply_update(&self.session_logs, "SessionLog", id, mutate)
    }

    async fn delete(&self, id: SessionLogId) -> Result<(), RepoError> {
        self.session_logs.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use lorekeep_domain::Location;
    use std::io::Write;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn sample_snapshot() -> Snapshot {
        let now = Utc::now();
        let campaign = Campaign::new("Mire", uid("m"), now).with_player(uid("p1"));
        let campaign_id = campaign.id;
        Snapshot {
            chapters: vec![
                Chapter::new(campaign_id, "Second", now).with_order(2),
                Chapter::new(campaign_id, "First", now)
                    .with_order(1)
                    .with_location(Location::new("Inn")),
            ],
            session_logs: vec![
                SessionLog::new(campaign_id, "Unplayed", now),
                SessionLog::new(campaign_id, "Old", now).with_played_at(now - Duration::days(7)),
                SessionLog::new(campaign_id, "Recent", now).with_played_at(now),
            ],
            campaigns: vec![campaign],
            ..Snapshot::default()
        }
    }

    #[test]
    fn from_json_accepts_serialized_snapshot() {
        let snapshot = sample_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn from_json_rejects_records_that_fail_their_descriptor() {
        let mut document = serde_json::to_value(sample_snapshot()).unwrap();
        document["chapters"][1]["locations"][0]
            .as_object_mut()
            .unwrap()
            .remove("isPublished");
        let err = Snapshot::from_json(&document.to_string()).unwrap_err();
        assert!(matches!(err, RepoError::Serialization(_)));
        assert!(err.to_string().contains("chapters[1]"));
    }

    #[test]
    fn from_json_rejects_non_list_collections() {
        let err = Snapshot::from_json(r#"{ "maps": {} }"#).unwrap_err();
        assert!(err.to_string().contains("`maps` must be a list"));
    }

    #[tokio::test]
    async fn lists_are_ordered() {
        let store = SnapshotStore::from_snapshot(sample_snapshot());
        let campaign_id = store.to_snapshot().campaigns[0].id;

        let chapters = ChapterRepo::list_for_campaign(&store, campaign_id).await.unwrap();
        let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);

        let logs = SessionLogRepo::list_for_campaign(&store, campaign_id).await.unwrap();
        let titles: Vec<_> = logs.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Recent", "Old", "Unplayed"]);
    }

    #[tokio::test]
    async fn list_for_member_covers_master_and_players() {
        let store = SnapshotStore::from_snapshot(sample_snapshot());
        assert_eq!(store.list_for_member(&uid("m")).await.unwrap().len(), 1);
        assert_eq!(store.list_for_member(&uid("p1")).await.unwrap().len(), 1);
        assert!(store.list_for_member(&uid("x")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_campaign_removes_its_content() {
        let store = SnapshotStore::from_snapshot(sample_snapshot());
        let campaign_id = store.to_snapshot().campaigns[0].id;
        CampaignRepo::delete(&store, campaign_id).await.unwrap();
        let snapshot = store.to_snapshot();
        assert!(snapshot.campaigns.is_empty());
        assert!(snapshot.chapters.is_empty());
        assert!(snapshot.session_logs.is_empty());
    }

    #[tokio::test]
    async fn load_and_persist_round_trip_through_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&sample_snapshot()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let store = SnapshotStore::load(file.path()).await.unwrap();
        assert_eq!(store.to_snapshot().chapters.len(), 2);

        let out = tempfile::NamedTempFile::new().unwrap();
        store.persist(out.path()).await.unwrap();
        let reloaded = SnapshotStore::load(out.path()).await.unwrap();
        assert_eq!(reloaded.to_snapshot().campaigns.len(), 1);
    }

    #[tokio::test]
    async fn failed_update_leaves_record_untouched() {
        let store = SnapshotStore::from_snapshot(sample_snapshot());
        let chapter = store.to_snapshot().chapters[0].clone();

        let result = ChapterRepo::update(
            &store,
            chapter.id,
            Box::new(|c: &mut Chapter| -> Result<(), RepoError> {
                c.title = "Renamed".into();
                Err(RepoError::not_found("Location", "gone"))
            }),
        )
        .await;
        assert!(matches!(result, Err(RepoError::NotFound { .. })));

        let stored = ChapterRepo::get(&store, chapter.id).await.unwrap().unwrap();
        assert_eq!(stored.title, chapter.title);
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = SnapshotStore::new();
        let noop: Mutation<GameMap> = Box::new(|_: &mut GameMap| -> Result<(), RepoError> { Ok(()) });
        let err = MapRepo::update(&store, MapId::new(), noop)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                entity_type: "Map",
                ..
            }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_updates_to_one_root_are_all_kept() {
        let store = std::sync::Arc::new(SnapshotStore::from_snapshot(sample_snapshot()));
        let chapter_id = store.to_snapshot().chapters[0].id;

        let tasks: Vec<_> = (0..200)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    ChapterRepo::update(
                        store.as_ref(),
                        chapter_id,
                        Box::new(move |c: &mut Chapter| -> Result<(), RepoError> {
                            c.locations.push(Location::new(format!("Room {}", i)));
                            Ok(())
                        }),
                    )
                    .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = ChapterRepo::get(store.as_ref(), chapter_id)
            .await
            .unwrap()
            .unwrap();
        let baseline = sample_snapshot()
            .chapters
            .iter()
            .find(|c| c.title == stored.title)
            .map(|c| c.locations.len())
            .unwrap();
        assert_eq!(stored.locations.len(), baseline + 200);
    }

    #[tokio::test]
    async fn save_replaces_the_whole_record() {
        let store = SnapshotStore::from_snapshot(sample_snapshot());
        let mut log = store.to_snapshot().session_logs[0].clone();
        log.summary = "Rewritten".into();
        SessionLogRepo::save(&store, &log).await.unwrap();
        let stored = SessionLogRepo::get(&store, log.id).await.unwrap().unwrap();
        assert_eq!(stored.summary, "Rewritten");
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let err = SnapshotStore::load(Path::new("/nonexistent/lorekeep.json"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RepoError::Database { .. }));
    }
}
