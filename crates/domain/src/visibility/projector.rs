//! The generic visibility projector.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::entities::{
    Campaign, CampaignTree, Chapter, Creature, Encounter, Event, GameMap, Location, LootItem,
    Marker, Note, Npc, SessionImage, SessionLog, WikiEntry,
};
use crate::error::DomainError;
use crate::types::Viewer;
use crate::visibility::descriptor::{AUTHOR_ID, PRIVACY, VISIBLE_TO};
use crate::visibility::{allowlist_admits, EntityKind, Gate, KindDescriptor, NotePrivacy};

/// Project `node` (an entity of `kind` in its JSON form) for `viewer`.
///
/// Masters get an identical copy. Players get `None` when the node's gate
/// fails; otherwise a copy without master-only keys whose child collections
/// hold only the children that pass their own gates, projected the same way.
/// A hidden node hides its whole subtree: children are never visited.
pub fn project(node: &Value, kind: EntityKind, viewer: &Viewer) -> Option<Value> {
    if viewer.is_master() {
        return Some(node.clone());
    }
    project_for_player(node, kind.descriptor(), viewer)
}

/// An entity type that knows its descriptor row.
pub trait Projectable: Serialize {
    const KIND: EntityKind;
}

/// Serialize `entity` and project it for `viewer`.
pub fn project_entity<T: Projectable>(
    entity: &T,
    viewer: &Viewer,
) -> Result<Option<Value>, DomainError> {
    let node = serde_json::to_value(entity)?;
    Ok(project(&node, T::KIND, viewer))
}

/// Project a flat list of same-kind roots, dropping the hidden ones.
pub fn project_all<T: Projectable>(
    entities: &[T],
    viewer: &Viewer,
) -> Result<Vec<Value>, DomainError> {
    let mut projected = Vec::with_capacity(entities.len());
    for entity in entities {
        if let Some(value) = project_entity(entity, viewer)? {
            projected.push(value);
        }
    }
    Ok(projected)
}

fn project_for_player(
    node: &Value,
    descriptor: &'static KindDescriptor,
    viewer: &Viewer,
) -> Option<Value> {
    let Some(object) = node.as_object() else {
        malformed(descriptor.kind, "node is not a JSON object");
        return None;
    };

    if !gate_admits(descriptor, object, viewer) {
        return None;
    }

    let mut projected = Map::with_capacity(object.len());
    for (key, value) in object {
        if descriptor.is_master_only(key) {
            continue;
        }
        let value = match descriptor.child(key) {
            Some(child) => project_collection(value, child.kind, viewer),
            None => value.clone(),
        };
        projected.insert(key.clone(), value);
    }
    Some(Value::Object(projected))
}

fn project_collection(value: &Value, kind: EntityKind, viewer: &Viewer) -> Value {
    let descriptor = kind.descriptor();
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter_map(|item| project_for_player(item, descriptor, viewer))
                .collect(),
        ),
        Value::Object(_) => project_for_player(value, descriptor, viewer).unwrap_or(Value::Null),
        other => other.clone(),
    }
}

fn gate_admits(descriptor: &KindDescriptor, object: &Map<String, Value>, viewer: &Viewer) -> bool {
    match descriptor.gate {
        Gate::Always => true,
        Gate::Published { field } => published_flag(descriptor.kind, object, field),
        Gate::PublishedWithAllowlist {
            published,
            allowlist,
        } => {
            let is_published = published_flag(descriptor.kind, object, published);
            allowlist_admits(is_published, string_list(object, allowlist), viewer)
        }
        Gate::NotePrivacy => {
            let privacy = object
                .get(PRIVACY)
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<NotePrivacy>().ok());
            let Some(privacy) = privacy else {
                malformed(descriptor.kind, "missing or unknown privacy");
                return false;
            };
            let author = object.get(AUTHOR_ID).and_then(Value::as_str).unwrap_or_default();
            privacy.admits(viewer, author, string_list(object, VISIBLE_TO))
        }
    }
}

/// Missing or non-boolean flags count as unpublished.
fn published_flag(kind: EntityKind, object: &Map<String, Value>, field: &str) -> bool {
    match object.get(field) {
        Some(Value::Bool(flag)) => *flag,
        _ => {
            malformed(kind, field);
            false
        }
    }
}

fn string_list<'a>(object: &'a Map<String, Value>, field: &str) -> impl Iterator<Item = &'a str> {
    object
        .get(field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// Input that skipped storage-boundary validation is a bug. Debug builds stop
/// here; release builds fail closed and hide the node.
fn malformed(kind: EntityKind, detail: &str) {
    if cfg!(debug_assertions) {
        panic!("malformed {kind} node: {detail}");
    }
}

macro_rules! projectable {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Projectable for $ty {
                const KIND: EntityKind = EntityKind::$kind;
            }
        )*
    };
}

projectable! {
    Campaign => Campaign,
    CampaignTree => Campaign,
    Chapter => Chapter,
    Location => Location,
    Npc => Npc,
    Creature => Creature,
    LootItem => LootItem,
    Event => Event,
    WikiEntry => WikiEntry,
    GameMap => Map,
    Marker => Marker,
    SessionLog => SessionLog,
    Encounter => Encounter,
    SessionImage => SessionImage,
    Note => Note,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{CampaignId, UserId};
    use chrono::Utc;
    use serde_json::json;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn master() -> Viewer {
        Viewer::master(uid("m"))
    }

    fn player(id: &str) -> Viewer {
        Viewer::player(uid(id))
    }

    /// Every master-only key in the table, for recursive leak scans.
    fn all_master_only_keys() -> Vec<&'static str> {
        EntityKind::ALL
            .iter()
            .flat_map(|k| k.descriptor().master_only_fields.iter().copied())
            .collect()
    }

    fn assert_no_master_only_keys(value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    assert!(
                        !all_master_only_keys().contains(&key.as_str()),
                        "leaked master-only key `{key}`"
                    );
                    assert_no_master_only_keys(child);
                }
            }
            Value::Array(items) => items.iter().for_each(assert_no_master_only_keys),
            _ => {}
        }
    }

    fn sample_tree() -> CampaignTree {
        let now = Utc::now();
        let campaign_id = CampaignId::new();
        let campaign = Campaign::new("Mire", uid("m"), now)
            .with_id(campaign_id)
            .with_player(uid("p1"))
            .with_player(uid("p2"))
            .with_master_notes("the mayor did it");

        let open_chapter = Chapter::new(campaign_id, "Arrival", now)
            .published()
            .with_public_content("intro")
            .with_master_content("secret")
            .with_location(
                Location::new("Inn")
                    .published()
                    .with_master_notes("cellar door")
                    .with_npc(Npc::new("Barkeep").with_master_notes("spy"))
                    .with_npc(Npc::new("Stranger").hidden())
                    .with_loot(LootItem::new("Key").with_master_notes("opens crypt")),
            )
            .with_location(
                Location::new("Crypt")
                    .with_master_notes("trap")
                    .with_npc(Npc::new("Lich")),
            )
            .with_event(Event::new("Storm").published().with_master_content("lightning"));
        let hidden_chapter = Chapter::new(campaign_id, "Finale", now)
            .with_location(Location::new("Tower").published());

        let map = GameMap::new(campaign_id, "Valley", now)
            .published()
            .with_master_notes("ley lines")
            .with_marker(Marker::new("Mill", 0.1, 0.1).published().with_detailed_notes("bandits"))
            .with_marker(
                Marker::new("Camp", 0.2, 0.2)
                    .published()
                    .with_detailed_notes("smugglers")
                    .visible_only_to([uid("p2")]),
            )
            .with_marker(Marker::new("Lair", 0.3, 0.3));

        let log = SessionLog::new(campaign_id, "Session 1", now)
            .published()
            .with_master_notes("party missed the clue")
            .with_encounter(
                Encounter::new("Ambush")
                    .published()
                    .with_detailed_notes("4 goblins")
                    .with_note(Note::new(uid("p1"), "mine", now))
                    .with_note(
                        Note::new(uid("p2"), "all", now).with_privacy(NotePrivacy::Public),
                    ),
            )
            .with_image(SessionImage::new("https://img/1.png"));

        let mut tree = CampaignTree::new(campaign);
        tree.chapters = vec![open_chapter, hidden_chapter];
        tree.maps = vec![map];
        tree.session_logs = vec![log];
        tree.wiki_entries = vec![WikiEntry::new(campaign_id, "Gods", now)
            .published()
            .with_master_content("the gods are dead")];
        tree
    }

    #[test]
    fn master_projection_is_identity() {
        let node = serde_json::to_value(sample_tree()).unwrap();
        let projected = project(&node, EntityKind::Campaign, &master()).unwrap();
        assert_eq!(projected, node);
    }

    #[test]
    fn player_projection_erases_master_only_fields_everywhere() {
        let tree = sample_tree();
        for id in ["p1", "p2"] {
            let projected = project_entity(&tree, &player(id)).unwrap().unwrap();
            assert_no_master_only_keys(&projected);
            // Public payloads survive.
            assert_eq!(projected["chapters"][0]["publicContent"], "intro");
        }

        // p2 is on the allowlist, so the scan above covered its marker too.
        let for_p2 = project_entity(&tree, &player("p2")).unwrap().unwrap();
        let camp = &for_p2["maps"][0]["markers"][1];
        assert_eq!(camp["label"], "Camp");
        assert!(camp.get("detailedNotes").is_none());

        let for_master = project_entity(&tree, &master()).unwrap().unwrap();
        assert_eq!(for_master["maps"][0]["markers"][1]["detailedNotes"], "smugglers");
    }

    #[test]
    fn unpublished_node_hides_its_whole_subtree() {
        let projected = project_entity(&sample_tree(), &player("p1")).unwrap().unwrap();
        let chapters = projected["chapters"].as_array().unwrap();
        // "Finale" is unpublished even though its Tower location is published.
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0]["title"], "Arrival");

        // "Crypt" is unpublished even though the Lich NPC is published.
        let locations = chapters[0]["locations"].as_array().unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0]["name"], "Inn");
    }

    #[test]
    fn filter_happens_before_children_are_projected() {
        let projected = project_entity(&sample_tree(), &player("p1")).unwrap().unwrap();
        let inn = &projected["chapters"][0]["locations"][0];
        let npcs = inn["npcs"].as_array().unwrap();
        assert_eq!(npcs.len(), 1);
        assert_eq!(npcs[0]["name"], "Barkeep");
        assert!(npcs[0].get("masterNotes").is_none());
        // Unpublished loot is dropped, not masked.
        assert!(inn["loot"].as_array().unwrap().is_empty());
    }

    #[test]
    fn marker_allowlist_applies_per_player() {
        let tree = sample_tree();
        let for_p1 = project_entity(&tree, &player("p1")).unwrap().unwrap();
        let for_p2 = project_entity(&tree, &player("p2")).unwrap().unwrap();

        let labels = |v: &Value| -> Vec<String> {
            v["maps"][0]["markers"]
                .as_array()
                .unwrap()
                .iter()
                .map(|m| m["label"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(labels(&for_p1), vec!["Mill"]);
        assert_eq!(labels(&for_p2), vec!["Mill", "Camp"]);
    }

    #[test]
    fn allowlisted_sub_map_is_hidden_from_other_players() {
        let now = Utc::now();
        let campaign_id = CampaignId::new();
        let map = GameMap::new(campaign_id, "Region", now).published().with_sub_map(
            GameMap::new(campaign_id, "Hideout", now)
                .published()
                .visible_only_to([uid("u5")]),
        );

        let for_u5 = project_entity(&map, &player("u5")).unwrap().unwrap();
        let for_u6 = project_entity(&map, &player("u6")).unwrap().unwrap();
        assert_eq!(for_u5["subMaps"].as_array().unwrap().len(), 1);
        assert!(for_u6["subMaps"].as_array().unwrap().is_empty());
    }

    #[test]
    fn notes_inside_the_tree_follow_note_privacy() {
        let tree = sample_tree();
        let note_count = |viewer: &Viewer| {
            project_entity(&tree, viewer).unwrap().unwrap()["sessionLogs"][0]["encounters"][0]
                ["notes"]
                .as_array()
                .unwrap()
                .len()
        };
        assert_eq!(note_count(&player("p1")), 2);
        assert_eq!(note_count(&player("p2")), 1);
        assert_eq!(note_count(&master()), 2);
    }

    #[test]
    fn session_images_follow_their_log() {
        let projected = project_entity(&sample_tree(), &player("p2")).unwrap().unwrap();
        assert_eq!(projected["sessionLogs"][0]["images"].as_array().unwrap().len(), 1);

        let mut tree = sample_tree();
        tree.session_logs[0].is_published = false;
        let projected = project_entity(&tree, &player("p2")).unwrap().unwrap();
        assert!(projected["sessionLogs"].as_array().unwrap().is_empty());
    }

    #[test]
    fn player_projection_is_idempotent() {
        let viewer = player("p2");
        let once = project_entity(&sample_tree(), &viewer).unwrap().unwrap();
        let twice = project(&once, EntityKind::Campaign, &viewer).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn unpublished_root_is_omitted_for_players() {
        let chapter = Chapter::new(CampaignId::new(), "Finale", Utc::now());
        assert!(project_entity(&chapter, &player("p1")).unwrap().is_none());
        assert!(project_entity(&chapter, &master()).unwrap().is_some());
    }

    #[test]
    fn project_all_drops_hidden_roots() {
        let campaign_id = CampaignId::new();
        let now = Utc::now();
        let entries = vec![
            WikiEntry::new(campaign_id, "Gods", now).published(),
            WikiEntry::new(campaign_id, "True history", now),
        ];
        assert_eq!(project_all(&entries, &player("p1")).unwrap().len(), 1);
        assert_eq!(project_all(&entries, &master()).unwrap().len(), 2);
    }

    #[test]
    fn chapter_with_unpublished_location_scenario() {
        let chapter = json!({
            "id": "c1",
            "isPublished": true,
            "masterContent": "secret",
            "publicContent": "intro",
            "locations": [{ "id": "l1", "isPublished": false, "masterNotes": "trap" }],
        });

        let for_master = project(&chapter, EntityKind::Chapter, &master()).unwrap();
        assert_eq!(for_master, chapter);

        let for_player = project(&chapter, EntityKind::Chapter, &player("p1")).unwrap();
        assert_eq!(
            for_player,
            json!({
                "id": "c1",
                "isPublished": true,
                "publicContent": "intro",
                "locations": [],
            })
        );
    }

    #[test]
    fn single_object_child_is_nulled_when_hidden() {
        let location = json!({
            "id": "l1",
            "isPublished": true,
            "npcs": { "id": "n1", "isPublished": false },
        });
        let projected = project(&location, EntityKind::Location, &player("p1")).unwrap();
        assert_eq!(projected["npcs"], Value::Null);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "malformed chapter node")]
    fn missing_published_flag_fails_fast_in_debug_builds() {
        let chapter = json!({ "id": "c1", "title": "No flag" });
        project(&chapter, EntityKind::Chapter, &player("p1"));
    }
}
