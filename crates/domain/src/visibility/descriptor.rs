//! Entity-kind descriptor table
//!
//! One static row per filterable entity kind. Adding a kind means adding an
//! [`EntityKind`] variant and its row here; the projector is not touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::visibility::NotePrivacy;

pub(crate) const ID: &str = "id";
pub(crate) const IS_PUBLISHED: &str = "isPublished";
pub(crate) const VISIBLE_TO_PLAYERS: &str = "visibleToPlayers";
pub(crate) const PRIVACY: &str = "privacy";
pub(crate) const AUTHOR_ID: &str = "authorId";
pub(crate) const VISIBLE_TO: &str = "visibleTo";

/// Every filterable content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Campaign,
    Chapter,
    Location,
    Npc,
    Creature,
    LootItem,
    Event,
    WikiEntry,
    Map,
    Marker,
    SessionLog,
    Encounter,
    SessionImage,
    Note,
}

impl EntityKind {
    pub const ALL: [EntityKind; 14] = [
        Self::Campaign,
        Self::Chapter,
        Self::Location,
        Self::Npc,
        Self::Creature,
        Self::LootItem,
        Self::Event,
        Self::WikiEntry,
        Self::Map,
        Self::Marker,
        Self::SessionLog,
        Self::Encounter,
        Self::SessionImage,
        Self::Note,
    ];

    pub fn descriptor(self) -> &'static KindDescriptor {
        match self {
            Self::Campaign => &CAMPAIGN,
            Self::Chapter => &CHAPTER,
            Self::Location => &LOCATION,
            Self::Npc => &NPC,
            Self::Creature => &CREATURE,
            Self::LootItem => &LOOT_ITEM,
            Self::Event => &EVENT,
            Self::WikiEntry => &WIKI_ENTRY,
            Self::Map => &MAP,
            Self::Marker => &MARKER,
            Self::SessionLog => &SESSION_LOG,
            Self::Encounter => &ENCOUNTER,
            Self::SessionImage => &SESSION_IMAGE,
            Self::Note => &NOTE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Campaign => "campaign",
            Self::Chapter => "chapter",
            Self::Location => "location",
            Self::Npc => "npc",
            Self::Creature => "creature",
            Self::LootItem => "lootItem",
            Self::Event => "event",
            Self::WikiEntry => "wikiEntry",
            Self::Map => "map",
            Self::Marker => "marker",
            Self::SessionLog => "sessionLog",
            Self::Encounter => "encounter",
            Self::SessionImage => "sessionImage",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    /// Case-insensitive; `_` and `-` are ignored, and "part" names a chapter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.trim() {
            "campaign" => Ok(Self::Campaign),
            "chapter" | "part" => Ok(Self::Chapter),
            "location" => Ok(Self::Location),
            "npc" => Ok(Self::Npc),
            "creature" => Ok(Self::Creature),
            "lootitem" | "loot" => Ok(Self::LootItem),
            "event" => Ok(Self::Event),
            "wikientry" | "wiki" => Ok(Self::WikiEntry),
            "map" => Ok(Self::Map),
            "marker" => Ok(Self::Marker),
            "sessionlog" => Ok(Self::SessionLog),
            "encounter" => Ok(Self::Encounter),
            "sessionimage" | "image" => Ok(Self::SessionImage),
            "note" => Ok(Self::Note),
            _ => Err(DomainError::parse(format!("Unknown entity kind: {}", s))),
        }
    }
}

/// The predicate a player must satisfy for a node to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Boolean field must be `true`
    Published { field: &'static str },
    /// Published, and the allowlist is empty or names the viewer
    PublishedWithAllowlist {
        published: &'static str,
        allowlist: &'static str,
    },
    /// `privacy` / `authorId` / `visibleTo` evaluated per viewer identity
    NotePrivacy,
    /// Visible whenever the parent is
    Always,
}

/// A child collection key and the kind of the nodes it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildCollection {
    pub key: &'static str,
    pub kind: EntityKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    pub kind: EntityKind,
    pub gate: Gate,
    /// Keys that never appear in a player projection
    pub master_only_fields: &'static [&'static str],
    pub children: &'static [ChildCollection],
}

impl KindDescriptor {
    pub fn is_master_only(&self, key: &str) -> bool {
        self.master_only_fields.contains(&key)
    }

    pub fn child(&self, key: &str) -> Option<&'static ChildCollection> {
        self.children.iter().find(|c| c.key == key)
    }

    /// Check that `node` has the shape this descriptor relies on, recursively.
    ///
    /// Meant for the storage boundary. The projector assumes validated input.
    pub fn validate(&self, node: &Value) -> Result<(), DomainError> {
        let object = node
            .as_object()
            .ok_or_else(|| DomainError::validation(format!("{} must be a JSON object", self.kind)))?;

        if !matches!(object.get(ID), Some(Value::String(_))) {
            return Err(DomainError::validation(format!("{} is missing an id", self.kind)));
        }

        match self.gate {
            Gate::Published { field } => require_bool(object, self.kind, field)?,
            Gate::PublishedWithAllowlist {
                published,
                allowlist,
            } => {
                require_bool(object, self.kind, published)?;
                require_string_list(object, self.kind, allowlist)?;
            }
            Gate::NotePrivacy => {
                let privacy = object.get(PRIVACY).and_then(Value::as_str).ok_or_else(|| {
                    DomainError::validation(format!("{} is missing `{}`", self.kind, PRIVACY))
                })?;
                privacy.parse::<NotePrivacy>()?;
                if !matches!(object.get(AUTHOR_ID), Some(Value::String(_))) {
                    return Err(DomainError::validation(format!(
                        "{} is missing `{}`",
                        self.kind, AUTHOR_ID
                    )));
                }
                require_string_list(object, self.kind, VISIBLE_TO)?;
            }
            Gate::Always => {}
        }

        for child in self.children {
            match object.get(child.key) {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) => {
                    for item in items {
                        child.kind.descriptor().validate(item)?;
                    }
                }
                Some(item @ Value::Object(_)) => child.kind.descriptor().validate(item)?,
                Some(_) => {
                    return Err(DomainError::validation(format!(
                        "{}.{} must be a list of {}",
                        self.kind, child.key, child.kind
                    )))
                }
            }
        }

        Ok(())
    }
}

fn require_bool(
    object: &Map<String, Value>,
    kind: EntityKind,
    field: &str,
) -> Result<(), DomainError> {
    match object.get(field) {
        Some(Value::Bool(_)) => Ok(()),
        _ => Err(DomainError::validation(format!(
            "{} requires boolean `{}`",
            kind, field
        ))),
    }
}

/// Absent and null are accepted as an empty list.
fn require_string_list(
    object: &Map<String, Value>,
    kind: EntityKind,
    field: &str,
) -> Result<(), DomainError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => Ok(()),
        Some(_) => Err(DomainError::validation(format!(
            "{}.{} must be a list of user ids",
            kind, field
        ))),
    }
}

// =============================================================================
// Table
// =============================================================================

static CAMPAIGN: KindDescriptor = KindDescriptor {
    kind: EntityKind::Campaign,
    gate: Gate::Always,
    master_only_fields: &["masterNotes"],
    children: &[
        ChildCollection {
            key: "chapters",
            kind: EntityKind::Chapter,
        },
        ChildCollection {
            key: "wikiEntries",
            kind: EntityKind::WikiEntry,
        },
        ChildCollection {
            key: "maps",
            kind: EntityKind::Map,
        },
        ChildCollection {
            key: "sessionLogs",
            kind: EntityKind::SessionLog,
        },
    ],
};

static CHAPTER: KindDescriptor = KindDescriptor {
    kind: EntityKind::Chapter,
    gate: Gate::Published {
        field: IS_PUBLISHED,
    },
    master_only_fields: &["masterContent"],
    children: &[
        ChildCollection {
            key: "locations",
            kind: EntityKind::Location,
        },
        ChildCollection {
            key: "events",
            kind: EntityKind::Event,
        },
    ],
};

static LOCATION: KindDescriptor = KindDescriptor {
    kind: EntityKind::Location,
    gate: Gate::Published {
        field: IS_PUBLISHED,
    },
    master_only_fields: &["masterNotes"],
    children: &[
        ChildCollection {
            key: "npcs",
            kind: EntityKind::Npc,
        },
        ChildCollection {
            key: "creatures",
            kind: EntityKind::Creature,
        },
        ChildCollection {
            key: "loot",
            kind: EntityKind::LootItem,
        },
    ],
};

static NPC: KindDescriptor = KindDescriptor {
    kind: EntityKind::Npc,
    gate: Gate::Published {
        field: IS_PUBLISHED,
    },
    master_only_fields: &["masterNotes"],
    children: &[],
};

static CREATURE: KindDescriptor = KindDescriptor {
    kind: EntityKind::Creature,
    gate: Gate::Published {
        field: IS_PUBLISHED,
    },
    master_only_fields: &["masterNotes"],
    children: &[],
};

static LOOT_ITEM: KindDescriptor = KindDescriptor {
    kind: EntityKind::LootItem,
    gate: Gate::Published {
        field: IS_PUBLISHED,
    },
    master_only_fields: &["masterNotes"],
    children: &[],
};

static EVENT: KindDescriptor = KindDescriptor {
    kind: EntityKind::Event,
    gate: Gate::Published {
        field: IS_PUBLISHED,
    },
    master_only_fields: &["masterContent"],
    children: &[],
};

static WIKI_ENTRY: KindDescriptor = KindDescriptor {
    kind: EntityKind::WikiEntry,
    gate: Gate::Published {
        field: IS_PUBLISHED,
    },
    master_only_fields: &["masterContent"],
    children: &[],
};

static MAP: KindDescriptor = KindDescriptor {
    kind: EntityKind::Map,
    gate: Gate::PublishedWithAllowlist {
        published: IS_PUBLISHED,
        allowlist: VISIBLE_TO_PLAYERS,
    },
    master_only_fields: &["masterNotes"],
    children: &[
        ChildCollection {
            key: "markers",
            kind: EntityKind::Marker,
        },
        ChildCollection {
            key: "subMaps",
            kind: EntityKind::Map,
        },
    ],
};

static MARKER: KindDescriptor = KindDescriptor {
    kind: EntityKind::Marker,
    gate: Gate::PublishedWithAllowlist {
        published: IS_PUBLISHED,
        allowlist: VISIBLE_TO_PLAYERS,
    },
    master_only_fields: &["detailedNotes"],
    children: &[],
};

static SESSION_LOG: KindDescriptor = KindDescriptor {
    kind: EntityKind::SessionLog,
    gate: Gate::Published {
        field: IS_PUBLISHED,
    },
    master_only_fields: &["masterNotes"],
    children: &[
        ChildCollection {
            key: "encounters",
            kind: EntityKind::Encounter,
        },
        ChildCollection {
            key: "images",
            kind: EntityKind::SessionImage,
        },
    ],
};

static ENCOUNTER: KindDescriptor = KindDescriptor {
    kind: EntityKind::Encounter,
    gate: Gate::Published {
        field: IS_PUBLISHED,
    },
    master_only_fields: &["detailedNotes"],
    children: &[ChildCollection {
        key: "notes",
        kind: EntityKind::Note,
    }],
};

static SESSION_IMAGE: KindDescriptor = KindDescriptor {
    kind: EntityKind::SessionImage,
    gate: Gate::Always,
    master_only_fields: &[],
    children: &[],
};

static NOTE: KindDescriptor = KindDescriptor {
    kind: EntityKind::Note,
    gate: Gate::NotePrivacy,
    master_only_fields: &[],
    children: &[],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        Campaign, CampaignTree, Chapter, Creature, Encounter, Event, GameMap, Location, LootItem,
        Marker, Note, Npc, SessionImage, SessionLog, WikiEntry,
    };
    use crate::ids::{CampaignId, UserId};
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn every_kind_has_its_own_row() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.descriptor().kind, kind);
        }
    }

    #[test]
    fn kind_names_parse_back() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert_eq!("Part".parse::<EntityKind>().unwrap(), EntityKind::Chapter);
        assert_eq!("loot_item".parse::<EntityKind>().unwrap(), EntityKind::LootItem);
        assert!(matches!(
            "dragon".parse::<EntityKind>(),
            Err(DomainError::Parse(_))
        ));
    }

    #[test]
    fn master_only_fields_are_never_gate_fields() {
        for kind in EntityKind::ALL {
            let descriptor = kind.descriptor();
            for field in descriptor.master_only_fields {
                assert_ne!(*field, IS_PUBLISHED);
                assert_ne!(*field, ID);
                assert!(descriptor.child(field).is_none());
            }
        }
    }

    #[test]
    fn serialized_entities_match_their_descriptors() {
        let now = Utc::now();
        let campaign_id = CampaignId::new();
        let author = UserId::new("p1").unwrap();

        let location = Location::new("Crypt")
            .with_npc(Npc::new("Sexton"))
            .with_creature(Creature::new("Ghoul"))
            .with_loot(LootItem::new("Censer"));
        let chapter = Chapter::new(campaign_id, "Prologue", now)
            .with_location(location)
            .with_event(Event::new("Bells toll"));
        let map = GameMap::new(campaign_id, "Valley", now)
            .with_marker(Marker::new("Mill", 0.2, 0.3))
            .with_sub_map(GameMap::new(campaign_id, "Village", now));
        let log = SessionLog::new(campaign_id, "Session 1", now)
            .with_encounter(Encounter::new("Ambush").with_note(Note::new(author.clone(), "ow", now)))
            .with_image(SessionImage::new("https://img/1.png"));
        let mut tree = CampaignTree::new(Campaign::new("Mire", author, now).with_id(campaign_id));
        tree.chapters.push(chapter);
        tree.maps.push(map);
        tree.session_logs.push(log);
        tree.wiki_entries.push(WikiEntry::new(campaign_id, "Gods", now));

        let node = serde_json::to_value(&tree).unwrap();
        EntityKind::Campaign.descriptor().validate(&node).unwrap();

        // Master-only keys exist on the serialized form, so the deny-list is live.
        assert!(node["chapters"][0].get("masterContent").is_some());
        assert!(node["chapters"][0]["locations"][0].get("masterNotes").is_some());
        assert!(node["maps"][0]["markers"][0].get("detailedNotes").is_some());
        assert!(node["sessionLogs"][0]["encounters"][0].get("detailedNotes").is_some());
    }

    #[test]
    fn validate_rejects_missing_published_flag() {
        let node = json!({ "id": "c1", "title": "Prologue" });
        let err = EntityKind::Chapter.descriptor().validate(&node).unwrap_err();
        assert!(err.to_string().contains("isPublished"));
    }

    #[test]
    fn validate_reports_nested_defects() {
        let node = json!({
            "id": "c1",
            "isPublished": true,
            "locations": [{ "id": "l1", "isPublished": "yes" }],
        });
        let err = EntityKind::Chapter.descriptor().validate(&node).unwrap_err();
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn validate_rejects_malformed_allowlist_and_privacy() {
        let marker = json!({ "id": "k1", "isPublished": true, "visibleToPlayers": "u5" });
        assert!(EntityKind::Marker.descriptor().validate(&marker).is_err());

        let note = json!({ "id": "n1", "authorId": "u1", "privacy": "SECRET" });
        assert!(EntityKind::Note.descriptor().validate(&note).is_err());

        let note = json!({ "id": "n1", "privacy": "PUBLIC" });
        assert!(EntityKind::Note.descriptor().validate(&note).is_err());
    }

    #[test]
    fn validate_rejects_non_list_collections() {
        let node = json!({ "id": "c1", "isPublished": true, "events": 3 });
        assert!(EntityKind::Chapter.descriptor().validate(&node).is_err());
    }
}
