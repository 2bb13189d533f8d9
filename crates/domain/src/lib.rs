//! Lorekeep domain: campaign content and who may see it.
//!
//! - [`types`]: campaign roles, [`Viewer`], membership resolution
//! - [`entities`]: the content tree (chapters, locations, maps, session logs, ...)
//! - [`visibility`]: descriptor table, projector, note privacy

pub mod entities;
pub mod error;
pub mod ids;
pub mod types;
pub mod visibility;

pub use entities::{
    Campaign, CampaignTree, Chapter, Creature, Encounter, Event, GameMap, Location, LootItem,
    Marker, Note, Npc, SessionImage, SessionLog, WikiEntry,
};

pub use error::DomainError;

pub use ids::{
    CampaignId, ChapterId, CreatureId, EncounterId, EventId, LocationId, LootItemId, MapId,
    MarkerId, NoteId, NpcId, SessionImageId, SessionLogId, UserId, WikiEntryId,
};

pub use types::{has_access, resolve_role, CampaignMembership, CampaignRole, Viewer, ViewerRole};

pub use visibility::{
    allowlist_admits, filter_notes, project, project_all, project_entity, ChildCollection,
    EntityKind, Gate, KindDescriptor, NotePrivacy, Projectable,
};
