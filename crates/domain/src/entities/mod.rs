//! Domain entities - Campaign content nodes with identity

mod campaign;
mod chapter;
mod location;
mod map;
mod note;
mod session_log;
mod wiki;

pub use campaign::{Campaign, CampaignTree};
pub use chapter::{Chapter, Event};
pub use location::{Creature, Location, LootItem, Npc};
pub use map::{GameMap, Marker};
pub use note::Note;
pub use session_log::{Encounter, SessionImage, SessionLog};
pub use wiki::WikiEntry;
