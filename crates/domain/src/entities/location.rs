//! Location entity - Places inside a chapter, and what can be found there

use serde::{Deserialize, Serialize};

use crate::ids::{CreatureId, LocationId, LootItemId, NpcId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub public_desc: String,
    /// Traps, hidden doors and other things the party must not read
    #[serde(default)]
    pub master_notes: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_published: bool,
    #[serde(default)]
    pub npcs: Vec<Npc>,
    #[serde(default)]
    pub creatures: Vec<Creature>,
    #[serde(default)]
    pub loot: Vec<LootItem>,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LocationId::new(),
            name: name.into(),
            public_desc: String::new(),
            master_notes: String::new(),
            image_url: None,
            is_published: false,
            npcs: Vec::new(),
            creatures: Vec::new(),
            loot: Vec::new(),
        }
    }

    pub fn with_public_desc(mut self, desc: impl Into<String>) -> Self {
        self.public_desc = desc.into();
        self
    }

    pub fn with_master_notes(mut self, notes: impl Into<String>) -> Self {
        self.master_notes = notes.into();
        self
    }

    pub fn with_npc(mut self, npc: Npc) -> Self {
        self.npcs.push(npc);
        self
    }

    pub fn with_creature(mut self, creature: Creature) -> Self {
        self.creatures.push(creature);
        self
    }

    pub fn with_loot(mut self, item: LootItem) -> Self {
        self.loot.push(item);
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|n| n.id == id)
    }

    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.creatures.iter_mut().find(|c| c.id == id)
    }

    pub fn loot_mut(&mut self, id: LootItemId) -> Option<&mut LootItem> {
        self.loot.iter_mut().find(|l| l.id == id)
    }
}

/// A non-player character.
///
/// Unlike narrative content, NPC records are public-facing and start out
/// published; the master hides them explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    #[serde(default)]
    pub public_desc: String,
    #[serde(default)]
    pub master_notes: String,
    #[serde(default)]
    pub portrait_url: Option<String>,
    pub is_published: bool,
}

impl Npc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NpcId::new(),
            name: name.into(),
            public_desc: String::new(),
            master_notes: String::new(),
            portrait_url: None,
            is_published: true,
        }
    }

    pub fn with_public_desc(mut self, desc: impl Into<String>) -> Self {
        self.public_desc = desc.into();
        self
    }

    pub fn with_master_notes(mut self, notes: impl Into<String>) -> Self {
        self.master_notes = notes.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_published = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    #[serde(default)]
    pub public_desc: String,
    #[serde(default)]
    pub master_notes: String,
    #[serde(default)]
    pub challenge_rating: Option<String>,
    pub is_published: bool,
}

impl Creature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CreatureId::new(),
            name: name.into(),
            public_desc: String::new(),
            master_notes: String::new(),
            challenge_rating: None,
            is_published: false,
        }
    }

    pub fn with_master_notes(mut self, notes: impl Into<String>) -> Self {
        self.master_notes = notes.into();
        self
    }

    pub fn with_challenge_rating(mut self, rating: impl Into<String>) -> Self {
        self.challenge_rating = Some(rating.into());
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootItem {
    pub id: LootItemId,
    pub name: String,
    #[serde(default)]
    pub public_desc: String,
    #[serde(default)]
    pub master_notes: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub is_published: bool,
}

fn default_quantity() -> u32 {
    1
}

impl LootItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LootItemId::new(),
            name: name.into(),
            public_desc: String::new(),
            master_notes: String::new(),
            quantity: default_quantity(),
            is_published: false,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_master_notes(mut self, notes: impl Into<String>) -> Self {
        self.master_notes = notes.into();
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }
}
