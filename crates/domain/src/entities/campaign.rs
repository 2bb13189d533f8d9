//! Campaign entity - The root of every content tree
//!
//! A campaign is owned by exactly one master and played by a set of players.
//! Content (chapters, wiki, maps, session logs) is stored separately and
//! joined into a [`CampaignTree`] for overview responses.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Chapter, GameMap, SessionLog, WikiEntry};
use crate::ids::{CampaignId, UserId};
use crate::types::CampaignMembership;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub master_id: UserId,
    #[serde(default)]
    pub player_ids: BTreeSet<UserId>,
    /// Planning notes for the master only
    #[serde(default)]
    pub master_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(name: impl Into<String>, master_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: CampaignId::new(),
            name: name.into(),
            description: String::new(),
            master_id,
            player_ids: BTreeSet::new(),
            master_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: CampaignId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_master_notes(mut self, notes: impl Into<String>) -> Self {
        self.master_notes = notes.into();
        self
    }

    pub fn with_player(mut self, player: UserId) -> Self {
        self.player_ids.insert(player);
        self
    }

    pub fn membership(&self) -> CampaignMembership {
        CampaignMembership {
            master_id: self.master_id.clone(),
            player_ids: self.player_ids.clone(),
        }
    }
}

/// A campaign joined with all of its top-level content collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTree {
    #[serde(flatten)]
    pub campaign: Campaign,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub wiki_entries: Vec<WikiEntry>,
    #[serde(default)]
    pub maps: Vec<GameMap>,
    #[serde(default)]
    pub session_logs: Vec<SessionLog>,
}

impl CampaignTree {
    pub fn new(campaign: Campaign) -> Self {
        Self {
            campaign,
            chapters: Vec::new(),
            wiki_entries: Vec::new(),
            maps: Vec::new(),
            session_logs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_mirrors_campaign() {
        let now = Utc::now();
        let campaign = Campaign::new("Curse of the Mire", UserId::new("m").unwrap(), now)
            .with_player(UserId::new("p1").unwrap());
        let membership = campaign.membership();
        assert_eq!(membership.master_id.as_str(), "m");
        assert!(membership.is_member(&UserId::new("p1").unwrap()));
    }

    #[test]
    fn tree_flattens_campaign_fields() {
        let now = Utc::now();
        let tree = CampaignTree::new(Campaign::new("Mire", UserId::new("m").unwrap(), now));
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["name"], "Mire");
        assert_eq!(json["masterId"], "m");
        assert!(json["chapters"].as_array().unwrap().is_empty());
    }
}
