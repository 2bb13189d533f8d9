//! Wiki entry entity - Reference articles about the campaign world

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CampaignId, WikiEntryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiEntry {
    pub id: WikiEntryId,
    pub campaign_id: CampaignId,
    pub title: String,
    /// Free-form grouping (e.g. "Factions", "Deities")
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub public_content: String,
    #[serde(default)]
    pub master_content: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WikiEntry {
    pub fn new(campaign_id: CampaignId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: WikiEntryId::new(),
            campaign_id,
            title: title.into(),
            category: None,
            public_content: String::new(),
            master_content: String::new(),
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_public_content(mut self, content: impl Into<String>) -> Self {
        self.public_content = content.into();
        self
    }

    pub fn with_master_content(mut self, content: impl Into<String>) -> Self {
        self.master_content = content.into();
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }
}
