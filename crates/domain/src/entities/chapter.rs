//! Chapter entity - A part of the campaign's story
//!
//! Chapters (called "parts" in some campaigns) contain the locations the
//! party will visit and the events planned for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Location;
use crate::ids::{CampaignId, ChapterId, EventId, LocationId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub campaign_id: CampaignId,
    pub title: String,
    /// Display order within the campaign
    #[serde(default)]
    pub order: u32,
    /// Text shown to players once published
    #[serde(default)]
    pub public_content: String,
    /// Plot secrets, never sent to players
    #[serde(default)]
    pub master_content: String,
    pub is_published: bool,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub events: Vec<Event>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    pub fn new(campaign_id: CampaignId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ChapterId::new(),
            campaign_id,
            title: title.into(),
            order: 0,
            public_content: String::new(),
            master_content: String::new(),
            is_published: false,
            locations: Vec::new(),
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
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

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    pub fn location_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.iter_mut().find(|l| l.id == id)
    }

    pub fn event_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.iter_mut().find(|e| e.id == id)
    }
}

/// Something planned to happen during a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub public_content: String,
    #[serde(default)]
    pub master_content: String,
    pub is_published: bool,
}

impl Event {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            title: title.into(),
            order: 0,
            public_content: String::new(),
            master_content: String::new(),
            is_published: false,
        }
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
