//! Session log entity - What happened at the table
//!
//! A session log records one play session: its encounters (each with a
//! thread of notes from master and players) and any images shared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Note;
use crate::ids::{CampaignId, EncounterId, NoteId, SessionImageId, SessionLogId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLog {
    pub id: SessionLogId,
    pub campaign_id: CampaignId,
    pub title: String,
    /// When the session was played
    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub master_notes: String,
    pub is_published: bool,
    #[serde(default)]
    pub encounters: Vec<Encounter>,
    #[serde(default)]
    pub images: Vec<SessionImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionLog {
    pub fn new(campaign_id: CampaignId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionLogId::new(),
            campaign_id,
            title: title.into(),
            played_at: None,
            summary: String::new(),
            master_notes: String::new(),
            is_published: false,
            encounters: Vec::new(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_master_notes(mut self, notes: impl Into<String>) -> Self {
        self.master_notes = notes.into();
        self
    }

    pub fn with_played_at(mut self, played_at: DateTime<Utc>) -> Self {
        self.played_at = Some(played_at);
        self
    }

    pub fn with_encounter(mut self, encounter: Encounter) -> Self {
        self.encounters.push(encounter);
        self
    }

    pub fn with_image(mut self, image: SessionImage) -> Self {
        self.images.push(image);
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    pub fn encounter(&self, id: EncounterId) -> Option<&Encounter> {
        self.encounters.iter().find(|e| e.id == id)
    }

    pub fn encounter_mut(&mut self, id: EncounterId) -> Option<&mut Encounter> {
        self.encounters.iter_mut().find(|e| e.id == id)
    }
}

/// A fight, negotiation or scene within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub id: EncounterId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub detailed_notes: String,
    pub is_published: bool,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Encounter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EncounterId::new(),
            name: name.into(),
            description: String::new(),
            detailed_notes: String::new(),
            is_published: false,
            notes: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_detailed_notes(mut self, notes: impl Into<String>) -> Self {
        self.detailed_notes = notes.into();
        self
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    /// Remove a note, returning it if it existed.
    pub fn remove_note(&mut self, id: NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(index))
    }
}

/// An image shared during a session. Visible whenever its log is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionImage {
    pub id: SessionImageId,
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

impl SessionImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: SessionImageId::new(),
            url: url.into(),
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}
