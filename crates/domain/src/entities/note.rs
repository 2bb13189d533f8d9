//! Note entity - Comments left on an encounter by master or players
//!
//! Notes use a per-identity privacy level instead of a published flag, see
//! [`NotePrivacy`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NoteId, UserId};
use crate::types::Viewer;
use crate::visibility::NotePrivacy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub author_id: UserId,
    pub content: String,
    pub privacy: NotePrivacy,
    /// Recipients when `privacy` is `VISIBLE_TO_SUBSET`; ignored otherwise
    #[serde(default)]
    pub visible_to: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// New notes are private to their author until shared.
    pub fn new(author_id: UserId, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: NoteId::new(),
            author_id,
            content: content.into(),
            privacy: NotePrivacy::PrivateAuthor,
            visible_to: Vec::new(),
            created_at: now,
        }
    }

    pub fn with_privacy(mut self, privacy: NotePrivacy) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn shared_with(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.privacy = NotePrivacy::VisibleToSubset;
        self.visible_to = users.into_iter().collect();
        self
    }

    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        self.privacy
            .admits(viewer, self.author_id.as_str(), &self.visible_to)
    }
}
