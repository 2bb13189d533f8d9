//! Note privacy levels and the flat note filter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::Note;
use crate::error::DomainError;
use crate::types::Viewer;

/// Who may read a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotePrivacy {
    /// Everyone in the campaign
    Public,
    /// The author only (and the master)
    PrivateAuthor,
    /// The master only
    PrivateMaster,
    /// The users listed in the note's `visibleTo` (and the master)
    VisibleToSubset,
}

impl NotePrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::PrivateAuthor => "PRIVATE_AUTHOR",
            Self::PrivateMaster => "PRIVATE_MASTER",
            Self::VisibleToSubset => "VISIBLE_TO_SUBSET",
        }
    }

    /// Whether `viewer` may read a note with this privacy level.
    ///
    /// The master reads every note, including another user's
    /// `PRIVATE_AUTHOR` note. The remaining tiers are checked against the
    /// viewer's own id only.
    pub fn admits<I>(self, viewer: &Viewer, author_id: &str, visible_to: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if viewer.is_master() {
            return true;
        }
        let me = viewer.user_id().as_str();
        match self {
            Self::Public => true,
            Self::PrivateAuthor => author_id == me,
            Self::PrivateMaster => false,
            Self::VisibleToSubset => visible_to.into_iter().any(|id| id.as_ref() == me),
        }
    }
}

impl fmt::Display for NotePrivacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotePrivacy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PUBLIC" => Ok(Self::Public),
            "PRIVATE_AUTHOR" => Ok(Self::PrivateAuthor),
            "PRIVATE_MASTER" => Ok(Self::PrivateMaster),
            "VISIBLE_TO_SUBSET" => Ok(Self::VisibleToSubset),
            _ => Err(DomainError::parse(format!("Unknown note privacy: {}", s))),
        }
    }
}

/// Keep the notes `viewer` may read, in their original order.
pub fn filter_notes(notes: &[Note], viewer: &Viewer) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| note.is_visible_to(viewer))
        .cloned()
        .collect()
}
