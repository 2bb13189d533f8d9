//! Use cases - User story orchestration.
//!
//! Every campaign-scoped use case resolves the requester through
//! [`access::CampaignAccess`] before touching content.

pub mod access;
pub mod content;
pub mod notes;

pub use access::{AccessError, CampaignAccess};
pub use content::{ContentError, ContentQueries, ContentRef, MarkerAllowlist, PublishContent};
pub use notes::{EncounterNotes, NewNote};
