//! Content operation errors.

use lorekeep_domain::DomainError;

use crate::infrastructure::ports::RepoError;
use crate::use_cases::access::AccessError;

/// Errors that can occur while reading or changing campaign content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error(transparent)]
    Access(#[from] AccessError),
    /// Missing, in another campaign, or hidden from this viewer.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Only the campaign master can {0}")]
    NotMaster(&'static str),
    #[error("Only the author or the campaign master can {0}")]
    NotAuthor(&'static str),
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[source] RepoError),
}

/// A node that vanished between the read and an atomic update is reported
/// the same way as one that never existed.
impl From<RepoError> for ContentError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::Repo(other),
        }
    }
}

impl ContentError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}
