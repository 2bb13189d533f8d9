//! Campaign content use cases.
//!
//! Reads go through the projector; writes are master-only.

mod allowlist;
mod error;
mod publish;
mod queries;

pub use allowlist::MarkerAllowlist;
pub use error::ContentError;
pub use publish::{ContentRef, PublishContent};
pub use queries::ContentQueries;
