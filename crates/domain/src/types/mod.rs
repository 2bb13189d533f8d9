//! Shared vocabulary types.

mod role;

pub use role::{has_access, resolve_role, CampaignMembership, CampaignRole, Viewer, ViewerRole};
