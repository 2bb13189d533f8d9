//! Visibility - What each viewer is allowed to see
//!
//! Every filterable entity kind is described by a row in a static descriptor
//! table ([`EntityKind::descriptor`]). A single generic projector walks an
//! entity tree (in its JSON form) and applies the row for each node:
//!
//! - masters get the tree unchanged;
//! - players lose every node whose gate fails, together with its subtree,
//!   and every master-only field of the nodes that remain.
//!
//! Notes carry a per-identity privacy level instead of a published flag;
//! [`filter_notes`] applies it to a flat list.

mod descriptor;
mod notes;
mod projector;

pub use descriptor::{ChildCollection, EntityKind, Gate, KindDescriptor};
pub use notes::{filter_notes, NotePrivacy};
pub use projector::{project, project_all, project_entity, Projectable};

use crate::types::Viewer;

/// Player-side gate for maps and markers: the node must be published, and
/// either the allowlist is empty or it names the viewer.
///
/// Masters are not special-cased here; callers check the role first.
pub fn allowlist_admits<I>(is_published: bool, allowlist: I, viewer: &Viewer) -> bool
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    if !is_published {
        return false;
    }
    let me = viewer.user_id().as_str();
    let mut entries = allowlist.into_iter().peekable();
    entries.peek().is_none() || entries.any(|id| id.as_ref() == me)
}
