//! Campaign roles and viewer resolution
//!
//! A requester's role is derived solely from campaign membership: equality with
//! the campaign's master id, or presence in its player-id set. It is never
//! supplied by the client.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::UserId;

/// Role of a requester in a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CampaignRole {
    /// Campaign owner - sees everything unfiltered
    Master,
    /// Campaign member - sees published content without master-only fields
    Player,
    /// Not part of the campaign
    #[default]
    #[serde(rename = "none")]
    NoAccess,
}

impl CampaignRole {
    pub fn is_master(&self) -> bool {
        matches!(self, CampaignRole::Master)
    }

    pub fn is_player(&self) -> bool {
        matches!(self, CampaignRole::Player)
    }

    pub fn has_access(&self) -> bool {
        !matches!(self, CampaignRole::NoAccess)
    }
}

impl fmt::Display for CampaignRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignRole::Master => write!(f, "master"),
            CampaignRole::Player => write!(f, "player"),
            CampaignRole::NoAccess => write!(f, "none"),
        }
    }
}

/// Resolve the role of `requester` in a campaign owned by `master` with the
/// given player set. Master equality is checked first, so a master listed as
/// a player is still the master.
pub fn resolve_role(
    requester: &UserId,
    master: &UserId,
    players: &BTreeSet<UserId>,
) -> CampaignRole {
    if requester == master {
        CampaignRole::Master
    } else if players.contains(requester) {
        CampaignRole::Player
    } else {
        CampaignRole::NoAccess
    }
}

/// The single access gate used before loading or projecting campaign content.
pub fn has_access(requester: &UserId, master: &UserId, players: &BTreeSet<UserId>) -> bool {
    resolve_role(requester, master, players).has_access()
}

/// Role of a viewer that passed the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewerRole {
    Master,
    Player,
}

impl From<ViewerRole> for CampaignRole {
    fn from(role: ViewerRole) -> Self {
        match role {
            ViewerRole::Master => CampaignRole::Master,
            ViewerRole::Player => CampaignRole::Player,
        }
    }
}

/// A verified user together with the role they hold in one campaign.
///
/// Only constructible from a role other than [`CampaignRole::NoAccess`], so
/// holding a `Viewer` proves the access gate was passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Viewer {
    user_id: UserId,
    role: ViewerRole,
}

impl Viewer {
    pub fn from_role(user_id: UserId, role: CampaignRole) -> Result<Self, DomainError> {
        let role = match role {
            CampaignRole::Master => ViewerRole::Master,
            CampaignRole::Player => ViewerRole::Player,
            CampaignRole::NoAccess => {
                return Err(DomainError::access_denied(format!(
                    "user {} has no role in this campaign",
                    user_id
                )))
            }
        };
        Ok(Self { user_id, role })
    }

    pub fn master(user_id: UserId) -> Self {
        Self {
            user_id,
            role: ViewerRole::Master,
        }
    }

    pub fn player(user_id: UserId) -> Self {
        Self {
            user_id,
            role: ViewerRole::Player,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> ViewerRole {
        self.role
    }

    pub fn is_master(&self) -> bool {
        self.role == ViewerRole::Master
    }
}

/// Who owns a campaign and who plays in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMembership {
    pub master_id: UserId,
    #[serde(default)]
    pub player_ids: BTreeSet<UserId>,
}

impl CampaignMembership {
    pub fn new(master_id: UserId) -> Self {
        Self {
            master_id,
            player_ids: BTreeSet::new(),
        }
    }

    pub fn with_player(mut self, player: UserId) -> Self {
        self.player_ids.insert(player);
        self
    }

    pub fn resolve_role(&self, requester: &UserId) -> CampaignRole {
        resolve_role(requester, &self.master_id, &self.player_ids)
    }

    pub fn is_member(&self, user: &UserId) -> bool {
        self.resolve_role(user).has_access()
    }

    /// Resolve `requester` into a [`Viewer`], or `AccessDenied` for outsiders.
    pub fn viewer_for(&self, requester: &UserId) -> Result<Viewer, DomainError> {
        Viewer::from_role(requester.clone(), self.resolve_role(requester))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn players(ids: &[&str]) -> BTreeSet<UserId> {
        ids.iter().map(|s| uid(s)).collect()
    }

    #[test]
    fn master_is_resolved_first() {
        let role = resolve_role(&uid("m"), &uid("m"), &players(&["m", "p1"]));
        assert_eq!(role, CampaignRole::Master);
    }

    #[test]
    fn member_resolves_to_player() {
        let role = resolve_role(&uid("p1"), &uid("m"), &players(&["p1", "p2"]));
        assert_eq!(role, CampaignRole::Player);
    }

    #[test]
    fn outsider_has_no_access() {
        let role = resolve_role(&uid("x"), &uid("m"), &players(&["p1"]));
        assert_eq!(role, CampaignRole::NoAccess);
        assert!(!has_access(&uid("x"), &uid("m"), &players(&["p1"])));
    }

    #[test]
    fn role_resolution_is_total() {
        let master = uid("m");
        let set = players(&["p1", "p2"]);
        for requester in ["m", "p1", "p2", "x", "M"] {
            let role = resolve_role(&uid(requester), &master, &set);
            let expected = match requester {
                "m" => CampaignRole::Master,
                "p1" | "p2" => CampaignRole::Player,
                _ => CampaignRole::NoAccess,
            };
            assert_eq!(role, expected, "requester {requester}");
        }
    }

    #[test]
    fn viewer_cannot_be_built_without_access() {
        let result = Viewer::from_role(uid("x"), CampaignRole::NoAccess);
        assert!(matches!(result, Err(DomainError::AccessDenied(_))));
    }

    #[test]
    fn membership_builds_viewers() {
        let membership = CampaignMembership::new(uid("m")).with_player(uid("p1"));
        assert!(membership.viewer_for(&uid("m")).unwrap().is_master());
        assert_eq!(
            membership.viewer_for(&uid("p1")).unwrap().role(),
            ViewerRole::Player
        );
        assert!(membership.viewer_for(&uid("p2")).is_err());
        assert!(!membership.is_member(&uid("p2")));
    }

    #[test]
    fn no_access_serializes_as_none() {
        let json = serde_json::to_string(&CampaignRole::NoAccess).unwrap();
        assert_eq!(json, "\"none\"");
        assert_eq!(CampaignRole::NoAccess.to_string(), "none");
    }
}
