//! Campaign access gate.
//!
//! Every campaign-scoped use case starts here: load the campaign, resolve the
//! requester's role from its membership, and refuse outsiders before any
//! content is loaded.

use std::sync::Arc;

use lorekeep_domain::{Campaign, CampaignId, UserId, Viewer};

use crate::infrastructure::ports::{CampaignRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),
    #[error("User {user_id} has no access to campaign {campaign_id}")]
    Forbidden {
        campaign_id: CampaignId,
        user_id: UserId,
    },
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub struct CampaignAccess {
    campaigns: Arc<dyn CampaignRepo>,
}

impl CampaignAccess {
    pub fn new(campaigns: Arc<dyn CampaignRepo>) -> Self {
        Self { campaigns }
    }

    /// Load the campaign and resolve `user_id` into a [`Viewer`].
    ///
    /// # Returns
    /// * `Ok((Campaign, Viewer))` - requester is the master or a player
    /// * `Err(AccessError::Forbidden)` - requester is not a member
    /// * `Err(AccessError::CampaignNotFound)` - no such campaign
    pub async fn viewer(
        &self,
        campaign_id: CampaignId,
        user_id: &UserId,
    ) -> Result<(Campaign, Viewer), AccessError> {
        let campaign = self
            .campaigns
            .get(campaign_id)
            .await?
            .ok_or(AccessError::CampaignNotFound(campaign_id))?;

        let role = campaign.membership().resolve_role(user_id);
        match Viewer::from_role(user_id.clone(), role) {
            Ok(viewer) => {
                tracing::debug!(
                    campaign_id = %campaign_id,
                    user_id = %user_id,
                    role = %role,
                    "Resolved campaign role"
                );
                Ok((campaign, viewer))
            }
            Err(_) => {
                tracing::warn!(
                    campaign_id = %campaign_id,
                    user_id = %user_id,
                    "Rejected campaign access"
                );
                Err(AccessError::Forbidden {
                    campaign_id,
                    user_id: user_id.clone(),
                })
            }
        }
    }

    /// Campaigns `user_id` belongs to, each paired with the user's viewer.
    pub async fn memberships(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<(Campaign, Viewer)>, AccessError> {
        let campaigns = self.campaigns.list_for_member(user_id).await?;
        Ok(campaigns
            .into_iter()
            .filter_map(|campaign| {
                let viewer = campaign.membership().viewer_for(user_id).ok()?;
                Some((campaign, viewer))
            })
            .collect())
    }
}
