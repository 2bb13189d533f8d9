//! Encounter notes: list, add and delete with per-note privacy.

use std::sync::Arc;

use lorekeep_domain::{
    filter_notes, CampaignId, DomainError, Encounter, EncounterId, Note, NoteId, NotePrivacy,
    SessionLog, SessionLogId, UserId, Viewer,
};

use crate::infrastructure::ports::{ClockPort, RepoError, SessionLogRepo};
use crate::use_cases::access::CampaignAccess;
use crate::use_cases::content::ContentError;

/// Input for [`EncounterNotes::add`].
#[derive(Debug, Clone)]
pub struct NewNote {
    pub content: String,
    pub privacy: NotePrivacy,
    /// Only read when `privacy` is `VisibleToSubset`.
    pub visible_to: Vec<UserId>,
}

impl NewNote {
    /// A note private to its author.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            privacy: NotePrivacy::PrivateAuthor,
            visible_to: Vec::new(),
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
}

pub struct EncounterNotes {
    access: Arc<CampaignAccess>,
    session_logs: Arc<dyn SessionLogRepo>,
    clock: Arc<dyn ClockPort>,
}

impl EncounterNotes {
    pub fn new(
        access: Arc<CampaignAccess>,
        session_logs: Arc<dyn SessionLogRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            access,
            session_logs,
            clock,
        }
    }

    /// Notes on the encounter that `user_id` may read.
    pub async fn list(
        &self,
        campaign_id: CampaignId,
        log_id: SessionLogId,
        encounter_id: EncounterId,
        user_id: &UserId,
    ) -> Result<Vec<Note>, ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let log = self.load_log(campaign_id, log_id, &viewer).await?;
        let encounter = visible_encounter(&log, encounter_id, &viewer)?;

        let notes = filter_notes(&encounter.notes, &viewer);
        tracing::debug!(
            campaign_id = %campaign_id,
            encounter_id = %encounter_id,
            user_id = %user_id,
            stored = encounter.notes.len(),
            visible = notes.len(),
            "Filtered encounter notes"
        );
        Ok(notes)
    }

    /// Add a note authored by `user_id`.
    ///
    /// Subset recipients must be campaign members; the author is always
    /// included so they can read their own note.
    pub async fn add(
        &self,
        campaign_id: CampaignId,
        log_id: SessionLogId,
        encounter_id: EncounterId,
        new_note: NewNote,
        user_id: &UserId,
    ) -> Result<Note, ContentError> {
        let (campaign, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let content = new_note.content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("Note content cannot be empty").into());
        }

        let now = self.clock.now();
        let mut note = Note::new(user_id.clone(), content, now).with_privacy(new_note.privacy);
        if new_note.privacy == NotePrivacy::VisibleToSubset {
            let membership = campaign.membership();
            let mut recipients = vec![user_id.clone()];
            for id in new_note.visible_to {
                if !membership.is_member(&id) {
                    return Err(DomainError::validation(format!(
                        "{} is not a member of this campaign",
                        id
                    ))
                    .into());
                }
                if !recipients.contains(&id) {
                    recipients.push(id);
                }
            }
            note.visible_to = recipients;
        }

        let stored = note.clone();
        let mutate = move |log: &mut SessionLog| -> Result<(), RepoError> {
            let encounter = visible_encounter_mut(log, campaign_id, encounter_id, &viewer)?;
            encounter.notes.push(stored);
            log.updated_at = now;
            Ok(())
        };
        self.session_logs.update(log_id, Box::new(mutate)).await?;

        tracing::info!(
            campaign_id = %campaign_id,
            encounter_id = %encounter_id,
            note_id = %note.id,
            privacy = %note.privacy,
            "Added encounter note"
        );
        Ok(note)
    }

    /// Delete a note. Only its author or the master may do so; a note the
    /// requester cannot read is reported as not found.
    pub async fn delete(
        &self,
        campaign_id: CampaignId,
        log_id: SessionLogId,
        encounter_id: EncounterId,
        note_id: NoteId,
        user_id: &UserId,
    ) -> Result<(), ContentError> {
        let (_, viewer) = self.access.viewer(campaign_id, user_id).await?;
        let log = self.load_log(campaign_id, log_id, &viewer).await?;
        let encounter = visible_encounter(&log, encounter_id, &viewer)?;

        // Authorship never changes, so checking it on the loaded copy holds
        // for the stored record too.
        let note = encounter
            .notes
            .iter()
            .find(|n| n.id == note_id)
            .filter(|n| n.is_visible_to(&viewer))
            .ok_or_else(|| ContentError::not_found("Note", note_id))?;
        if !viewer.is_master() && note.author_id != *user_id {
            return Err(ContentError::NotAuthor("delete this note"));
        }

        let now = self.clock.now();
        let mutate = move |log: &mut SessionLog| -> Result<(), RepoError> {
            let encounter = visible_encounter_mut(log, campaign_id, encounter_id, &viewer)?;
            encounter
                .remove_note(note_id)
                .ok_or_else(|| RepoError::not_found("Note", note_id))?;
            log.updated_at = now;
            Ok(())
        };
        self.session_logs.update(log_id, Box::new(mutate)).await?;

        tracing::info!(
            campaign_id = %campaign_id,
            encounter_id = %encounter_id,
            note_id = %note_id,
            user_id = %user_id,
            "Deleted encounter note"
        );
        Ok(())
    }

    async fn load_log(
        &self,
        campaign_id: CampaignId,
        log_id: SessionLogId,
        viewer: &Viewer,
    ) -> Result<SessionLog, ContentError> {
        self.session_logs
            .get(log_id)
            .await?
            .filter(|l| l.campaign_id == campaign_id)
            .filter(|l| viewer.is_master() || l.is_published)
            .ok_or_else(|| ContentError::not_found("SessionLog", log_id))
    }
}

/// Mutable twin of [`visible_encounter`], run inside an atomic update.
fn visible_encounter_mut<'a>(
    log: &'a mut SessionLog,
    campaign_id: CampaignId,
    encounter_id: EncounterId,
    viewer: &Viewer,
) -> Result<&'a mut Encounter, RepoError> {
    if log.campaign_id != campaign_id || !(viewer.is_master() || log.is_published) {
        return Err(RepoError::not_found("SessionLog", log.id));
    }
    log.encounter_mut(encounter_id)
        .filter(|e| viewer.is_master() || e.is_published)
        .ok_or_else(|| RepoError::not_found("Encounter", encounter_id))
}

fn visible_encounter<'a>(
    log: &'a SessionLog,
    encounter_id: EncounterId,
    viewer: &Viewer,
) -> Result<&'a Encounter, ContentError> {
    log.encounter(encounter_id)
        .filter(|e| viewer.is_master() || e.is_published)
        .ok_or_else(|| ContentError::not_found("Encounter", encounter_id))
}
