//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    ports::{CampaignRepo, ChapterRepo, ClockPort, MapRepo, SessionLogRepo, WikiRepo},
    snapshot::SnapshotStore,
};
use crate::use_cases::{
    CampaignAccess, ContentQueries, EncounterNotes, MarkerAllowlist, PublishContent,
};

/// Repository ports the use cases are built from.
#[derive(Clone)]
pub struct Repositories {
    pub campaigns: Arc<dyn CampaignRepo>,
    pub chapters: Arc<dyn ChapterRepo>,
    pub wiki: Arc<dyn WikiRepo>,
    pub maps: Arc<dyn MapRepo>,
    pub session_logs: Arc<dyn SessionLogRepo>,
}

impl Repositories {
    /// Every port served by one snapshot store.
    pub fn from_snapshot(store: Arc<SnapshotStore>) -> Self {
        Self {
            campaigns: store.clone(),
            chapters: store.clone(),
            wiki: store.clone(),
            maps: store.clone(),
            session_logs: store,
        }
    }
}

/// Main application state.
pub struct App {
    pub access: Arc<CampaignAccess>,
    pub queries: ContentQueries,
    pub publish: PublishContent,
    pub allowlist: MarkerAllowlist,
    pub notes: EncounterNotes,
}

impl App {
    pub fn new(repos: Repositories, clock: Arc<dyn ClockPort>) -> Self {
        let access = Arc::new(CampaignAccess::new(repos.campaigns.clone()));
        Self {
            queries: ContentQueries::new(
                access.clone(),
                repos.chapters.clone(),
                repos.wiki.clone(),
                repos.maps.clone(),
                repos.session_logs.clone(),
            ),
            publish: PublishContent::new(
                access.clone(),
                repos.chapters.clone(),
                repos.wiki.clone(),
                repos.maps.clone(),
                repos.session_logs.clone(),
                clock.clone(),
            ),
            allowlist: MarkerAllowlist::new(access.clone(), repos.maps.clone(), clock.clone()),
            notes: EncounterNotes::new(access.clone(), repos.session_logs, clock),
            access,
        }
    }

    pub fn with_snapshot(store: Arc<SnapshotStore>) -> Self {
        Self::new(Repositories::from_snapshot(store), Arc::new(SystemClock::new()))
    }
}
