use chrono::NaiveDate;
use std::sync::Arc;

use storage::repository::SessionLogRepository;
use study_core::model::{
    SessionDraft, SessionId, SessionLog, SessionLogSummary, StudySession, TopicCatalog,
};
use tracing::debug;

use crate::Clock;
use crate::error::StudyLogError;

/// Owns the study session log and keeps its persisted copy in step.
pub struct StudyLogService {
    clock: Clock,
    catalog: Arc<TopicCatalog>,
    repo: Arc<dyn SessionLogRepository>,
    log: SessionLog,
}

impl StudyLogService {
    /// Load the persisted log (empty if absent or unreadable).
    ///
    /// # Errors
    ///
    /// Returns `StudyLogError::Storage` if the store cannot be read.
    pub async fn load(
        clock: Clock,
        catalog: Arc<TopicCatalog>,
        repo: Arc<dyn SessionLogRepository>,
    ) -> Result<Self, StudyLogError> {
        let log = repo.load_log().await?;
        debug!(sessions = log.len(), "study log loaded");
        Ok(Self {
            clock,
            catalog,
            repo,
            log,
        })
    }

    #[must_use]
    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Date a new session form starts with.
    #[must_use]
    pub fn default_date(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Create a session with a fresh id and the catalog's current label,
    /// append it, and persist the log.
    ///
    /// # Errors
    ///
    /// Returns `StudyLogError::Usage` if the date or topic is missing, and
    /// `StudyLogError::Storage` if persistence fails. Nothing changes on error.
    pub async fn add_session(&mut self, draft: SessionDraft) -> Result<StudySession, StudyLogError> {
        let mut next = self.log.clone();
        let session = next.add(draft, &self.catalog, self.clock.now_millis())?;
        self.repo.save_log(&next).await?;
        self.log = next;

        debug!(
            id = %session.id(),
            topic = %session.topic_id(),
            minutes = session.duration_minutes(),
            "study session added"
        );
        Ok(session)
    }

    /// Remove a session by id and persist the remainder. Deleting an unknown
    /// id is a no-op. Returns whether a session was removed.
    ///
    /// # Errors
    ///
    /// Returns `StudyLogError::Storage` if persistence fails.
    pub async fn delete_session(&mut self, id: SessionId) -> Result<bool, StudyLogError> {
        let mut next = self.log.clone();
        let removed = next.remove(id);
        self.repo.save_log(&next).await?;
        self.log = next;

        debug!(%id, removed, "study session deleted");
        Ok(removed)
    }

    /// Newest date first.
    #[must_use]
    pub fn ordered_sessions(&self) -> Vec<&StudySession> {
        self.log.ordered()
    }

    #[must_use]
    pub fn summary(&self) -> SessionLogSummary {
        self.log.summary()
    }
}
