use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::catalog::TopicCatalog;
use crate::model::ids::{SessionId, TopicId};

/// Sessions of at least this many minutes count toward the quota.
pub const QUOTA_MIN_MINUTES: u32 = 60;

/// Number of qualifying sessions required to meet the practice requirement.
pub const QUOTA_SESSIONS: usize = 8;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Usage errors raised when a session request is incomplete or malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionDraftError {
    #[error("a session needs a date")]
    MissingDate,

    #[error("a session needs a topic")]
    MissingTopic,

    #[error("invalid session date (expected YYYY-MM-DD): {raw}")]
    InvalidDate { raw: String },

    #[error("invalid session duration (expected whole minutes): {raw}")]
    InvalidDuration { raw: String },
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated input for a new study session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDraft {
    pub date: Option<NaiveDate>,
    pub topic_id: String,
    pub duration_minutes: u32,
    pub notes: String,
}

impl SessionDraft {
    #[must_use]
    pub fn new(
        date: Option<NaiveDate>,
        topic_id: impl Into<String>,
        duration_minutes: u32,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            date,
            topic_id: topic_id.into(),
            duration_minutes,
            notes: notes.into(),
        }
    }

    /// Parse raw form fields.
    ///
    /// Missing date or topic is reported before any parsing happens.
    ///
    /// # Errors
    ///
    /// Returns `SessionDraftError` when a required field is blank, the date is
    /// not `YYYY-MM-DD`, or the duration is not a non-negative integer.
    pub fn from_form(
        date: &str,
        topic_id: &str,
        duration: &str,
        notes: &str,
    ) -> Result<Self, SessionDraftError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(SessionDraftError::MissingDate);
        }
        let topic_id = topic_id.trim();
        if topic_id.is_empty() {
            return Err(SessionDraftError::MissingTopic);
        }

        let parsed_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            SessionDraftError::InvalidDate {
                raw: date.to_string(),
            }
        })?;
        let duration_minutes =
            duration
                .trim()
                .parse::<u32>()
                .map_err(|_| SessionDraftError::InvalidDuration {
                    raw: duration.to_string(),
                })?;

        Ok(Self::new(Some(parsed_date), topic_id, duration_minutes, notes))
    }

    /// Check the required fields.
    ///
    /// # Errors
    ///
    /// Returns `SessionDraftError::MissingDate` or `MissingTopic`.
    pub fn validate(&self) -> Result<(NaiveDate, TopicId), SessionDraftError> {
        let date = self.date.ok_or(SessionDraftError::MissingDate)?;
        let topic = self.topic_id.trim();
        if topic.is_empty() {
            return Err(SessionDraftError::MissingTopic);
        }
        Ok((date, TopicId::new(topic)))
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A logged unit of study practice. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySession {
    id: SessionId,
    date: NaiveDate,
    topic_id: TopicId,
    topic_name: String,
    duration_minutes: u32,
    notes: String,
}

impl StudySession {
    /// Rehydrate a session from persisted storage.
    #[must_use]
    pub fn from_persisted(
        id: SessionId,
        date: NaiveDate,
        topic_id: TopicId,
        topic_name: String,
        duration_minutes: u32,
        notes: String,
    ) -> Self {
        Self {
            id,
            date,
            topic_id,
            topic_name,
            duration_minutes,
            notes,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    /// Catalog label captured when the session was logged.
    #[must_use]
    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    #[must_use]
    pub fn qualifies(&self) -> bool {
        self.duration_minutes >= QUOTA_MIN_MINUTES
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionLogSummary {
    pub session_count: usize,
    pub total_minutes: u64,
    pub qualifying_count: usize,
    pub requirement_met: bool,
}

impl SessionLogSummary {
    #[must_use]
    pub fn quota_target(&self) -> usize {
        QUOTA_SESSIONS
    }

    #[must_use]
    pub fn quota_minutes(&self) -> u32 {
        QUOTA_MIN_MINUTES
    }

    /// Qualifying sessions still needed; 0 once the quota is met.
    #[must_use]
    pub fn remaining(&self) -> usize {
        QUOTA_SESSIONS.saturating_sub(self.qualifying_count)
    }
}

//
// ─── LOG ───────────────────────────────────────────────────────────────────────
//

/// Study sessions in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLog {
    sessions: Vec<StudySession>,
}

impl SessionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a log; a repeated id keeps only its first occurrence.
    #[must_use]
    pub fn from_persisted(sessions: Vec<StudySession>) -> Self {
        let mut seen = HashSet::with_capacity(sessions.len());
        let sessions = sessions
            .into_iter()
            .filter(|session| seen.insert(session.id))
            .collect();
        Self { sessions }
    }

    /// Insertion order, as persisted.
    #[must_use]
    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    /// Id for a session created at `now_millis`, bumped past the largest
    /// existing id when the clock has not moved on.
    ///
    /// If the largest id is already `u64::MAX`, the highest unused id is
    /// taken instead. The log never holds every id, so one always exists.
    #[must_use]
    pub fn next_id(&self, now_millis: u64) -> SessionId {
        let Some(max) = self.sessions.iter().map(|session| session.id.value()).max() else {
            return SessionId::new(now_millis);
        };
        if let Some(floor) = max.checked_add(1) {
            return SessionId::new(now_millis.max(floor));
        }

        let taken: HashSet<u64> = self.sessions.iter().map(|s| s.id.value()).collect();
        let free = (0..=u64::MAX)
            .rev()
            .find(|id| !taken.contains(id))
            .unwrap_or_default();
        SessionId::new(free)
    }

    /// Validate the draft, snapshot the topic label, and append.
    ///
    /// # Errors
    ///
    /// Returns `SessionDraftError` without touching the log when the draft is
    /// missing a date or topic.
    pub fn add(
        &mut self,
        draft: SessionDraft,
        catalog: &TopicCatalog,
        now_millis: u64,
    ) -> Result<StudySession, SessionDraftError> {
        let (date, topic_id) = draft.validate()?;
        let session = StudySession {
            id: self.next_id(now_millis),
            date,
            topic_name: catalog.display_name(topic_id.as_str()),
            topic_id,
            duration_minutes: draft.duration_minutes,
            notes: draft.notes,
        };
        self.sessions.push(session.clone());
        Ok(session)
    }

    /// Remove the session with this id. Returns whether one was removed.
    pub fn remove(&mut self, id: SessionId) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|session| session.id != id);
        self.sessions.len() != before
    }

    /// Newest date first; sessions on the same date keep insertion order.
    #[must_use]
    pub fn ordered(&self) -> Vec<&StudySession> {
        let mut ordered: Vec<&StudySession> = self.sessions.iter().collect();
        ordered.sort_by(|a, b| b.date.cmp(&a.date));
        ordered
    }

    /// Recomputed from the live sessions on every call.
    #[must_use]
    pub fn summary(&self) -> SessionLogSummary {
        let qualifying_count = self.sessions.iter().filter(|s| s.qualifies()).count();
        SessionLogSummary {
            session_count: self.sessions.len(),
            total_minutes: self
                .sessions
                .iter()
                .map(|s| u64::from(s.duration_minutes))
                .sum(),
            qualifying_count,
            requirement_met: qualifying_count >= QUOTA_SESSIONS,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn add(log: &mut SessionLog, day: &str, topic: &str, minutes: u32, now: u64) -> StudySession {
        log.add(
            SessionDraft::new(Some(date(day)), topic, minutes, ""),
            &TopicCatalog::french_grammar(),
            now,
        )
        .unwrap()
    }

    #[test]
    fn add_snapshots_catalog_label() {
        let mut log = SessionLog::new();
        let known = add(&mut log, "2024-01-01", "negation", 30, 1);
        let unknown = add(&mut log, "2024-01-02", "subjonctif", 30, 2);
        assert_eq!(known.topic_name(), "La négation");
        assert_eq!(unknown.topic_name(), "subjonctif");
    }

    #[test]
    fn missing_fields_leave_log_untouched() {
        let mut log = SessionLog::new();
        let catalog = TopicCatalog::french_grammar();

        let err = log
            .add(SessionDraft::new(None, "negation", 60, ""), &catalog, 1)
            .unwrap_err();
        assert_eq!(err, SessionDraftError::MissingDate);

        let err = log
            .add(
                SessionDraft::new(Some(date("2024-01-01")), "  ", 60, ""),
                &catalog,
                1,
            )
            .unwrap_err();
        assert_eq!(err, SessionDraftError::MissingTopic);
        assert!(log.is_empty());
    }

    #[test]
    fn ordered_is_newest_first() {
        let mut log = SessionLog::new();
        add(&mut log, "2024-01-01", "negation", 60, 1);
        add(&mut log, "2024-03-01", "negation", 60, 2);
        add(&mut log, "2024-02-01", "negation", 60, 3);

        let dates: Vec<NaiveDate> = log.ordered().iter().map(|s| s.date()).collect();
        assert_eq!(
            dates,
            vec![date("2024-03-01"), date("2024-02-01"), date("2024-01-01")]
        );
    }

    #[test]
    fn same_date_keeps_insertion_order() {
        let mut log = SessionLog::new();
        let first = add(&mut log, "2024-01-01", "negation", 60, 1);
        add(&mut log, "2024-02-01", "negation", 60, 2);
        let second = add(&mut log, "2024-01-01", "imparfait", 60, 3);

        let ids: Vec<SessionId> = log.ordered().iter().map(|s| s.id()).collect();
        assert_eq!(ids[1], first.id());
        assert_eq!(ids[2], second.id());
    }

    #[test]
    fn quota_needs_eight_sessions_of_an_hour() {
        let mut log = SessionLog::new();
        for n in 0..7 {
            add(&mut log, "2024-01-01", "negation", 60, n);
        }
        add(&mut log, "2024-01-02", "negation", 59, 100);

        let summary = log.summary();
        assert_eq!(summary.session_count, 8);
        assert_eq!(summary.qualifying_count, 7);
        assert!(!summary.requirement_met);
        assert_eq!(summary.remaining(), 1);

        add(&mut log, "2024-01-03", "negation", 60, 200);
        let summary = log.summary();
        assert_eq!(summary.qualifying_count, 8);
        assert!(summary.requirement_met);
        assert_eq!(summary.total_minutes, 7 * 60 + 59 + 60);
        assert_eq!(summary.remaining(), 0);
    }

    #[test]
    fn ids_stay_unique_when_clock_repeats() {
        let mut log = SessionLog::new();
        let a = add(&mut log, "2024-01-01", "negation", 60, 1_000);
        let b = add(&mut log, "2024-01-01", "negation", 60, 1_000);
        let c = add(&mut log, "2024-01-01", "negation", 60, 5_000);
        assert_eq!(a.id().value(), 1_000);
        assert_eq!(b.id().value(), 1_001);
        assert_eq!(c.id().value(), 5_000);
    }

    #[test]
    fn ids_stay_unique_past_the_largest_id() {
        let top = StudySession::from_persisted(
            SessionId::new(u64::MAX),
            date("2024-01-01"),
            TopicId::new("negation"),
            "La négation".into(),
            60,
            String::new(),
        );
        let mut log = SessionLog::from_persisted(vec![top.clone()]);

        let a = add(&mut log, "2024-01-02", "negation", 60, 1_700_000_000_000);
        let b = add(&mut log, "2024-01-03", "negation", 60, 1_700_000_000_000);
        assert_ne!(a.id(), top.id());
        assert_eq!(a.id().value(), u64::MAX - 1);
        assert_eq!(b.id().value(), u64::MAX - 2);
        assert_eq!(log.len(), 3);

        assert!(log.remove(a.id()));
        assert_eq!(log.len(), 2);
        assert!(log.sessions().contains(&top));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut log = SessionLog::new();
        let kept = add(&mut log, "2024-01-01", "negation", 60, 1);
        let gone = add(&mut log, "2024-01-02", "negation", 60, 2);

        assert!(log.remove(gone.id()));
        let after_once = log.clone();
        assert!(!log.remove(gone.id()));
        assert_eq!(log, after_once);
        assert_eq!(log.sessions(), &[kept]);
    }

    #[test]
    fn from_persisted_drops_repeated_ids() {
        let session = StudySession::from_persisted(
            SessionId::new(7),
            date("2024-01-01"),
            TopicId::new("negation"),
            "La négation".into(),
            60,
            String::new(),
        );
        let log = SessionLog::from_persisted(vec![session.clone(), session]);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn form_reports_missing_fields_first() {
        assert_eq!(
            SessionDraft::from_form("", "negation", "x", "").unwrap_err(),
            SessionDraftError::MissingDate
        );
        assert_eq!(
            SessionDraft::from_form("2024-01-01", "", "x", "").unwrap_err(),
            SessionDraftError::MissingTopic
        );
    }

    #[test]
    fn form_rejects_bad_date_and_duration() {
        assert!(matches!(
            SessionDraft::from_form("01/02/2024", "negation", "60", ""),
            Err(SessionDraftError::InvalidDate { .. })
        ));
        assert!(matches!(
            SessionDraft::from_form("2024-01-01", "negation", "-5", ""),
            Err(SessionDraftError::InvalidDuration { .. })
        ));
        let draft = SessionDraft::from_form("2024-01-01", " negation ", " 45 ", "notes").unwrap();
        assert_eq!(draft.topic_id, "negation");
        assert_eq!(draft.duration_minutes, 45);
    }
}
