//! JSON snapshot codecs for the two persisted blobs.
//!
//! Ledger: `{ "<topic>": { "<exercise>": true|false } }`.
//! Log: `[{ "id", "date", "topic", "topicName", "duration", "notes" }]`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use study_core::model::{
    ProgressLedger, SessionId, SessionLog, StudySession, TopicId, TopicOutcomes,
};
use tracing::warn;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Persisted shape for a study session.
///
/// Older blobs may carry a `null` or negative duration, or omit the label
/// and notes; those decode leniently instead of failing the whole log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: u64,
    pub date: NaiveDate,
    pub topic: String,
    #[serde(default)]
    pub topic_name: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SessionRecord {
    #[must_use]
    pub fn from_session(session: &StudySession) -> Self {
        Self {
            id: session.id().value(),
            date: session.date(),
            topic: session.topic_id().to_string(),
            topic_name: Some(session.topic_name().to_owned()),
            duration: Some(i64::from(session.duration_minutes())),
            notes: Some(session.notes().to_owned()),
        }
    }

    /// Convert the record back into a domain `StudySession`.
    #[must_use]
    pub fn into_session(self) -> StudySession {
        let duration_minutes = match self.duration {
            Some(minutes) => u32::try_from(minutes).unwrap_or_else(|_| {
                warn!(id = self.id, minutes, "clamping out-of-range session duration");
                if minutes < 0 { 0 } else { u32::MAX }
            }),
            None => 0,
        };
        let topic_name = self.topic_name.unwrap_or_else(|| self.topic.clone());

        StudySession::from_persisted(
            SessionId::new(self.id),
            self.date,
            TopicId::new(self.topic),
            topic_name,
            duration_minutes,
            self.notes.unwrap_or_default(),
        )
    }
}

/// Serialize the full ledger.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_ledger(ledger: &ProgressLedger) -> Result<String, StorageError> {
    serde_json::to_string(ledger.topics()).map_err(ser)
}

/// Decode a ledger blob.
///
/// # Errors
///
/// Returns the underlying JSON error; callers treat it as an empty ledger.
pub fn decode_ledger(raw: &str) -> Result<ProgressLedger, serde_json::Error> {
    let topics: BTreeMap<TopicId, TopicOutcomes> = serde_json::from_str(raw)?;
    Ok(ProgressLedger::from_persisted(topics))
}

/// Serialize the full log in insertion order.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_log(log: &SessionLog) -> Result<String, StorageError> {
    let records: Vec<SessionRecord> = log
        .sessions()
        .iter()
        .map(SessionRecord::from_session)
        .collect();
    serde_json::to_string(&records).map_err(ser)
}

/// Decode a session log blob.
///
/// # Errors
///
/// Returns the underlying JSON error; callers treat it as an empty log.
pub fn decode_log(raw: &str) -> Result<SessionLog, serde_json::Error> {
    let records: Vec<SessionRecord> = serde_json::from_str(raw)?;
    Ok(SessionLog::from_persisted(
        records.into_iter().map(SessionRecord::into_session).collect(),
    ))
}
