mod catalog;
pub mod exercise;
mod ids;
mod progress;
mod session;

pub use catalog::{CatalogEntry, CatalogError, TopicCatalog};
pub use exercise::{BlankGrade, FillInBlanks, MultipleChoice};
pub use ids::{ExerciseId, ParseIdError, SessionId, TopicId};

pub use progress::{GlobalStats, ProgressLedger, TopicOutcomes, TopicStats, percentage};
pub use session::{
    QUOTA_MIN_MINUTES, QUOTA_SESSIONS, SessionDraft, SessionDraftError, SessionLog,
    SessionLogSummary, StudySession,
};
