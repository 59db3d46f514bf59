use std::collections::BTreeSet;
use std::sync::Arc;

use storage::repository::ProgressRepository;
use study_core::model::{
    BlankGrade, ExerciseId, FillInBlanks, GlobalStats, MultipleChoice, ProgressLedger,
    TopicCatalog, TopicId, TopicStats,
};
use tracing::{debug, info};

use crate::error::ProgressServiceError;

/// Per-topic score row, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicScore {
    pub topic_id: TopicId,
    pub label: String,
    pub correct: usize,
    pub attempted: usize,
    pub percentage: u32,
}

/// Owns the progress ledger and keeps its persisted copy in step.
///
/// Every mutation writes the whole ledger before returning. The in-memory
/// ledger only changes once that write has succeeded.
pub struct ProgressService {
    catalog: Arc<TopicCatalog>,
    repo: Arc<dyn ProgressRepository>,
    ledger: ProgressLedger,
}

impl ProgressService {
    /// Load the persisted ledger (empty if absent or unreadable).
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store cannot be read.
    pub async fn load(
        catalog: Arc<TopicCatalog>,
        repo: Arc<dyn ProgressRepository>,
    ) -> Result<Self, ProgressServiceError> {
        let ledger = repo.load_ledger().await?;
        debug!(topics = ledger.topics().len(), "progress ledger loaded");
        Ok(Self {
            catalog,
            repo,
            ledger,
        })
    }

    #[must_use]
    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    /// Insert or overwrite one outcome and persist the ledger.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if persistence fails; the
    /// ledger is left as it was.
    pub async fn record_outcome(
        &mut self,
        topic: TopicId,
        exercise: ExerciseId,
        correct: bool,
    ) -> Result<(), ProgressServiceError> {
        let mut next = self.ledger.clone();
        next.record_outcome(topic.clone(), exercise.clone(), correct);
        self.repo.save_ledger(&next).await?;
        self.ledger = next;

        debug!(%topic, %exercise, correct, "outcome recorded");
        Ok(())
    }

    /// Grade a multiple-choice answer and record the outcome.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn answer_choice(
        &mut self,
        topic: TopicId,
        exercise: ExerciseId,
        question: &MultipleChoice,
        selected: usize,
    ) -> Result<bool, ProgressServiceError> {
        let correct = question.grade(selected);
        self.record_outcome(topic, exercise, correct).await?;
        Ok(correct)
    }

    /// Grade a fill-in-the-blank answer and record the outcome.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn answer_blanks<S: AsRef<str>>(
        &mut self,
        topic: TopicId,
        exercise: ExerciseId,
        question: &FillInBlanks,
        inputs: &[S],
    ) -> Result<BlankGrade, ProgressServiceError> {
        let grade = question.grade(inputs);
        self.record_outcome(topic, exercise, grade.all_correct())
            .await?;
        Ok(grade)
    }

    #[must_use]
    pub fn stats_for_topic(&self, topic: &str) -> TopicStats {
        self.ledger.stats_for_topic(topic)
    }

    /// Totals over catalog topics only.
    #[must_use]
    pub fn global_stats(&self) -> GlobalStats {
        self.ledger.global_stats(&self.catalog)
    }

    #[must_use]
    pub fn completed_topics(&self) -> BTreeSet<TopicId> {
        self.ledger.completed_topics()
    }

    /// Catalog topics with at least one attempt.
    #[must_use]
    pub fn topic_scores(&self) -> Vec<TopicScore> {
        self.catalog
            .iter()
            .filter_map(|entry| {
                let stats = self.ledger.stats_for_topic(entry.id.as_str());
                (stats.attempted > 0).then(|| TopicScore {
                    topic_id: entry.id.clone(),
                    label: entry.label.clone(),
                    correct: stats.correct,
                    attempted: stats.attempted,
                    percentage: stats.percentage(),
                })
            })
            .collect()
    }

    /// Forget every outcome and delete the persisted ledger. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the blob cannot be deleted;
    /// the in-memory ledger is kept in that case.
    pub async fn reset(&mut self) -> Result<(), ProgressServiceError> {
        self.repo.clear_ledger().await?;
        self.ledger.clear();
        info!("progress reset");
        Ok(())
    }
}
