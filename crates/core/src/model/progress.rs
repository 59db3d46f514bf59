use std::collections::{BTreeMap, BTreeSet};

use crate::model::catalog::TopicCatalog;
use crate::model::ids::{ExerciseId, TopicId};

/// Outcomes recorded for one topic, keyed by exercise.
pub type TopicOutcomes = BTreeMap<ExerciseId, bool>;

/// `round(correct / attempted * 100)`, or 0 when nothing was attempted.
///
/// Integer arithmetic rounds halves up, matching `f64::round` for
/// non-negative ratios.
#[must_use]
pub fn percentage(correct: usize, attempted: usize) -> u32 {
    if attempted == 0 {
        return 0;
    }
    let pct = (correct.saturating_mul(200) + attempted) / attempted.saturating_mul(2);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Derived statistics for a single topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicStats {
    pub attempted: usize,
    pub correct: usize,
}

impl TopicStats {
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.correct, self.attempted)
    }

    /// Completed iff at least one attempt and every attempt correct.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.attempted > 0 && self.correct == self.attempted
    }
}

/// Statistics summed over every catalog topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalStats {
    pub total_correct: usize,
    pub total_attempted: usize,
}

impl GlobalStats {
    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.total_correct, self.total_attempted)
    }
}

//
// ─── LEDGER ────────────────────────────────────────────────────────────────────
//

/// Per-topic, per-exercise pass/fail history.
///
/// At most one outcome is kept per `(topic, exercise)`; recording again
/// overwrites the previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressLedger {
    topics: BTreeMap<TopicId, TopicOutcomes>,
}

impl ProgressLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a ledger from its persisted shape.
    #[must_use]
    pub fn from_persisted(topics: BTreeMap<TopicId, TopicOutcomes>) -> Self {
        Self { topics }
    }

    /// Persisted shape: topic id to exercise id to outcome.
    #[must_use]
    pub fn topics(&self) -> &BTreeMap<TopicId, TopicOutcomes> {
        &self.topics
    }

    /// Insert or overwrite the outcome for one exercise.
    pub fn record_outcome(&mut self, topic: TopicId, exercise: ExerciseId, correct: bool) {
        self.topics.entry(topic).or_default().insert(exercise, correct);
    }

    #[must_use]
    pub fn outcome(&self, topic: &str, exercise: &str) -> Option<bool> {
        self.topics.get(topic)?.get(exercise).copied()
    }

    /// Zeros for a topic that has never been recorded.
    #[must_use]
    pub fn stats_for_topic(&self, topic: &str) -> TopicStats {
        self.topics
            .get(topic)
            .map(|outcomes| TopicStats {
                attempted: outcomes.len(),
                correct: outcomes.values().filter(|ok| **ok).count(),
            })
            .unwrap_or_default()
    }

    /// Sum over the catalog only; ledger topics missing from the catalog do
    /// not count.
    #[must_use]
    pub fn global_stats(&self, catalog: &TopicCatalog) -> GlobalStats {
        catalog
            .topic_ids()
            .map(|topic| self.stats_for_topic(topic.as_str()))
            .fold(GlobalStats::default(), |acc, stats| GlobalStats {
                total_correct: acc.total_correct + stats.correct,
                total_attempted: acc.total_attempted + stats.attempted,
            })
    }

    /// Every ledger topic whose attempts are all correct.
    #[must_use]
    pub fn completed_topics(&self) -> BTreeSet<TopicId> {
        self.topics
            .keys()
            .filter(|topic| self.stats_for_topic(topic.as_str()).is_completed())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.values().all(BTreeMap::is_empty)
    }

    pub fn clear(&mut self) {
        self.topics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ledger: &mut ProgressLedger, topic: &str, exercise: &str, correct: bool) {
        ledger.record_outcome(TopicId::new(topic), ExerciseId::new(exercise), correct);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 200), 1);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn unknown_topic_has_zero_stats() {
        let ledger = ProgressLedger::new();
        let stats = ledger.stats_for_topic("negation");
        assert_eq!(stats, TopicStats::default());
        assert_eq!(stats.percentage(), 0);
        assert!(!stats.is_completed());
    }

    #[test]
    fn last_write_wins_per_exercise() {
        let mut ledger = ProgressLedger::new();
        record(&mut ledger, "negation", "1", false);
        record(&mut ledger, "negation", "2", true);
        record(&mut ledger, "negation", "1", true);

        let stats = ledger.stats_for_topic("negation");
        assert_eq!(stats.attempted, 2);
        assert_eq!(stats.correct, 2);
        assert_eq!(ledger.outcome("negation", "1"), Some(true));
    }

    #[test]
    fn exercise_ids_are_scoped_per_topic() {
        let mut ledger = ProgressLedger::new();
        record(&mut ledger, "negation", "1", true);
        record(&mut ledger, "imparfait", "1", false);

        assert_eq!(ledger.stats_for_topic("negation").correct, 1);
        assert_eq!(ledger.stats_for_topic("imparfait").correct, 0);
    }

    #[test]
    fn global_stats_ignore_topics_outside_catalog() {
        let catalog = TopicCatalog::french_grammar();
        let mut ledger = ProgressLedger::new();
        record(&mut ledger, "negation", "1", true);
        record(&mut ledger, "negation", "2", false);
        record(&mut ledger, "imparfait", "1", true);
        record(&mut ledger, "stale-topic", "1", true);

        let global = ledger.global_stats(&catalog);
        assert_eq!(global.total_attempted, 3);
        assert_eq!(global.total_correct, 2);
        assert_eq!(global.percentage(), 67);
    }

    #[test]
    fn empty_ledger_global_percentage_is_zero() {
        let global = ProgressLedger::new().global_stats(&TopicCatalog::french_grammar());
        assert_eq!(global, GlobalStats::default());
        assert_eq!(global.percentage(), 0);
    }

    #[test]
    fn one_incorrect_outcome_uncompletes_a_topic() {
        let mut ledger = ProgressLedger::new();
        record(&mut ledger, "negation", "1", true);
        record(&mut ledger, "negation", "2", true);
        assert!(ledger.completed_topics().contains("negation"));

        record(&mut ledger, "negation", "3", false);
        assert!(!ledger.completed_topics().contains("negation"));
    }

    #[test]
    fn clear_empties_every_topic() {
        let mut ledger = ProgressLedger::new();
        record(&mut ledger, "negation", "1", true);
        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.stats_for_topic("negation"), TopicStats::default());
    }
}
