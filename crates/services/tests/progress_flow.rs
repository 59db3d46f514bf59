use std::sync::Arc;

use services::ProgressService;
use storage::repository::{BlobStore, PROGRESS_KEY, Storage};
use study_core::model::{ExerciseId, TopicCatalog, TopicId};

async fn load(storage: &Storage) -> ProgressService {
    ProgressService::load(
        Arc::new(TopicCatalog::french_grammar()),
        Arc::clone(&storage.progress),
    )
    .await
    .expect("load progress")
}

#[tokio::test]
async fn progress_survives_reload_and_reset_clears_store() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let mut progress = load(&storage).await;

    let outcomes = [
        ("negation", "1", true),
        ("negation", "2", false),
        ("negation", "2", true),
        ("imparfait", "1", true),
        ("imparfait", "2", false),
        ("not-in-catalog", "1", true),
    ];
    for (topic, exercise, correct) in outcomes {
        progress
            .record_outcome(TopicId::new(topic), ExerciseId::new(exercise), correct)
            .await
            .expect("record");
    }

    let negation = progress.stats_for_topic("negation");
    assert_eq!((negation.attempted, negation.correct), (2, 2));
    let global = progress.global_stats();
    assert_eq!(global.total_attempted, 4);
    assert_eq!(global.total_correct, 3);
    assert_eq!(global.percentage(), 75);
    assert!(progress.completed_topics().contains("negation"));
    assert!(!progress.completed_topics().contains("imparfait"));

    let reloaded = load(&storage).await;
    assert_eq!(reloaded.ledger(), progress.ledger());
    assert_eq!(reloaded.global_stats(), global);
    assert_eq!(reloaded.completed_topics(), progress.completed_topics());
    assert_eq!(reloaded.topic_scores(), progress.topic_scores());

    progress.reset().await.expect("reset");
    progress.reset().await.expect("reset is idempotent");
    for entry in TopicCatalog::french_grammar().iter() {
        let stats = progress.stats_for_topic(entry.id.as_str());
        assert_eq!((stats.attempted, stats.correct), (0, 0));
    }
    assert_eq!(storage.blobs.get(PROGRESS_KEY).await.unwrap(), None);
    assert!(load(&storage).await.ledger().is_empty());
}

#[tokio::test]
async fn unreadable_progress_blob_starts_empty() {
    let storage = Storage::in_memory();
    storage
        .blobs
        .put(PROGRESS_KEY, "definitely not json")
        .await
        .unwrap();

    let mut progress = load(&storage).await;
    assert!(progress.ledger().is_empty());

    progress
        .record_outcome(TopicId::new("negation"), ExerciseId::new("1"), true)
        .await
        .unwrap();
    assert_eq!(
        storage.blobs.get(PROGRESS_KEY).await.unwrap().as_deref(),
        Some(r#"{"negation":{"1":true}}"#)
    );
}
