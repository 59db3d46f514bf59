use std::sync::Arc;

use storage::repository::Storage;
use study_core::model::TopicCatalog;

use crate::Clock;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::study_log_service::StudyLogService;

/// The two aggregates a presentation layer works against, loaded from one
/// `Storage` and sharing one topic catalog.
pub struct AppServices {
    catalog: Arc<TopicCatalog>,
    progress: ProgressService,
    study_log: StudyLogService,
}

impl AppServices {
    /// Load both aggregates from the given storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if either store cannot be read.
    pub async fn load(
        storage: &Storage,
        clock: Clock,
        catalog: TopicCatalog,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(catalog);
        let progress =
            ProgressService::load(Arc::clone(&catalog), Arc::clone(&storage.progress)).await?;
        let study_log = StudyLogService::load(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.sessions),
        )
        .await?;

        Ok(Self {
            catalog,
            progress,
            study_log,
        })
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: TopicCatalog,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::load(&storage, clock, catalog).await
    }

    #[must_use]
    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressService {
        &mut self.progress
    }

    #[must_use]
    pub fn study_log(&self) -> &StudyLogService {
        &self.study_log
    }

    pub fn study_log_mut(&mut self) -> &mut StudyLogService {
        &mut self.study_log
    }
}
