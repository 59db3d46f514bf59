#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress_service;
pub mod study_log_service;

pub use study_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressServiceError, StudyLogError};
pub use progress_service::{ProgressService, TopicScore};
pub use study_log_service::StudyLogService;
