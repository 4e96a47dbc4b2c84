use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::CatalogRepository;
use crate::clock::Clock;
use crate::config::ProgressionConfig;
use crate::event::NotificationSink;
use crate::habit::repository::{HabitRepository, LogRepository};
use crate::progress::repository::{ProgressRepository, StatsRepository};

/// Shared application state containing all collaborators the progression core talks to
#[derive(Clone)]
pub struct AppState {
    pub habit_repository: Arc<dyn HabitRepository>,
    pub log_repository: Arc<dyn LogRepository>,
    pub progress_repository: Arc<dyn ProgressRepository>,
    pub stats_repository: Arc<dyn StatsRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub notifications: Arc<dyn NotificationSink>,
    pub clock: Arc<dyn Clock>,
    pub config: ProgressionConfig,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown habit: {0}")]
    UnknownHabit(String),

    #[error("Unknown level: {0}")]
    UnknownLevel(String),

    #[error("Unknown artefact: {0}")]
    UnknownArtefact(String),

    #[error("Conflicting log for habit {habit_id} on {date}")]
    DuplicateLogConflict { habit_id: String, date: NaiveDate },

    #[error("Repository error: {0}")]
    Repository(String),
}
