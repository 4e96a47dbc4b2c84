// Kvansum habit progression engine
// This file exposes the public API for the demo binary and integration tests

pub mod artefact;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod event;
pub mod habit;
pub mod level;
pub mod progress;
pub mod progression;
pub mod rank;
pub mod shared;
pub mod summary;

// Re-export commonly used types for easier access in tests
pub use artefact::{Artefact, ArtefactResolver, UnlockRule};
pub use catalog::{CatalogRepository, InMemoryCatalogRepository};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ProgressionConfig;
pub use event::{EventBus, NotificationSink, ProgressEvent};
pub use habit::{CompletionLog, Difficulty, Habit, LogStatus, StreakCalculator};
pub use level::{Level, LevelEvaluator};
pub use progress::{UserProgress, UserStats};
pub use progression::{CompletionReport, ProgressSnapshot, ProgressionService};
pub use rank::Rank;
pub use shared::{AppError, AppState};
