// Public API - what other modules can use
pub use calculator::{CompletionOutcome, StreakCalculator};
pub use models::*;
pub use points::{calculator_priority, PointsCalculator, PointsContext, PointsEngine};
pub use repository::{HabitRepository, InMemoryHabitRepository, InMemoryLogRepository, LogRepository};

// Internal modules
mod calculator;
pub mod models;
pub mod points;
pub mod repository;
