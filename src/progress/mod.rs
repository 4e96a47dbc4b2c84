pub use models::{UserProgress, UserStats};
pub use repository::{
    InMemoryProgressRepository, InMemoryStatsRepository, ProgressRepository, StatsRepository,
};

pub mod models;
pub mod repository;
