use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::{UserProgress, UserStats};
use crate::shared::AppError;

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn get_progress(&self, user_id: &str) -> Result<Option<UserProgress>, AppError>;
    async fn save_progress(&self, progress: &UserProgress) -> Result<(), AppError>;
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn get_user_stats(&self, user_id: &str) -> Result<Option<UserStats>, AppError>;
    async fn save_user_stats(&self, stats: &UserStats) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct InMemoryProgressRepository {
    progress: Arc<RwLock<HashMap<String, UserProgress>>>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self {
            progress: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    #[instrument(skip(self))]
    async fn get_progress(&self, user_id: &str) -> Result<Option<UserProgress>, AppError> {
        let progress = self.progress.read().await;
        Ok(progress.get(user_id).cloned())
    }

    #[instrument(skip(self, progress))]
    async fn save_progress(&self, progress: &UserProgress) -> Result<(), AppError> {
        debug!(
            user_id = %progress.user_id,
            tracked_habits = progress.habit_streak.len(),
            "Saving progress in memory"
        );
        let mut stored = self.progress.write().await;
        stored.insert(progress.user_id.clone(), progress.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStatsRepository {
    stats: Arc<RwLock<HashMap<String, UserStats>>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    #[instrument(skip(self))]
    async fn get_user_stats(&self, user_id: &str) -> Result<Option<UserStats>, AppError> {
        let stats = self.stats.read().await;
        Ok(stats.get(user_id).cloned())
    }

    #[instrument(skip(self, stats))]
    async fn save_user_stats(&self, stats: &UserStats) -> Result<(), AppError> {
        debug!(
            user_id = %stats.user_id,
            total_points = stats.total_points,
            rank = %stats.current_rank,
            "Saving user stats in memory"
        );
        let mut stored = self.stats.write().await;
        stored.insert(stats.user_id.clone(), stats.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn progress_round_trips_per_user() {
        let repo = InMemoryProgressRepository::new();
        let progress = UserProgress::new("user-1")
            .with_streak("h-water", 18)
            .with_level_unlocked("lvl1", NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());

        repo.save_progress(&progress).await.unwrap();

        assert_eq!(repo.get_progress("user-1").await.unwrap(), Some(progress));
        assert_eq!(repo.get_progress("user-2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn saving_stats_overwrites_previous() {
        let repo = InMemoryStatsRepository::new();
        let mut stats = UserStats::new("user-1");
        repo.save_user_stats(&stats).await.unwrap();

        stats.award_points(450);
        repo.save_user_stats(&stats).await.unwrap();

        let stored = repo.get_user_stats("user-1").await.unwrap().unwrap();
        assert_eq!(stored.total_points, 450);
        assert_eq!(stored.current_level, 5);
    }
}
