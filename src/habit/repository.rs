use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{CompletionLog, Habit};
use crate::shared::AppError;

#[async_trait]
pub trait HabitRepository: Send + Sync {
    async fn create_habit(&self, habit: &Habit) -> Result<(), AppError>;
    async fn get_habit(&self, habit_id: &str) -> Result<Option<Habit>, AppError>;
    /// Active (non-archived) habits of one user in one level
    async fn get_habits_for_level(
        &self,
        user_id: &str,
        level_id: &str,
    ) -> Result<Vec<Habit>, AppError>;
    /// Active habits of one user
    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>, AppError>;
    async fn save_habit(&self, habit: &Habit) -> Result<(), AppError>;
    async fn archive_habit(&self, habit_id: &str) -> Result<Habit, AppError>;
}

#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn get_log(
        &self,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<Option<CompletionLog>, AppError>;

    /// Stores `log` as the single log for its habit and date.
    ///
    /// `expected` is the log the caller read before computing `log`; if the stored log no
    /// longer matches it the write is rejected with `DuplicateLogConflict`.
    async fn upsert_log(
        &self,
        log: &CompletionLog,
        expected: Option<&CompletionLog>,
    ) -> Result<CompletionLog, AppError>;

    /// Logs of one user with `from <= date <= to`, ordered by date
    async fn logs_for_user(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompletionLog>, AppError>;

    async fn logs_for_habit(&self, habit_id: &str) -> Result<Vec<CompletionLog>, AppError>;
}

#[derive(Debug, Default)]
pub struct InMemoryHabitRepository {
    habits: Arc<RwLock<HashMap<String, Habit>>>,
}

impl InMemoryHabitRepository {
    pub fn new() -> Self {
        Self {
            habits: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a repository pre-populated with habits
    pub fn with_habits(habits: Vec<Habit>) -> Self {
        let habits = habits
            .into_iter()
            .map(|habit| (habit.id.clone(), habit))
            .collect();

        Self {
            habits: Arc::new(RwLock::new(habits)),
        }
    }
}

fn active_sorted(mut habits: Vec<Habit>) -> Vec<Habit> {
    habits.retain(Habit::is_active);
    habits.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    habits
}

#[async_trait]
impl HabitRepository for InMemoryHabitRepository {
    #[instrument(skip(self, habit))]
    async fn create_habit(&self, habit: &Habit) -> Result<(), AppError> {
        debug!(habit_id = %habit.id, user_id = %habit.user_id, "Creating habit in memory");

        let mut habits = self.habits.write().await;
        if habits.contains_key(&habit.id) {
            warn!(habit_id = %habit.id, "Habit already exists in memory");
            return Err(AppError::Repository("Habit already exists".to_string()));
        }
        habits.insert(habit.id.clone(), habit.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_habit(&self, habit_id: &str) -> Result<Option<Habit>, AppError> {
        let habits = self.habits.read().await;
        Ok(habits.get(habit_id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_habits_for_level(
        &self,
        user_id: &str,
        level_id: &str,
    ) -> Result<Vec<Habit>, AppError> {
        let habits = self.habits.read().await;
        let matching = habits
            .values()
            .filter(|habit| habit.user_id == user_id && habit.level_id == level_id)
            .cloned()
            .collect();
        Ok(active_sorted(matching))
    }

    #[instrument(skip(self))]
    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>, AppError> {
        let habits = self.habits.read().await;
        let matching = habits
            .values()
            .filter(|habit| habit.user_id == user_id)
            .cloned()
            .collect();
        Ok(active_sorted(matching))
    }

    #[instrument(skip(self, habit))]
    async fn save_habit(&self, habit: &Habit) -> Result<(), AppError> {
        let mut habits = self.habits.write().await;
        match habits.get_mut(&habit.id) {
            Some(stored) => {
                *stored = habit.clone();
                debug!(habit_id = %habit.id, streak = habit.streak, "Habit saved in memory");
                Ok(())
            }
            None => {
                warn!(habit_id = %habit.id, "Habit not found for update in memory");
                Err(AppError::UnknownHabit(habit.id.clone()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn archive_habit(&self, habit_id: &str) -> Result<Habit, AppError> {
        let mut habits = self.habits.write().await;
        let habit = habits
            .get_mut(habit_id)
            .ok_or_else(|| AppError::UnknownHabit(habit_id.to_string()))?;
        habit.is_archived = true;
        debug!(habit_id = %habit_id, "Habit archived in memory");
        Ok(habit.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLogRepository {
    logs: Arc<RwLock<HashMap<(String, NaiveDate), CompletionLog>>>,
}

impl InMemoryLogRepository {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn log_count(&self) -> usize {
        self.logs.read().await.len()
    }
}

#[async_trait]
impl LogRepository for InMemoryLogRepository {
    #[instrument(skip(self))]
    async fn get_log(
        &self,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<Option<CompletionLog>, AppError> {
        let logs = self.logs.read().await;
        Ok(logs.get(&(habit_id.to_string(), date)).cloned())
    }

    #[instrument(skip(self, log, expected))]
    async fn upsert_log(
        &self,
        log: &CompletionLog,
        expected: Option<&CompletionLog>,
    ) -> Result<CompletionLog, AppError> {
        let key = (log.habit_id.clone(), log.date);
        let mut logs = self.logs.write().await;

        if logs.get(&key) != expected {
            warn!(
                habit_id = %log.habit_id,
                date = %log.date,
                "Stored log changed since it was read"
            );
            return Err(AppError::DuplicateLogConflict {
                habit_id: log.habit_id.clone(),
                date: log.date,
            });
        }

        logs.insert(key, log.clone());
        debug!(habit_id = %log.habit_id, date = %log.date, status = %log.status, "Log upserted in memory");
        Ok(log.clone())
    }

    #[instrument(skip(self))]
    async fn logs_for_user(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompletionLog>, AppError> {
        let logs = self.logs.read().await;
        let mut matching: Vec<CompletionLog> = logs
            .values()
            .filter(|log| log.user_id == user_id && log.date >= from && log.date <= to)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.habit_id.cmp(&b.habit_id)));
        Ok(matching)
    }

    #[instrument(skip(self))]
    async fn logs_for_habit(&self, habit_id: &str) -> Result<Vec<CompletionLog>, AppError> {
        let logs = self.logs.read().await;
        let mut matching: Vec<CompletionLog> = logs
            .values()
            .filter(|log| log.habit_id == habit_id)
            .cloned()
            .collect();
        matching.sort_by_key(|log| log.date);
        Ok(matching)
    }
}
