use chrono::NaiveDate;
use std::sync::Arc;

use kvansum::{
    catalog::seed,
    habit::{InMemoryHabitRepository, InMemoryLogRepository},
    progress::{InMemoryProgressRepository, InMemoryStatsRepository},
    AppState, Difficulty, EventBus, FixedClock, Habit, InMemoryCatalogRepository,
    ProgressionConfig, ProgressionService,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub service: Arc<ProgressionService>,
    pub clock: Arc<FixedClock>,
    pub events: Arc<EventBus>,
    pub log_repository: Arc<InMemoryLogRepository>,
    pub habit_repository: Arc<InMemoryHabitRepository>,
    pub user_id: String,
}

pub struct TestSetupBuilder {
    user_id: String,
    start: NaiveDate,
    config: ProgressionConfig,
    habits: Vec<Habit>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            user_id: "user-1".to_string(),
            start: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            config: ProgressionConfig::default(),
            habits: vec![],
        }
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = start;
        self
    }

    pub fn with_config(mut self, config: ProgressionConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a habit owned by the setup's user
    pub fn with_habit(mut self, id: &str, level_id: &str, difficulty: Difficulty) -> Self {
        self.habits
            .push(Habit::new(id, &self.user_id, level_id, id, difficulty));
        self
    }

    pub fn with_raw_habit(mut self, habit: Habit) -> Self {
        self.habits.push(habit);
        self
    }

    /// Two easy first-level habits, the smallest set that can open the second level
    pub fn with_two_level_one_habits(self) -> Self {
        self.with_habit("h-water", "lvl1", Difficulty::Easy)
            .with_habit("h-bed", "lvl1", Difficulty::Easy)
    }

    pub fn with_starter_habits(mut self) -> Self {
        self.habits.extend(seed::starter_habits(&self.user_id));
        self
    }

    pub fn build(self) -> TestSetup {
        let clock = Arc::new(FixedClock::at_day(self.start));
        let events = Arc::new(EventBus::new());
        let log_repository = Arc::new(InMemoryLogRepository::new());
        let habit_repository = Arc::new(InMemoryHabitRepository::with_habits(self.habits));

        let state = AppState {
            habit_repository: habit_repository.clone(),
            log_repository: log_repository.clone(),
            progress_repository: Arc::new(InMemoryProgressRepository::new()),
            stats_repository: Arc::new(InMemoryStatsRepository::new()),
            catalog: Arc::new(InMemoryCatalogRepository::seeded()),
            notifications: events.clone(),
            clock: clock.clone(),
            config: self.config,
        };

        TestSetup {
            service: Arc::new(ProgressionService::new(state)),
            clock,
            events,
            log_repository,
            habit_repository,
            user_id: self.user_id,
        }
    }
}
