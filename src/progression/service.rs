use chrono::{Duration, NaiveDate};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use super::models::{CompletionReport, LevelView, ProgressSnapshot};
use crate::artefact::{sort_unlocked_first, Artefact, ArtefactResolver, ArtefactStatus};
use crate::clock::parse_day;
use crate::event::ProgressEvent;
use crate::habit::{CompletionLog, Habit, LogStatus, StreakCalculator};
use crate::level::{next_level, Level, LevelEvaluator};
use crate::progress::{UserProgress, UserStats};
use crate::rank::{entries, progress_to_next};
use crate::shared::{AppError, AppState};
use crate::summary::{self, DaySummary, WeeklySummary};

const DASHBOARD_DAYS: u32 = 7;

/// Levels, the user's active habits grouped by level, and their progress
struct UserContext {
    levels: Vec<Level>,
    habits_by_level: HashMap<String, Vec<Habit>>,
    progress: UserProgress,
}

impl UserContext {
    fn habits_in(&self, level_id: &str) -> &[Habit] {
        self.habits_by_level
            .get(level_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn replace_habit(&mut self, habit: &Habit) {
        if let Some(slot) = self
            .habits_by_level
            .get_mut(&habit.level_id)
            .and_then(|habits| habits.iter_mut().find(|stored| stored.id == habit.id))
        {
            *slot = habit.clone();
        }
    }
}

/// Prior and updated values of everything one completion writes besides its log
struct PendingWrites<'a> {
    habit: (&'a Habit, &'a Habit),
    progress: (&'a UserProgress, &'a UserProgress),
    stats: (&'a UserStats, &'a UserStats),
}

/// Applies completion events to habits, progress and stats, and answers progression queries
pub struct ProgressionService {
    state: AppState,
    streaks: StreakCalculator,
    evaluator: LevelEvaluator,
    user_mutexes: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl ProgressionService {
    pub fn new(state: AppState) -> Self {
        let streaks = StreakCalculator::new(&state.config);
        let evaluator = LevelEvaluator::new(&state.config);
        Self {
            state,
            streaks,
            evaluator,
            user_mutexes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Records `status` for `habit_id` on `date` and propagates it through streaks, points,
    /// level unlocks and artefacts. Events for one user are applied one at a time.
    #[instrument(skip(self, note))]
    pub async fn log_completion(
        &self,
        user_id: &str,
        habit_id: &str,
        date: &str,
        status: LogStatus,
        note: Option<String>,
    ) -> Result<CompletionReport, AppError> {
        let day = parse_day(date)?;

        let user_lock = self.user_lock(user_id).await;
        let _guard = user_lock.lock().await;

        let habit = self
            .owned_habit(user_id, habit_id)
            .await?
            .filter(Habit::is_active)
            .ok_or_else(|| AppError::UnknownHabit(habit_id.to_string()))?;
        let now = self.state.clock.now();
        let today = self.state.clock.today();

        let existing = self.state.log_repository.get_log(habit_id, day).await?;
        let outcome =
            self.streaks
                .apply_on_day(&habit, day, status, note, existing.as_ref(), now);

        let mut context = self.load_context(user_id, today).await?;
        context.replace_habit(&outcome.habit);
        let prior_progress = context.progress.clone();
        context.progress.record_outcome(habit_id, day, status);
        context
            .progress
            .set_streak(habit_id, outcome.habit.streak);

        let prior_stats = self.load_stats(user_id).await?;
        let mut stats = prior_stats.clone();
        let previous_rank = stats.current_rank;
        stats.award_points(outcome.points_earned);
        stats.record_streak(outcome.habit.streak, now);

        let unlocked_levels = self.unlock_levels(&mut context, today);
        let artefacts = self.state.catalog.list_artefacts().await?;
        let unlocked_artefacts = self.unlock_artefacts(&mut context, &artefacts, today);

        let pending = PendingWrites {
            habit: (&habit, &outcome.habit),
            progress: (&prior_progress, &context.progress),
            stats: (&prior_stats, &stats),
        };
        let log = self
            .commit(&pending, &outcome.log, existing.as_ref())
            .await?;

        let report = CompletionReport {
            log,
            habit: outcome.habit,
            points_earned: outcome.points_earned,
            previous_streak: outcome.previous_streak,
            stats,
            previous_rank,
            unlocked_levels,
            unlocked_artefacts,
        };

        info!(
            user_id = %user_id,
            habit_id = %habit_id,
            date = %day,
            status = %status,
            points = report.points_earned,
            streak = report.habit.streak,
            total_points = report.stats.total_points,
            "Completion applied"
        );

        self.publish(&report, &artefacts, today).await;
        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn snapshot(&self, user_id: &str) -> Result<ProgressSnapshot, AppError> {
        let today = self.state.clock.today();
        let context = self.load_context(user_id, today).await?;
        let stats = self.load_stats(user_id).await?;

        let levels = context
            .levels
            .iter()
            .map(|level| self.view_level(&context, level, today))
            .collect();

        let artefacts = self.state.catalog.list_artefacts().await?;
        let unlocked = self.resolver(&context).resolve_sticky(&artefacts, &context.progress, today);

        Ok(ProgressSnapshot {
            user_id: user_id.to_string(),
            as_of: today,
            rank_progress: progress_to_next(stats.total_points),
            ranks: entries(stats.total_points),
            stats,
            levels,
            artefacts: sort_unlocked_first(&artefacts, &unlocked),
        })
    }

    pub async fn level_view(&self, user_id: &str, level_id: &str) -> Result<LevelView, AppError> {
        let today = self.state.clock.today();
        let context = self.load_context(user_id, today).await?;
        let level = context
            .levels
            .iter()
            .find(|level| level.id == level_id)
            .ok_or_else(|| AppError::UnknownLevel(level_id.to_string()))?;

        Ok(self.view_level(&context, level, today))
    }

    /// Windowed completion rate of one level as of today
    pub async fn completion_rate(&self, user_id: &str, level_id: &str) -> Result<f64, AppError> {
        Ok(self.level_view(user_id, level_id).await?.completion_rate)
    }

    pub async fn artefact_status(
        &self,
        user_id: &str,
        artefact_id: &str,
    ) -> Result<ArtefactStatus, AppError> {
        let artefact = self
            .state
            .catalog
            .get_artefact(artefact_id)
            .await?
            .ok_or_else(|| AppError::UnknownArtefact(artefact_id.to_string()))?;

        let today = self.state.clock.today();
        let context = self.load_context(user_id, today).await?;
        let unlocked = context.progress.unlocked_artefacts.contains(artefact_id)
            || self
                .resolver(&context)
                .rule_holds(&artefact.unlock, &context.progress, today);

        Ok(ArtefactStatus { artefact, unlocked })
    }

    /// Stored progress, or the initial progress of a new user
    pub async fn progress(&self, user_id: &str) -> Result<UserProgress, AppError> {
        let today = self.state.clock.today();
        Ok(self.load_context(user_id, today).await?.progress)
    }

    pub async fn stats(&self, user_id: &str) -> Result<UserStats, AppError> {
        self.load_stats(user_id).await
    }

    #[instrument(skip(self, habit), fields(habit_id = %habit.id, user_id = %habit.user_id))]
    pub async fn create_habit(&self, habit: Habit) -> Result<Habit, AppError> {
        if self.state.catalog.get_level(&habit.level_id).await?.is_none() {
            return Err(AppError::UnknownLevel(habit.level_id.clone()));
        }

        self.state.habit_repository.create_habit(&habit).await?;
        debug!("Habit created");
        Ok(habit)
    }

    #[instrument(skip(self))]
    pub async fn archive_habit(&self, user_id: &str, habit_id: &str) -> Result<Habit, AppError> {
        self.owned_habit(user_id, habit_id)
            .await?
            .ok_or_else(|| AppError::UnknownHabit(habit_id.to_string()))?;
        self.state.habit_repository.archive_habit(habit_id).await
    }

    /// Today's completion summary plus the trailing week, oldest day first
    pub async fn dashboard(
        &self,
        user_id: &str,
    ) -> Result<(DaySummary, Vec<DaySummary>), AppError> {
        let today = self.state.clock.today();
        let habits = self.state.habit_repository.list_habits(user_id).await?;
        let from = today - Duration::days(i64::from(DASHBOARD_DAYS) - 1);
        let logs = self
            .state
            .log_repository
            .logs_for_user(user_id, from, today)
            .await?;

        Ok((
            summary::daily_summary(today, &habits, &logs),
            summary::trailing_days_summary(today, DASHBOARD_DAYS, &habits, &logs),
        ))
    }

    /// Week starting on the Monday of `week_of`, or of the current week when absent
    pub async fn weekly(
        &self,
        user_id: &str,
        week_of: Option<&str>,
    ) -> Result<WeeklySummary, AppError> {
        let anchor = match week_of {
            Some(date) => parse_day(date)?,
            None => self.state.clock.today(),
        };
        let start = summary::week_start(anchor);
        let end = start + Duration::days(6);

        let habits = self.state.habit_repository.list_habits(user_id).await?;
        let logs = self
            .state
            .log_repository
            .logs_for_user(user_id, start, end)
            .await?;

        Ok(summary::weekly_summary(start, &habits, &logs))
    }

    /// The habit when it exists and belongs to `user_id`, archived or not
    async fn owned_habit(&self, user_id: &str, habit_id: &str) -> Result<Option<Habit>, AppError> {
        Ok(self
            .state
            .habit_repository
            .get_habit(habit_id)
            .await?
            .filter(|habit| habit.user_id == user_id))
    }

    /// Saves the habit, progress and stats, then the log. The log goes last so a failed event
    /// leaves the day open for a retry; state already written is put back before returning.
    async fn commit(
        &self,
        pending: &PendingWrites<'_>,
        log: &CompletionLog,
        existing: Option<&CompletionLog>,
    ) -> Result<CompletionLog, AppError> {
        let written = self.write_state(pending).await;
        let result = match &written {
            Ok(()) => self.state.log_repository.upsert_log(log, existing).await,
            Err((_, error)) => Err(error.clone()),
        };

        if let Err(error) = &result {
            let saved = written.as_ref().map_or_else(|(saved, _)| *saved, |()| 3);
            warn!(
                habit_id = %log.habit_id,
                date = %log.date,
                error = %error,
                "Completion not stored, rolling back"
            );
            self.roll_back(pending, saved).await;
        }
        result
    }

    /// Writes habit, progress and stats in that order; on failure reports how many were saved
    async fn write_state(&self, pending: &PendingWrites<'_>) -> Result<(), (usize, AppError)> {
        self.state
            .habit_repository
            .save_habit(pending.habit.1)
            .await
            .map_err(|error| (0, error))?;
        self.state
            .progress_repository
            .save_progress(pending.progress.1)
            .await
            .map_err(|error| (1, error))?;
        self.state
            .stats_repository
            .save_user_stats(pending.stats.1)
            .await
            .map_err(|error| (2, error))
    }

    /// Restores the first `saved` of habit, progress and stats to their prior values
    async fn roll_back(&self, pending: &PendingWrites<'_>, saved: usize) {
        let mut failed = false;
        if saved >= 1 {
            failed |= self.state.habit_repository.save_habit(pending.habit.0).await.is_err();
        }
        if saved >= 2 {
            failed |= self
                .state
                .progress_repository
                .save_progress(pending.progress.0)
                .await
                .is_err();
        }
        if saved >= 3 {
            failed |= self
                .state
                .stats_repository
                .save_user_stats(pending.stats.0)
                .await
                .is_err();
        }

        if failed {
            error!(habit_id = %pending.habit.0.id, "Rollback incomplete");
        }
    }

    async fn load_context(&self, user_id: &str, today: NaiveDate) -> Result<UserContext, AppError> {
        let levels = self.state.catalog.list_levels().await?;

        let mut habits_by_level: HashMap<String, Vec<Habit>> = HashMap::new();
        for habit in self.state.habit_repository.list_habits(user_id).await? {
            habits_by_level
                .entry(habit.level_id.clone())
                .or_default()
                .push(habit);
        }

        let progress = match self.state.progress_repository.get_progress(user_id).await? {
            Some(progress) => progress,
            None => {
                let mut progress = UserProgress::new(user_id);
                if let Some(first) = levels.iter().min_by_key(|level| level.order) {
                    progress.record_level_unlock(first.id.clone(), today);
                }
                progress
            }
        };

        Ok(UserContext {
            levels,
            habits_by_level,
            progress,
        })
    }

    async fn load_stats(&self, user_id: &str) -> Result<UserStats, AppError> {
        Ok(self
            .state
            .stats_repository
            .get_user_stats(user_id)
            .await?
            .unwrap_or_else(|| UserStats::new(user_id)))
    }

    fn resolver<'a>(&'a self, context: &'a UserContext) -> ArtefactResolver<'a> {
        ArtefactResolver::new(&self.evaluator, &context.levels, &context.habits_by_level)
    }

    fn view_level(&self, context: &UserContext, level: &Level, today: NaiveDate) -> LevelView {
        let habits = context.habits_in(&level.id);
        LevelView {
            level: level.clone(),
            unlocked: level.is_unlocked(&context.progress),
            unlocked_at: context.progress.unlocked_at(&level.id),
            habit_count: habits.len(),
            completion_rate: self
                .evaluator
                .completion_rate(level, habits, &context.progress, today),
            next_unlock: self
                .evaluator
                .evaluate_unlock(level, habits, &context.progress, today),
        }
    }

    /// Opens the next level after every unlocked level that qualifies; returns the new ids
    fn unlock_levels(&self, context: &mut UserContext, today: NaiveDate) -> Vec<String> {
        let mut unlocked = Vec::new();

        for level in &context.levels {
            if !level.is_unlocked(&context.progress) {
                continue;
            }

            let habits = context
                .habits_by_level
                .get(&level.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            if !self
                .evaluator
                .can_unlock_next(level, habits, &context.progress, today)
            {
                continue;
            }

            let Some(next) = next_level(&context.levels, level) else {
                continue;
            };
            if next.is_unlocked(&context.progress) {
                continue;
            }

            context.progress.record_level_unlock(next.id.clone(), today);
            info!(
                user_id = %context.progress.user_id,
                from_level = %level.id,
                level_id = %next.id,
                "Level unlocked"
            );
            unlocked.push(next.id.clone());
        }

        unlocked
    }

    /// Folds newly satisfied artefacts into the user's permanent set; returns the new ids
    fn unlock_artefacts(
        &self,
        context: &mut UserContext,
        artefacts: &[Artefact],
        today: NaiveDate,
    ) -> Vec<String> {
        let current: BTreeSet<String> =
            self.resolver(context)
                .resolve_sticky(artefacts, &context.progress, today);

        let newly: Vec<String> = current
            .difference(&context.progress.unlocked_artefacts)
            .cloned()
            .collect();
        context.progress.unlocked_artefacts = current;

        if !newly.is_empty() {
            info!(
                user_id = %context.progress.user_id,
                artefacts = ?newly,
                "Artefacts unlocked"
            );
        }
        newly
    }

    async fn publish(&self, report: &CompletionReport, artefacts: &[Artefact], today: NaiveDate) {
        let user_id = report.habit.user_id.clone();
        let sink = &self.state.notifications;

        sink.notify(ProgressEvent::HabitCompleted {
            user_id: user_id.clone(),
            habit_id: report.habit.id.clone(),
            date: report.log.date,
            status: report.log.status,
            points_earned: report.points_earned,
        })
        .await;

        if report.previous_streak != report.habit.streak {
            sink.notify(ProgressEvent::StreakChanged {
                user_id: user_id.clone(),
                habit_id: report.habit.id.clone(),
                previous_streak: report.previous_streak,
                streak: report.habit.streak,
            })
            .await;
        }

        for level_id in &report.unlocked_levels {
            sink.notify(ProgressEvent::LevelUnlocked {
                user_id: user_id.clone(),
                level_id: level_id.clone(),
                unlocked_at: today,
            })
            .await;
        }

        for artefact_id in &report.unlocked_artefacts {
            let title = artefacts
                .iter()
                .find(|artefact| &artefact.id == artefact_id)
                .map(|artefact| artefact.title.clone())
                .unwrap_or_default();
            sink.notify(ProgressEvent::ArtefactUnlocked {
                user_id: user_id.clone(),
                artefact_id: artefact_id.clone(),
                title,
            })
            .await;
        }

        if report.rank_changed() {
            sink.notify(ProgressEvent::RankChanged {
                user_id,
                previous: report.previous_rank,
                current: report.stats.current_rank,
                total_points: report.stats.total_points,
            })
            .await;
        }
    }

    async fn user_lock(&self, user_id: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.user_mutexes.read().await;
            if let Some(lock) = guard.get(user_id) {
                return lock.clone();
            }
        }

        let mut guard = self.user_mutexes.write().await;
        guard
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
