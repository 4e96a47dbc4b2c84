use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::models::{CompletionLog, DayCredit, Habit, LogStatus};
use super::points::{PointsContext, PointsEngine};
use crate::clock::parse_day;
use crate::config::ProgressionConfig;
use crate::shared::AppError;

/// Result of applying one logged outcome to a habit
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub habit: Habit,
    pub points_earned: u32,
    pub log: CompletionLog,
    pub previous_streak: u32,
}

impl CompletionOutcome {
    pub fn streak_changed(&self) -> bool {
        self.habit.streak != self.previous_streak
    }
}

/// Converts logged outcomes into streak, completion and points updates
pub struct StreakCalculator {
    points: PointsEngine,
}

impl StreakCalculator {
    pub fn new(config: &ProgressionConfig) -> Self {
        Self {
            points: PointsEngine::new(config),
        }
    }

    pub fn with_points_engine(points: PointsEngine) -> Self {
        Self { points }
    }

    /// Parses `date` and applies the outcome; see [`StreakCalculator::apply_on_day`]
    pub fn apply_completion(
        &self,
        habit: &Habit,
        date: &str,
        status: LogStatus,
        note: Option<String>,
        existing: Option<&CompletionLog>,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome, AppError> {
        let day = parse_day(date)?;
        Ok(self.apply_on_day(habit, day, status, note, existing, now))
    }

    /// Applies `status` for `day` to a copy of `habit`.
    ///
    /// `existing` is the log already stored for this habit and day, if any. The returned log
    /// replaces it in place (same id). Re-logging the status already stored changes nothing
    /// but the note. A day is credited at most once: a success logged again after a change
    /// of heart earns nothing and only restores the streak that day had reached.
    pub fn apply_on_day(
        &self,
        habit: &Habit,
        day: NaiveDate,
        status: LogStatus,
        note: Option<String>,
        existing: Option<&CompletionLog>,
        now: DateTime<Utc>,
    ) -> CompletionOutcome {
        let previous_streak = habit.streak;

        if let Some(stored) = existing.filter(|stored| stored.status == status) {
            let log = CompletionLog {
                note: note.or_else(|| stored.note.clone()),
                updated_at: now,
                ..stored.clone()
            };
            return CompletionOutcome {
                habit: habit.clone(),
                points_earned: 0,
                log,
                previous_streak,
            };
        }

        let mut updated = habit.clone();
        let prior_credit = existing.and_then(|stored| stored.credit);
        let (points_earned, credit) = match (status, prior_credit) {
            (LogStatus::Success, Some(credit)) => {
                updated.streak = updated.streak.max(credit.streak);
                (0, Some(credit))
            }
            (LogStatus::Success, None) => {
                let points = self
                    .points
                    .points_for(&PointsContext::new(habit, previous_streak));
                updated.streak += 1;
                updated.best_streak = updated.best_streak.max(updated.streak);
                updated.total_completions += 1;
                let credit = DayCredit {
                    points,
                    streak: updated.streak,
                };
                (points, Some(credit))
            }
            (LogStatus::Fail, credit) => {
                updated.streak = 0;
                (0, credit)
            }
            (LogStatus::Pending | LogStatus::Skipped, credit) => (0, credit),
        };

        let log = CompletionLog {
            id: existing.map(|stored| stored.id).unwrap_or_else(Uuid::new_v4),
            habit_id: habit.id.clone(),
            user_id: habit.user_id.clone(),
            date: day,
            status,
            note,
            points: match (status, credit) {
                (LogStatus::Success, Some(credit)) => credit.points,
                _ => 0,
            },
            credit,
            updated_at: now,
        };

        CompletionOutcome {
            habit: updated,
            points_earned,
            log,
            previous_streak,
        }
    }
}

impl Default for StreakCalculator {
    fn default() -> Self {
        Self::new(&ProgressionConfig::default())
    }
}
