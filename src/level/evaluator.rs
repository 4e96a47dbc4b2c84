use chrono::NaiveDate;
use serde::Serialize;

use super::models::Level;
use crate::clock::{days_between, trailing_window};
use crate::config::ProgressionConfig;
use crate::habit::Habit;
use crate::progress::UserProgress;

/// Why the next level can or cannot be unlocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnlockDecision {
    NotEnoughQualifyingHabits { qualifying: usize, required: usize },
    CoolingDown { elapsed_days: i64, required_days: i64 },
    Eligible,
}

impl UnlockDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, UnlockDecision::Eligible)
    }
}

/// Windowed completion rates and next-level eligibility
pub struct LevelEvaluator {
    window_days: u32,
    required_streak: u32,
    required_habits: usize,
    min_gap_days: i64,
}

impl Default for LevelEvaluator {
    fn default() -> Self {
        Self::new(&ProgressionConfig::default())
    }
}

impl LevelEvaluator {
    pub fn new(config: &ProgressionConfig) -> Self {
        Self {
            window_days: config.window_days,
            required_streak: config.required_streak,
            required_habits: config.required_habits,
            min_gap_days: config.min_gap_days,
        }
    }

    /// Successful days in the trailing window ending at `now`, summed over the level's active
    /// habits and divided by `window × habit count`. A level without habits has rate 0.
    pub fn completion_rate(
        &self,
        _level: &Level,
        habits: &[Habit],
        progress: &UserProgress,
        now: NaiveDate,
    ) -> f64 {
        let active: Vec<&Habit> = habits.iter().filter(|habit| habit.is_active()).collect();
        let possible = u64::from(self.window_days) * active.len() as u64;
        if possible == 0 {
            return 0.0;
        }

        let earned: u64 = active
            .iter()
            .map(|habit| self.window_total(&habit.id, progress, now))
            .sum();

        earned as f64 / possible as f64
    }

    fn window_total(&self, habit_id: &str, progress: &UserProgress, end: NaiveDate) -> u64 {
        trailing_window(end, self.window_days)
            .map(|day| u64::from(progress.completion_indicator(habit_id, day)))
            .sum()
    }

    /// Habits whose stored streak reaches the qualifying streak
    pub fn qualifying_habits(&self, habits: &[Habit], progress: &UserProgress) -> usize {
        habits
            .iter()
            .filter(|habit| habit.is_active())
            .filter(|habit| progress.streak_for(&habit.id) >= self.required_streak)
            .count()
    }

    pub fn evaluate_unlock(
        &self,
        current_level: &Level,
        habits: &[Habit],
        progress: &UserProgress,
        now: NaiveDate,
    ) -> UnlockDecision {
        let qualifying = self.qualifying_habits(habits, progress);
        if qualifying < self.required_habits {
            return UnlockDecision::NotEnoughQualifyingHabits {
                qualifying,
                required: self.required_habits,
            };
        }

        let Some(unlocked_at) = progress.unlocked_at(&current_level.id) else {
            return UnlockDecision::Eligible;
        };

        let required_days = self.gap_after(current_level);
        let elapsed_days = days_between(unlocked_at, now);
        if elapsed_days < required_days {
            return UnlockDecision::CoolingDown {
                elapsed_days,
                required_days,
            };
        }

        UnlockDecision::Eligible
    }

    /// Days `level` must have been open before its successor unlocks
    pub fn gap_after(&self, level: &Level) -> i64 {
        level
            .unlock_after_days
            .map_or(self.min_gap_days, i64::from)
    }

    pub fn can_unlock_next(
        &self,
        current_level: &Level,
        habits: &[Habit],
        progress: &UserProgress,
        now: NaiveDate,
    ) -> bool {
        self.evaluate_unlock(current_level, habits, progress, now)
            .is_eligible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{Difficulty, LogStatus};
    use chrono::Duration;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 29).unwrap()
    }

    fn level() -> Level {
        Level::new("lvl1", 1, "Energy")
    }

    fn habit(id: &str) -> Habit {
        Habit::new(id, "user-1", "lvl1", id, Difficulty::Easy)
    }

    /// Marks `days` successes for `habit_id`, every other day going back from today
    fn alternate_successes(mut progress: UserProgress, habit_id: &str, days: i64) -> UserProgress {
        for n in 0..days {
            let date = today() - Duration::days(n * 2);
            progress = progress.with_outcome(habit_id, date, LogStatus::Success);
        }
        progress
    }

    #[test]
    fn half_completed_window_gives_half_rate() {
        let mut progress = UserProgress::new("user-1");
        progress = alternate_successes(progress, "h-water", 30);
        progress = alternate_successes(progress, "h-bed", 30);

        let rate = LevelEvaluator::default().completion_rate(
            &level(),
            &[habit("h-water"), habit("h-bed")],
            &progress,
            today(),
        );

        assert_eq!(rate, 0.5);
    }

    #[test]
    fn level_without_habits_has_zero_rate() {
        let rate = LevelEvaluator::default().completion_rate(
            &level(),
            &[],
            &UserProgress::new("user-1"),
            today(),
        );

        assert_eq!(rate, 0.0);
        assert!(!rate.is_nan());
    }

    #[test]
    fn window_is_sixty_days_inclusive_of_today() {
        let progress = UserProgress::new("user-1")
            .with_outcome("h-water", today(), LogStatus::Success)
            .with_outcome("h-water", today() - Duration::days(59), LogStatus::Success)
            .with_outcome("h-water", today() - Duration::days(60), LogStatus::Success)
            .with_outcome("h-water", today() + Duration::days(1), LogStatus::Success);

        let rate = LevelEvaluator::default().completion_rate(
            &level(),
            &[habit("h-water")],
            &progress,
            today(),
        );

        assert_eq!(rate, 2.0 / 60.0);
    }

    #[test]
    fn failed_and_skipped_days_do_not_count() {
        let progress = UserProgress::new("user-1")
            .with_outcome("h-water", today(), LogStatus::Fail)
            .with_outcome("h-water", today() - Duration::days(1), LogStatus::Skipped)
            .with_outcome("h-water", today() - Duration::days(2), LogStatus::Pending);

        let rate = LevelEvaluator::default().completion_rate(
            &level(),
            &[habit("h-water")],
            &progress,
            today(),
        );

        assert_eq!(rate, 0.0);
    }

    #[test]
    fn archived_habits_are_left_out_of_the_rate() {
        let progress = alternate_successes(UserProgress::new("user-1"), "h-water", 30);
        let mut archived = habit("h-bed");
        archived.is_archived = true;

        let rate = LevelEvaluator::default().completion_rate(
            &level(),
            &[habit("h-water"), archived],
            &progress,
            today(),
        );

        assert_eq!(rate, 0.5);
    }

    #[test]
    fn one_qualifying_habit_is_not_enough_even_after_cooldown() {
        let progress = UserProgress::new("user-1")
            .with_streak("h-water", 45)
            .with_streak("h-bed", 29)
            .with_level_unlocked("lvl1", today() - Duration::days(90));

        let decision = LevelEvaluator::default().evaluate_unlock(
            &level(),
            &[habit("h-water"), habit("h-bed")],
            &progress,
            today(),
        );

        assert_eq!(
            decision,
            UnlockDecision::NotEnoughQualifyingHabits {
                qualifying: 1,
                required: 2
            }
        );
    }

    #[test]
    fn never_unlocked_level_skips_cooldown() {
        let progress = UserProgress::new("user-1")
            .with_streak("h-water", 30)
            .with_streak("h-bed", 30);

        assert!(LevelEvaluator::default().can_unlock_next(
            &level(),
            &[habit("h-water"), habit("h-bed")],
            &progress,
            today(),
        ));
    }

    #[rstest]
    #[case(0, false)]
    #[case(20, false)]
    #[case(21, true)]
    #[case(120, true)]
    fn cooldown_requires_min_gap_days(#[case] days_since_unlock: i64, #[case] expected: bool) {
        let progress = UserProgress::new("user-1")
            .with_streak("h-water", 30)
            .with_streak("h-bed", 31)
            .with_level_unlocked("lvl1", today() - Duration::days(days_since_unlock));

        let evaluator = LevelEvaluator::default();
        let habits = [habit("h-water"), habit("h-bed")];

        assert_eq!(
            evaluator.can_unlock_next(&level(), &habits, &progress, today()),
            expected
        );
    }

    #[test]
    fn thresholds_follow_config() {
        let config = ProgressionConfig {
            required_streak: 7,
            required_habits: 1,
            min_gap_days: 3,
            ..ProgressionConfig::default()
        };
        let progress = UserProgress::new("user-1")
            .with_streak("h-water", 7)
            .with_level_unlocked("lvl1", today() - Duration::days(3));

        assert!(LevelEvaluator::new(&config).can_unlock_next(
            &level(),
            &[habit("h-water")],
            &progress,
            today(),
        ));
    }

    #[rstest]
    #[case(4, false)]
    #[case(5, true)]
    fn level_gap_overrides_config(#[case] days_since_unlock: i64, #[case] expected: bool) {
        let level = Level {
            unlock_after_days: Some(5),
            ..level()
        };
        let progress = UserProgress::new("user-1")
            .with_streak("h-water", 30)
            .with_streak("h-bed", 30)
            .with_level_unlocked("lvl1", today() - Duration::days(days_since_unlock));
        let evaluator = LevelEvaluator::default();

        assert_eq!(evaluator.gap_after(&level), 5);
        assert_eq!(
            evaluator.can_unlock_next(&level, &[habit("h-water"), habit("h-bed")], &progress, today()),
            expected
        );
    }
}
