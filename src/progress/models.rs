use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::habit::LogStatus;
use crate::rank::{current_level_for, rank_for, Rank};

/// Per-user progression snapshot consumed and produced by the progression rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    /// date -> habit_id -> outcome
    pub completion_by_date: BTreeMap<NaiveDate, HashMap<String, LogStatus>>,
    pub habit_streak: HashMap<String, u32>,
    /// Absent = locked
    pub level_unlocked_at: HashMap<String, NaiveDate>,
    /// Every artefact ever unlocked; never shrinks
    pub unlocked_artefacts: BTreeSet<String>,
}

impl UserProgress {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn streak_for(&self, habit_id: &str) -> u32 {
        self.habit_streak.get(habit_id).copied().unwrap_or_default()
    }

    pub fn unlocked_at(&self, level_id: &str) -> Option<NaiveDate> {
        self.level_unlocked_at.get(level_id).copied()
    }

    pub fn outcome_on(&self, habit_id: &str, date: NaiveDate) -> Option<LogStatus> {
        self.completion_by_date
            .get(&date)
            .and_then(|outcomes| outcomes.get(habit_id))
            .copied()
    }

    /// 1 when the habit was logged `success` on `date`, else 0
    pub fn completion_indicator(&self, habit_id: &str, date: NaiveDate) -> u32 {
        u32::from(self.outcome_on(habit_id, date) == Some(LogStatus::Success))
    }

    pub fn with_streak(mut self, habit_id: impl Into<String>, streak: u32) -> Self {
        self.habit_streak.insert(habit_id.into(), streak);
        self
    }

    pub fn with_level_unlocked(mut self, level_id: impl Into<String>, date: NaiveDate) -> Self {
        self.level_unlocked_at.insert(level_id.into(), date);
        self
    }

    pub fn with_outcome(mut self, habit_id: impl Into<String>, date: NaiveDate, status: LogStatus) -> Self {
        self.record_outcome(habit_id, date, status);
        self
    }

    pub fn record_outcome(&mut self, habit_id: impl Into<String>, date: NaiveDate, status: LogStatus) {
        self.completion_by_date
            .entry(date)
            .or_default()
            .insert(habit_id.into(), status);
    }

    pub fn set_streak(&mut self, habit_id: impl Into<String>, streak: u32) {
        self.habit_streak.insert(habit_id.into(), streak);
    }

    /// Records the first unlock of a level; later calls keep the original date
    pub fn record_level_unlock(&mut self, level_id: impl Into<String>, date: NaiveDate) -> bool {
        let level_id = level_id.into();
        if self.level_unlocked_at.contains_key(&level_id) {
            return false;
        }
        self.level_unlocked_at.insert(level_id, date);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub total_points: u64,
    pub current_level: u64,
    pub current_rank: Rank,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl UserStats {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            current_level: current_level_for(0),
            ..Self::default()
        }
    }

    /// Adds points and re-derives rank and level
    pub fn award_points(&mut self, points: u32) {
        self.total_points = self.total_points.saturating_add(u64::from(points));
        self.current_rank = rank_for(self.total_points);
        self.current_level = current_level_for(self.total_points);
    }

    /// Tracks the streak of the most recently updated habit
    pub fn record_streak(&mut self, streak: u32, at: DateTime<Utc>) {
        self.current_streak = streak;
        self.longest_streak = self.longest_streak.max(streak);
        self.last_activity_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, n).unwrap()
    }

    #[test]
    fn missing_entries_default_to_zero_and_locked() {
        let progress = UserProgress::new("user-1");
        assert_eq!(progress.streak_for("h-water"), 0);
        assert_eq!(progress.unlocked_at("lvl2"), None);
        assert_eq!(progress.completion_indicator("h-water", day(1)), 0);
    }

    #[test]
    fn only_success_counts_as_completion() {
        let progress = UserProgress::new("user-1")
            .with_outcome("h-water", day(1), LogStatus::Success)
            .with_outcome("h-water", day(2), LogStatus::Fail)
            .with_outcome("h-water", day(3), LogStatus::Skipped);

        assert_eq!(progress.completion_indicator("h-water", day(1)), 1);
        assert_eq!(progress.completion_indicator("h-water", day(2)), 0);
        assert_eq!(progress.completion_indicator("h-water", day(3)), 0);
    }

    #[test]
    fn relogging_a_day_overwrites_outcome() {
        let mut progress = UserProgress::new("user-1");
        progress.record_outcome("h-water", day(1), LogStatus::Success);
        progress.record_outcome("h-water", day(1), LogStatus::Fail);

        assert_eq!(progress.outcome_on("h-water", day(1)), Some(LogStatus::Fail));
        assert_eq!(progress.completion_by_date[&day(1)].len(), 1);
    }

    #[test]
    fn level_unlock_date_is_kept_once_set() {
        let mut progress = UserProgress::new("user-1");
        assert!(progress.record_level_unlock("lvl2", day(1)));
        assert!(!progress.record_level_unlock("lvl2", day(20)));
        assert_eq!(progress.unlocked_at("lvl2"), Some(day(1)));
    }

    #[test]
    fn awarding_points_rederives_rank_and_level() {
        let mut stats = UserStats::new("user-1");
        assert_eq!(stats.current_level, 1);

        stats.award_points(60);
        stats.award_points(60);

        assert_eq!(stats.total_points, 120);
        assert_eq!(stats.current_rank, Rank::Observer);
        assert_eq!(stats.current_level, 2);
    }

    #[test]
    fn longest_streak_never_drops() {
        let mut stats = UserStats::new("user-1");
        stats.record_streak(12, Utc::now());
        stats.record_streak(0, Utc::now());

        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 12);
        assert!(stats.last_activity_at.is_some());
    }
}
