use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogStatus {
    Success,
    Fail,
    Pending,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Day,
    Evening,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScheduleDay {
    Daily,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

/// A named milestone on a habit's streak timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStage {
    pub days: u32,
    pub title: String,
    pub description: String,
}

impl HabitStage {
    pub fn new(days: u32, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            days,
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub level_id: String,
    pub title: String,
    pub emoji: Option<String>,
    pub difficulty: Difficulty,
    pub time_of_day: TimeOfDay,
    pub days: Vec<ScheduleDay>,
    pub stages: Vec<HabitStage>, // strictly increasing by `days`
    pub streak: u32,
    pub best_streak: u32,
    pub total_completions: u32,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        level_id: impl Into<String>,
        title: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            level_id: level_id.into(),
            title: title.into(),
            emoji: None,
            difficulty,
            time_of_day: TimeOfDay::Morning,
            days: vec![ScheduleDay::Daily],
            stages: Vec::new(),
            streak: 0,
            best_streak: 0,
            total_completions: 0,
            is_archived: false,
            created_at: Utc::now(),
        }
    }

    /// Replaces the stage list, ordering it by day threshold and dropping repeated thresholds
    pub fn with_stages(mut self, mut stages: Vec<HabitStage>) -> Self {
        stages.sort_by_key(|stage| stage.days);
        stages.dedup_by_key(|stage| stage.days);
        self.stages = stages;
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    pub fn with_streak(mut self, streak: u32) -> Self {
        self.streak = streak;
        self.best_streak = self.best_streak.max(streak);
        self
    }

    pub fn is_active(&self) -> bool {
        !self.is_archived
    }

    /// The highest stage the current streak has reached
    pub fn current_stage(&self) -> Option<&HabitStage> {
        self.stages
            .iter()
            .take_while(|stage| stage.days <= self.streak)
            .last()
    }

    /// The first stage the current streak has not reached yet
    pub fn next_stage(&self) -> Option<&HabitStage> {
        self.stages.iter().find(|stage| stage.days > self.streak)
    }
}

/// One log per habit per calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionLog {
    pub id: Uuid,
    pub habit_id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub status: LogStatus,
    pub note: Option<String>,
    pub points: u32,
    /// Set the first time a success is applied for this day and kept across re-logs
    #[serde(default)]
    pub credit: Option<DayCredit>,
    pub updated_at: DateTime<Utc>,
}

/// What the first success of a day contributed to its habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCredit {
    pub points: u32,
    /// Streak right after the success was counted
    pub streak: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn staged_habit(streak: u32) -> Habit {
        Habit::new("h-water", "user", "lvl1", "Water", Difficulty::Easy)
            .with_stages(vec![
                HabitStage::new(21, "Roots", ""),
                HabitStage::new(7, "Sprouts", ""),
                HabitStage::new(45, "Tree", ""),
                HabitStage::new(7, "Duplicate", ""),
            ])
            .with_streak(streak)
    }

    #[test]
    fn stages_are_sorted_and_deduplicated() {
        let habit = staged_habit(0);
        let days: Vec<u32> = habit.stages.iter().map(|s| s.days).collect();
        assert_eq!(days, vec![7, 21, 45]);
        assert_eq!(habit.stages[0].title, "Sprouts");
    }

    #[test]
    fn current_and_next_stage_follow_streak() {
        let fresh = staged_habit(3);
        assert!(fresh.current_stage().is_none());
        assert_eq!(fresh.next_stage().unwrap().days, 7);

        let rooted = staged_habit(21);
        assert_eq!(rooted.current_stage().unwrap().days, 21);
        assert_eq!(rooted.next_stage().unwrap().days, 45);

        let done = staged_habit(100);
        assert_eq!(done.current_stage().unwrap().days, 45);
        assert!(done.next_stage().is_none());
    }

    #[test]
    fn status_parses_from_lowercase() {
        assert_eq!(LogStatus::from_str("success").unwrap(), LogStatus::Success);
        assert_eq!(LogStatus::from_str("skipped").unwrap(), LogStatus::Skipped);
        assert!(LogStatus::from_str("done").is_err());
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&LogStatus::Fail).unwrap();
        assert_eq!(json, "\"fail\"");
    }
}
