use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::LogStatus;
use crate::rank::Rank;

/// Facts about a user's progression, emitted after the state change is stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgressEvent {
    /// An outcome was logged for a habit
    HabitCompleted {
        user_id: String,
        habit_id: String,
        date: NaiveDate,
        status: LogStatus,
        points_earned: u32,
    },

    StreakChanged {
        user_id: String,
        habit_id: String,
        previous_streak: u32,
        streak: u32,
    },

    LevelUnlocked {
        user_id: String,
        level_id: String,
        unlocked_at: NaiveDate,
    },

    /// Sent once per artefact, the first time it unlocks
    ArtefactUnlocked {
        user_id: String,
        artefact_id: String,
        title: String,
    },

    RankChanged {
        user_id: String,
        previous: Rank,
        current: Rank,
        total_points: u64,
    },
}

impl ProgressEvent {
    pub fn user_id(&self) -> &str {
        match self {
            ProgressEvent::HabitCompleted { user_id, .. } => user_id,
            ProgressEvent::StreakChanged { user_id, .. } => user_id,
            ProgressEvent::LevelUnlocked { user_id, .. } => user_id,
            ProgressEvent::ArtefactUnlocked { user_id, .. } => user_id,
            ProgressEvent::RankChanged { user_id, .. } => user_id,
        }
    }

    /// Wire name of the notification
    pub fn event_type(&self) -> &'static str {
        match self {
            ProgressEvent::HabitCompleted { .. } => "habit:completed",
            ProgressEvent::StreakChanged { .. } => "habit:streak_changed",
            ProgressEvent::LevelUnlocked { .. } => "level:unlocked",
            ProgressEvent::ArtefactUnlocked { .. } => "artefact:unlocked",
            ProgressEvent::RankChanged { .. } => "rank:changed",
        }
    }
}
