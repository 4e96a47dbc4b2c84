use chrono::NaiveDate;
use serde::Serialize;

use crate::artefact::ArtefactStatus;
use crate::habit::{CompletionLog, Habit};
use crate::level::{Level, UnlockDecision};
use crate::progress::UserStats;
use crate::rank::{Rank, RankEntry, RankProgress};

/// Everything one logged outcome changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionReport {
    pub log: CompletionLog,
    pub habit: Habit,
    pub points_earned: u32,
    pub previous_streak: u32,
    pub stats: UserStats,
    pub previous_rank: Rank,
    /// Levels unlocked by this event
    pub unlocked_levels: Vec<String>,
    /// Artefacts unlocked for the first time by this event
    pub unlocked_artefacts: Vec<String>,
}

impl CompletionReport {
    pub fn rank_changed(&self) -> bool {
        self.previous_rank != self.stats.current_rank
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelView {
    pub level: Level,
    pub unlocked: bool,
    pub unlocked_at: Option<NaiveDate>,
    pub habit_count: usize,
    pub completion_rate: f64,
    pub next_unlock: UnlockDecision,
}

/// Read-only view of a user's whole progression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub user_id: String,
    pub as_of: NaiveDate,
    pub stats: UserStats,
    pub levels: Vec<LevelView>,
    /// None at the top rank
    pub rank_progress: Option<RankProgress>,
    pub ranks: Vec<RankEntry>,
    /// Unlocked first
    pub artefacts: Vec<ArtefactStatus>,
}
