use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Points per numeric level, independent of the rank ladder
pub const POINTS_PER_LEVEL: u64 = 100;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Rank {
    #[default]
    Beginner,
    Observer,
    Active,
    Systemic,
    Architect,
    Scaling,
}

impl Rank {
    /// Minimum cumulative points for this rank
    pub fn min_points(&self) -> u64 {
        match self {
            Rank::Beginner => 0,
            Rank::Observer => 100,
            Rank::Active => 500,
            Rank::Systemic => 1500,
            Rank::Architect => 4000,
            Rank::Scaling => 10000,
        }
    }

    /// Display title shown to users
    pub fn title(&self) -> &'static str {
        match self {
            Rank::Beginner => "Начинающий",
            Rank::Observer => "Наблюдатель",
            Rank::Active => "Активный",
            Rank::Systemic => "Системный",
            Rank::Architect => "Архитектор",
            Rank::Scaling => "Масштабирующий",
        }
    }

    pub fn next(&self) -> Option<Rank> {
        Rank::iter().find(|rank| rank > self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankProgress {
    pub next_rank: Rank,
    pub required_points: u64,
    /// Share of the next rank's absolute threshold already reached, 0..=100
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub rank: Rank,
    pub title: String,
    pub min_points: u64,
    pub unlocked: bool,
}

/// Highest rank whose threshold is at most `total_points`
pub fn rank_for(total_points: u64) -> Rank {
    Rank::iter()
        .filter(|rank| rank.min_points() <= total_points)
        .last()
        .unwrap_or_default()
}

/// Progress towards the next rank, `None` at the top of the ladder.
///
/// The percentage is measured against the next threshold from zero, not within the
/// current band.
pub fn progress_to_next(total_points: u64) -> Option<RankProgress> {
    let next_rank = rank_for(total_points).next()?;
    let required_points = next_rank.min_points();
    let ratio = total_points as f64 / required_points as f64;
    let percent = (ratio * 100.0).round().min(100.0) as u32;

    Some(RankProgress {
        next_rank,
        required_points,
        percent,
    })
}

/// Numeric level, a progression number separate from the rank
pub fn current_level_for(total_points: u64) -> u64 {
    total_points / POINTS_PER_LEVEL + 1
}

/// Every rank with its threshold and whether `total_points` reaches it
pub fn entries(total_points: u64) -> Vec<RankEntry> {
    Rank::iter()
        .map(|rank| RankEntry {
            rank,
            title: rank.title().to_string(),
            min_points: rank.min_points(),
            unlocked: total_points >= rank.min_points(),
        })
        .collect()
}
