use tracing::debug;

/// Trailing window used for level completion rates
pub const WINDOW_DAYS: u32 = 60;
/// Streak a habit needs before it counts towards unlocking the next level
pub const LEVEL_UNLOCK_REQUIRED_STREAK: u32 = 30;
/// Number of qualifying habits required to unlock the next level
pub const LEVEL_UNLOCK_REQUIRED_HABITS: usize = 2;
/// Cooldown between a level's unlock and the unlock of its successor
pub const MIN_GAP_DAYS: i64 = 21;
pub const STREAK_BONUS_PER_DAY: u32 = 2;
pub const STREAK_BONUS_CAP: u32 = 50;
pub const BASE_POINTS_EASY: u32 = 10;
pub const BASE_POINTS_MEDIUM: u32 = 20;
pub const BASE_POINTS_HARD: u32 = 30;

/// Pacing of the whole progression system
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionConfig {
    pub window_days: u32,
    pub required_streak: u32,
    pub required_habits: usize,
    pub min_gap_days: i64,
    pub streak_bonus_per_day: u32,
    pub streak_bonus_cap: u32,
    pub base_points_easy: u32,
    pub base_points_medium: u32,
    pub base_points_hard: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            window_days: WINDOW_DAYS,
            required_streak: LEVEL_UNLOCK_REQUIRED_STREAK,
            required_habits: LEVEL_UNLOCK_REQUIRED_HABITS,
            min_gap_days: MIN_GAP_DAYS,
            streak_bonus_per_day: STREAK_BONUS_PER_DAY,
            streak_bonus_cap: STREAK_BONUS_CAP,
            base_points_easy: BASE_POINTS_EASY,
            base_points_medium: BASE_POINTS_MEDIUM,
            base_points_hard: BASE_POINTS_HARD,
        }
    }
}

impl ProgressionConfig {
    /// Reads overrides from `KVANSUM_*` variables, keeping the default for anything missing or malformed
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let config = Self {
            window_days: read(&lookup, "KVANSUM_WINDOW_DAYS", defaults.window_days),
            required_streak: read(
                &lookup,
                "KVANSUM_REQUIRED_STREAK",
                defaults.required_streak,
            ),
            required_habits: read(
                &lookup,
                "KVANSUM_REQUIRED_HABITS",
                defaults.required_habits,
            ),
            min_gap_days: read(&lookup, "KVANSUM_MIN_GAP_DAYS", defaults.min_gap_days),
            streak_bonus_per_day: read(
                &lookup,
                "KVANSUM_STREAK_BONUS_PER_DAY",
                defaults.streak_bonus_per_day,
            ),
            streak_bonus_cap: read(
                &lookup,
                "KVANSUM_STREAK_BONUS_CAP",
                defaults.streak_bonus_cap,
            ),
            base_points_easy: read(&lookup, "KVANSUM_POINTS_EASY", defaults.base_points_easy),
            base_points_medium: read(
                &lookup,
                "KVANSUM_POINTS_MEDIUM",
                defaults.base_points_medium,
            ),
            base_points_hard: read(&lookup, "KVANSUM_POINTS_HARD", defaults.base_points_hard),
        };

        debug!(?config, "Loaded progression config");
        config
    }
}

fn read<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
