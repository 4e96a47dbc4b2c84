use super::{PointsCalculator, PointsContext};
use crate::config::ProgressionConfig;

/// Rewards consistency with a per-day bonus that stops growing at `cap`
pub struct StreakBonusCalculator {
    per_day: u32,
    cap: u32,
}

impl Default for StreakBonusCalculator {
    fn default() -> Self {
        Self::from_config(&ProgressionConfig::default())
    }
}

impl StreakBonusCalculator {
    pub fn from_config(config: &ProgressionConfig) -> Self {
        Self {
            per_day: config.streak_bonus_per_day,
            cap: config.streak_bonus_cap,
        }
    }

    pub fn bonus_for(&self, streak: u32) -> u32 {
        streak.saturating_mul(self.per_day).min(self.cap)
    }
}

impl PointsCalculator for StreakBonusCalculator {
    fn calculate(&self, context: &PointsContext, current_points: u32) -> u32 {
        current_points + self.bonus_for(context.prior_streak)
    }

    fn priority(&self) -> u32 {
        crate::habit::points::calculator_priority::STREAK_BONUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 2)]
    #[case(24, 48)]
    #[case(25, 50)]
    #[case(30, 50)]
    #[case(100, 50)]
    #[case(u32::MAX, 50)]
    fn bonus_is_capped(#[case] streak: u32, #[case] expected: u32) {
        assert_eq!(StreakBonusCalculator::default().bonus_for(streak), expected);
    }
}
