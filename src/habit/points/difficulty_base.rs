use super::{PointsCalculator, PointsContext};
use crate::config::ProgressionConfig;
use crate::habit::models::Difficulty;

pub struct DifficultyBaseCalculator {
    easy: u32,
    medium: u32,
    hard: u32,
}

impl Default for DifficultyBaseCalculator {
    fn default() -> Self {
        Self::from_config(&ProgressionConfig::default())
    }
}

impl DifficultyBaseCalculator {
    pub fn from_config(config: &ProgressionConfig) -> Self {
        Self {
            easy: config.base_points_easy,
            medium: config.base_points_medium,
            hard: config.base_points_hard,
        }
    }

    pub fn base_points(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

impl PointsCalculator for DifficultyBaseCalculator {
    fn calculate(&self, context: &PointsContext, current_points: u32) -> u32 {
        current_points + self.base_points(context.habit.difficulty)
    }

    fn priority(&self) -> u32 {
        crate::habit::points::calculator_priority::BASE_POINTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::models::Habit;
    use rstest::rstest;

    #[rstest]
    #[case(Difficulty::Easy, 10)]
    #[case(Difficulty::Medium, 20)]
    #[case(Difficulty::Hard, 30)]
    fn awards_base_points_per_tier(#[case] difficulty: Difficulty, #[case] expected: u32) {
        let calculator = DifficultyBaseCalculator::default();
        let habit = Habit::new("h", "u", "lvl1", "Walk", difficulty);

        let points = calculator.calculate(&PointsContext::new(&habit, 12), 0);
        assert_eq!(points, expected);
    }

    #[test]
    fn adds_to_running_total() {
        let calculator = DifficultyBaseCalculator::default();
        let habit = Habit::new("h", "u", "lvl1", "Walk", Difficulty::Hard);

        assert_eq!(calculator.calculate(&PointsContext::new(&habit, 0), 5), 35);
    }
}
