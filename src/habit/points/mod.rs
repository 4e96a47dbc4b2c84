mod difficulty_base;
mod streak_bonus;

pub use difficulty_base::DifficultyBaseCalculator;
pub use streak_bonus::StreakBonusCalculator;

use std::sync::Arc;

use super::models::Habit;
use crate::config::ProgressionConfig;

/// Priority constants for points calculators.
/// Lower values run first and later calculators see the running total.
pub mod calculator_priority {
    /// Flat award per difficulty tier
    pub const BASE_POINTS: u32 = 100;
    /// Consistency bonus on top of the base award
    pub const STREAK_BONUS: u32 = 200;
}

pub trait PointsCalculator: Send + Sync {
    fn calculate(&self, context: &PointsContext, current_points: u32) -> u32;

    fn priority(&self) -> u32;
}

/// What a calculator sees for one successful completion
pub struct PointsContext<'a> {
    pub habit: &'a Habit,
    /// Streak before this completion was counted
    pub prior_streak: u32,
}

impl<'a> PointsContext<'a> {
    pub fn new(habit: &'a Habit, prior_streak: u32) -> Self {
        Self {
            habit,
            prior_streak,
        }
    }
}

/// Runs the registered calculators in priority order
pub struct PointsEngine {
    calculators: Vec<Arc<dyn PointsCalculator>>,
}

impl PointsEngine {
    pub fn new(config: &ProgressionConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: &ProgressionConfig) -> PointsEngineBuilder {
        PointsEngineBuilder::new(config)
    }

    pub fn points_for(&self, context: &PointsContext) -> u32 {
        self.calculators
            .iter()
            .fold(0, |total, calculator| calculator.calculate(context, total))
    }
}

pub struct PointsEngineBuilder {
    calculators: Vec<Arc<dyn PointsCalculator>>,
}

impl PointsEngineBuilder {
    fn new(config: &ProgressionConfig) -> Self {
        Self {
            calculators: vec![
                Arc::new(DifficultyBaseCalculator::from_config(config)),
                Arc::new(StreakBonusCalculator::from_config(config)),
            ],
        }
    }

    pub fn with_calculator(mut self, calculator: Arc<dyn PointsCalculator>) -> Self {
        self.calculators.push(calculator);
        self
    }

    pub fn build(mut self) -> PointsEngine {
        self.calculators.sort_by_key(|c| c.priority());
        PointsEngine {
            calculators: self.calculators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::models::Difficulty;

    struct WeekendDoubler;

    impl PointsCalculator for WeekendDoubler {
        fn calculate(&self, _context: &PointsContext, current_points: u32) -> u32 {
            current_points * 2
        }

        fn priority(&self) -> u32 {
            300
        }
    }

    struct FlatBonus;

    impl PointsCalculator for FlatBonus {
        fn calculate(&self, _context: &PointsContext, current_points: u32) -> u32 {
            current_points + 1
        }

        fn priority(&self) -> u32 {
            50
        }
    }

    #[test]
    fn default_engine_adds_base_and_bonus() {
        let engine = PointsEngine::new(&ProgressionConfig::default());
        let habit = Habit::new("h", "u", "lvl1", "Read", Difficulty::Medium);

        assert_eq!(engine.points_for(&PointsContext::new(&habit, 0)), 20);
        assert_eq!(engine.points_for(&PointsContext::new(&habit, 5)), 30);
    }

    #[test]
    fn custom_calculators_run_in_priority_order() {
        let engine = PointsEngine::builder(&ProgressionConfig::default())
            .with_calculator(Arc::new(WeekendDoubler))
            .with_calculator(Arc::new(FlatBonus))
            .build();
        let habit = Habit::new("h", "u", "lvl1", "Read", Difficulty::Easy);

        // ((0 + 1) + 10 + 0) * 2
        assert_eq!(engine.points_for(&PointsContext::new(&habit, 0)), 22);
    }
}
