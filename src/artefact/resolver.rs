use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

use super::models::{Artefact, ArtefactStatus, UnlockRule};
use crate::habit::Habit;
use crate::level::{Level, LevelEvaluator};
use crate::progress::UserProgress;

/// Decides which artefacts a user's current progress unlocks
pub struct ArtefactResolver<'a> {
    evaluator: &'a LevelEvaluator,
    levels_by_id: HashMap<&'a str, &'a Level>,
    habits_by_level: &'a HashMap<String, Vec<Habit>>,
}

impl<'a> ArtefactResolver<'a> {
    pub fn new(
        evaluator: &'a LevelEvaluator,
        levels: &'a [Level],
        habits_by_level: &'a HashMap<String, Vec<Habit>>,
    ) -> Self {
        Self {
            evaluator,
            levels_by_id: levels
                .iter()
                .map(|level| (level.id.as_str(), level))
                .collect(),
            habits_by_level,
        }
    }

    /// Ids of the artefacts whose rule holds right now
    pub fn resolve_unlocked(
        &self,
        artefacts: &[Artefact],
        progress: &UserProgress,
        now: NaiveDate,
    ) -> BTreeSet<String> {
        artefacts
            .iter()
            .filter(|artefact| self.rule_holds(&artefact.unlock, progress, now))
            .map(|artefact| artefact.id.clone())
            .collect()
    }

    /// Current unlocks plus everything unlocked before; the result never shrinks
    pub fn resolve_sticky(
        &self,
        artefacts: &[Artefact],
        progress: &UserProgress,
        now: NaiveDate,
    ) -> BTreeSet<String> {
        let mut unlocked = self.resolve_unlocked(artefacts, progress, now);
        unlocked.extend(progress.unlocked_artefacts.iter().cloned());
        unlocked
    }

    pub fn rule_holds(&self, rule: &UnlockRule, progress: &UserProgress, now: NaiveDate) -> bool {
        match rule {
            UnlockRule::HabitStage { habit_id, days } => progress.streak_for(habit_id) >= *days,
            UnlockRule::LevelProgress {
                level_id,
                threshold,
            } => {
                // Unknown level never unlocks
                let Some(level) = self.levels_by_id.get(level_id.as_str()) else {
                    return false;
                };
                let habits = self
                    .habits_by_level
                    .get(level_id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                self.evaluator.completion_rate(level, habits, progress, now) >= *threshold
            }
        }
    }
}

/// Unlocked artefacts first, keeping catalogue order inside each group
pub fn sort_unlocked_first(
    artefacts: &[Artefact],
    unlocked: &BTreeSet<String>,
) -> Vec<ArtefactStatus> {
    let (mut open, closed): (Vec<_>, Vec<_>) = artefacts
        .iter()
        .map(|artefact| ArtefactStatus {
            unlocked: unlocked.contains(&artefact.id),
            artefact: artefact.clone(),
        })
        .partition(|status| status.unlocked);
    open.extend(closed);
    open
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{Difficulty, LogStatus};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 29).unwrap()
    }

    fn catalogue() -> Vec<Artefact> {
        vec![
            Artefact::habit_stage("art-water-7", "h-water", 7),
            Artefact::habit_stage("art-bed-21", "h-bed", 21),
            Artefact::level_progress("art-level1", "lvl1", 0.3),
            Artefact::level_progress("art-ghost", "lvl-missing", 0.0),
        ]
    }

    fn levels() -> Vec<Level> {
        vec![Level::new("lvl1", 1, "Energy")]
    }

    fn habits_by_level() -> HashMap<String, Vec<Habit>> {
        HashMap::from([(
            "lvl1".to_string(),
            vec![Habit::new("h-water", "user-1", "lvl1", "Water", Difficulty::Easy)],
        )])
    }

    #[test]
    fn habit_stage_unlocks_at_exact_threshold() {
        let evaluator = LevelEvaluator::default();
        let levels = levels();
        let habits = habits_by_level();
        let resolver = ArtefactResolver::new(&evaluator, &levels, &habits);

        let at_seven = UserProgress::new("user-1").with_streak("h-water", 7);
        let at_six = UserProgress::new("user-1").with_streak("h-water", 6);

        assert!(resolver
            .resolve_unlocked(&catalogue(), &at_seven, today())
            .contains("art-water-7"));
        assert!(!resolver
            .resolve_unlocked(&catalogue(), &at_six, today())
            .contains("art-water-7"));
    }

    #[test]
    fn level_progress_compares_completion_rate() {
        let evaluator = LevelEvaluator::default();
        let levels = levels();
        let habits = habits_by_level();
        let resolver = ArtefactResolver::new(&evaluator, &levels, &habits);

        // 18 of 60 days = 0.3
        let mut progress = UserProgress::new("user-1");
        for n in 0..18 {
            progress.record_outcome("h-water", today() - Duration::days(n), LogStatus::Success);
        }
        assert!(resolver
            .resolve_unlocked(&catalogue(), &progress, today())
            .contains("art-level1"));

        progress.record_outcome("h-water", today(), LogStatus::Fail);
        assert!(!resolver
            .resolve_unlocked(&catalogue(), &progress, today())
            .contains("art-level1"));
    }

    #[test]
    fn unknown_level_keeps_artefact_locked() {
        let evaluator = LevelEvaluator::default();
        let levels = levels();
        let habits = habits_by_level();
        let resolver = ArtefactResolver::new(&evaluator, &levels, &habits);

        let unlocked = resolver.resolve_unlocked(&catalogue(), &UserProgress::new("u"), today());
        assert!(!unlocked.contains("art-ghost"));
    }

    #[test]
    fn sticky_resolution_keeps_previous_unlocks() {
        let evaluator = LevelEvaluator::default();
        let levels = levels();
        let habits = habits_by_level();
        let resolver = ArtefactResolver::new(&evaluator, &levels, &habits);

        let mut progress = UserProgress::new("user-1").with_streak("h-water", 0);
        progress.unlocked_artefacts.insert("art-water-7".to_string());

        assert!(!resolver
            .resolve_unlocked(&catalogue(), &progress, today())
            .contains("art-water-7"));
        assert!(resolver
            .resolve_sticky(&catalogue(), &progress, today())
            .contains("art-water-7"));
    }

    #[test]
    fn unlocked_artefacts_sort_first_in_catalogue_order() {
        let unlocked = BTreeSet::from(["art-level1".to_string(), "art-bed-21".to_string()]);

        let ordered: Vec<_> = sort_unlocked_first(&catalogue(), &unlocked)
            .into_iter()
            .map(|status| (status.artefact.id, status.unlocked))
            .collect();

        assert_eq!(
            ordered,
            vec![
                ("art-bed-21".to_string(), true),
                ("art-level1".to_string(), true),
                ("art-water-7".to_string(), false),
                ("art-ghost".to_string(), false),
            ]
        );
    }
}
