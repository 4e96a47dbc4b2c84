use serde::{Deserialize, Serialize};

/// How an artefact becomes available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnlockRule {
    /// The habit's current streak reaches `days`
    HabitStage { habit_id: String, days: u32 },
    /// The level's windowed completion rate reaches `threshold` (0..=1)
    LevelProgress { level_id: String, threshold: f64 },
}

/// A piece of reward content gated behind an unlock rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artefact {
    pub id: String,
    pub title: String,
    pub body: String,
    pub unlock: UnlockRule,
}

impl Artefact {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        unlock: UnlockRule,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            unlock,
        }
    }

    pub fn habit_stage(id: impl Into<String>, habit_id: impl Into<String>, days: u32) -> Self {
        let id = id.into();
        Self::new(
            id.clone(),
            id,
            String::new(),
            UnlockRule::HabitStage {
                habit_id: habit_id.into(),
                days,
            },
        )
    }

    pub fn level_progress(
        id: impl Into<String>,
        level_id: impl Into<String>,
        threshold: f64,
    ) -> Self {
        let id = id.into();
        Self::new(
            id.clone(),
            id,
            String::new(),
            UnlockRule::LevelProgress {
                level_id: level_id.into(),
                threshold,
            },
        )
    }
}

/// An artefact together with whether the user has it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtefactStatus {
    pub artefact: Artefact,
    pub unlocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unlock_rule_is_tagged_by_type() {
        let artefact = Artefact::habit_stage("art-water-7", "h-water", 7);
        let value = serde_json::to_value(&artefact).unwrap();

        assert_eq!(
            value["unlock"],
            json!({ "type": "habit_stage", "habit_id": "h-water", "days": 7 })
        );
    }

    #[test]
    fn level_progress_rule_parses_from_json() {
        let rule: UnlockRule = serde_json::from_value(json!({
            "type": "level_progress",
            "level_id": "lvl1",
            "threshold": 0.3
        }))
        .unwrap();

        assert_eq!(
            rule,
            UnlockRule::LevelProgress {
                level_id: "lvl1".to_string(),
                threshold: 0.3
            }
        );
    }
}
