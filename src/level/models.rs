use serde::{Deserialize, Serialize};

use crate::progress::UserProgress;

/// A stage of the curriculum; levels unlock in `order`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub order: u32, // 1-based
    pub title: String,
    pub description: String,
    pub emoji: Option<String>,
    pub next_level_id: Option<String>,
    /// Days this level stays the newest before the next can open; the configured gap when unset
    pub unlock_after_days: Option<u32>,
}

impl Level {
    pub fn new(id: impl Into<String>, order: u32, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order,
            title: title.into(),
            description: String::new(),
            emoji: None,
            next_level_id: None,
            unlock_after_days: None,
        }
    }

    pub fn with_next(mut self, next_level_id: impl Into<String>) -> Self {
        self.next_level_id = Some(next_level_id.into());
        self
    }

    /// The first level is always open, whatever the stored timestamp says
    pub fn is_first(&self) -> bool {
        self.order == 1
    }

    pub fn is_unlocked(&self, progress: &UserProgress) -> bool {
        self.is_first() || progress.unlocked_at(&self.id).is_some()
    }
}

/// The level that follows `current`: its explicit successor if set, otherwise the next by order
pub fn next_level<'a>(levels: &'a [Level], current: &Level) -> Option<&'a Level> {
    if let Some(next_id) = &current.next_level_id {
        return levels.iter().find(|level| &level.id == next_id);
    }

    levels
        .iter()
        .filter(|level| level.order > current.order)
        .min_by_key(|level| level.order)
}
