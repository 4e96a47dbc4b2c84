pub use evaluator::{LevelEvaluator, UnlockDecision};
pub use models::{next_level, Level};

mod evaluator;
pub mod models;
