pub use models::{CompletionReport, LevelView, ProgressSnapshot};
pub use service::ProgressionService;

pub mod models;
mod service;
