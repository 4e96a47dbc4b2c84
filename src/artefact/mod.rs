pub use models::{Artefact, ArtefactStatus, UnlockRule};
pub use resolver::{sort_unlocked_first, ArtefactResolver};

pub mod models;
mod resolver;
