use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::seed;
use crate::artefact::Artefact;
use crate::level::Level;
use crate::shared::AppError;

/// Read access to level and artefact reference data
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Levels ordered by `order`
    async fn list_levels(&self) -> Result<Vec<Level>, AppError>;
    async fn get_level(&self, level_id: &str) -> Result<Option<Level>, AppError>;
    async fn list_artefacts(&self) -> Result<Vec<Artefact>, AppError>;
    async fn get_artefact(&self, artefact_id: &str) -> Result<Option<Artefact>, AppError>;
}

#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    levels: Arc<RwLock<Vec<Level>>>,
    artefacts: Arc<RwLock<Vec<Artefact>>>,
}

impl InMemoryCatalogRepository {
    pub fn new(mut levels: Vec<Level>, artefacts: Vec<Artefact>) -> Self {
        levels.sort_by_key(|level| level.order);
        Self {
            levels: Arc::new(RwLock::new(levels)),
            artefacts: Arc::new(RwLock::new(artefacts)),
        }
    }

    /// Catalogue holding the built-in levels and artefacts
    pub fn seeded() -> Self {
        Self::new(seed::levels(), seed::artefacts())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    #[instrument(skip(self))]
    async fn list_levels(&self) -> Result<Vec<Level>, AppError> {
        let levels = self.levels.read().await;
        debug!(count = levels.len(), "Listing levels");
        Ok(levels.clone())
    }

    #[instrument(skip(self))]
    async fn get_level(&self, level_id: &str) -> Result<Option<Level>, AppError> {
        let levels = self.levels.read().await;
        Ok(levels.iter().find(|level| level.id == level_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_artefacts(&self) -> Result<Vec<Artefact>, AppError> {
        let artefacts = self.artefacts.read().await;
        Ok(artefacts.clone())
    }

    #[instrument(skip(self))]
    async fn get_artefact(&self, artefact_id: &str) -> Result<Option<Artefact>, AppError> {
        let artefacts = self.artefacts.read().await;
        Ok(artefacts
            .iter()
            .find(|artefact| artefact.id == artefact_id)
            .cloned())
    }
}
