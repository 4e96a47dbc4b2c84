pub use repository::{CatalogRepository, InMemoryCatalogRepository};

mod repository;
pub mod seed;
