pub mod catalog;
pub mod provider;
pub mod tmdb;

use thiserror::Error;

pub use catalog::CatalogProvider;
pub use provider::{ChainProvider, ContentProvider, ProviderConfig};
pub use tmdb::TmdbClient;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("not found")]
    NotFound,
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
