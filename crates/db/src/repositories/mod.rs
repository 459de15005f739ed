use async_trait::async_trait;
use thiserror::Error;

use kopi_core::domain::outlet::OutletSummary;

pub mod outlet;

pub use outlet::SqlOutletStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Executes compiled outlet query text and returns the fixed four-column
/// projection. The only SQL that ever reaches this trait comes from the
/// allow-listed query compiler.
#[async_trait]
pub trait OutletStore: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<Vec<OutletSummary>, StoreError>;
}
