use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use kopi_core::domain::outlet::OutletSummary;

use super::{OutletStore, StoreError};
use crate::DbPool;

pub struct SqlOutletStore {
    pool: DbPool,
}

impl SqlOutletStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutletStore for SqlOutletStore {
    async fn execute(&self, sql: &str) -> Result<Vec<OutletSummary>, StoreError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(decode_summary).collect()
    }
}

fn decode_summary(row: &SqliteRow) -> Result<OutletSummary, StoreError> {
    Ok(OutletSummary {
        name: get_text(row, "name")?,
        address: get_text(row, "address")?,
        hours: get_text(row, "hours")?,
        services: get_text(row, "services")?,
    })
}

fn get_text(row: &SqliteRow, column: &str) -> Result<String, StoreError> {
    row.try_get::<Option<String>, _>(column)
        .map(Option::unwrap_or_default)
        .map_err(|error| StoreError::Decode(format!("column `{column}`: {error}")))
}
