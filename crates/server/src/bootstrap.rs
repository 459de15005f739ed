use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use kopi_agent::catalog::{HttpProductSource, ProductSource};
use kopi_agent::index::ProductIndex;
use kopi_agent::llm::{HttpLlmClient, LlmClient};
use kopi_agent::router::DispatchRouter;
use kopi_agent::tools::{OutletTool, ProductTool};
use kopi_core::config::{AppConfig, ConfigError, LoadOptions};
use kopi_db::{connect_with_settings, fixtures, migrations, DbPool, SqlOutletStore, StoreError};

use crate::routes::ApiState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub dispatch: Arc<DispatchRouter>,
    pub api_state: ApiState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("outlet seeding failed: {0}")]
    Seed(#[source] StoreError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let seeded = fixtures::seed_if_empty(&db_pool).await.map_err(BootstrapError::Seed)?;
    info!(
        event_name = "system.bootstrap.outlets_seeded",
        inserted = seeded.inserted,
        already_seeded = seeded.already_seeded,
        "outlet seed state checked"
    );

    let index = build_product_index(&config).await;
    info!(
        event_name = "system.bootstrap.product_index_built",
        documents = index.len(),
        "product index built"
    );

    let llm: Arc<dyn LlmClient> = Arc::new(HttpLlmClient::from_config(&config.llm));
    let store = Arc::new(SqlOutletStore::new(db_pool.clone()));

    let api_state = ApiState {
        products: Arc::new(ProductTool::new(index.clone(), llm.clone())),
        outlets: Arc::new(OutletTool::new(store.clone())),
    };
    let dispatch = Arc::new(DispatchRouter::new(
        ProductTool::new(index, llm.clone()),
        OutletTool::new(store),
        llm,
    ));

    Ok(Application { config, db_pool, dispatch, api_state })
}

/// Fetch product names and build the index. An unreachable or empty catalog
/// degrades to an empty index so the rest of the service still starts.
async fn build_product_index(config: &AppConfig) -> ProductIndex {
    let Some(source_url) = config.catalog.source_url.as_deref() else {
        info!(
            event_name = "system.bootstrap.catalog_disabled",
            "no catalog source configured; product index starts empty"
        );
        return ProductIndex::default();
    };

    let source = HttpProductSource::from_config(&config.catalog, source_url);
    match source.product_names().await {
        Ok(names) => ProductIndex::build(names),
        Err(error) => {
            warn!(
                event_name = "system.bootstrap.catalog_unreachable",
                error = %error,
                "catalog fetch failed; product index starts empty"
            );
            ProductIndex::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use kopi_core::config::{ConfigOverrides, LoadOptions};
    use kopi_db::SEED_OUTLETS;

    use crate::bootstrap::bootstrap;

    fn file_overrides(dir: &tempfile::TempDir) -> LoadOptions {
        let db_path = dir.path().join("kopi-test.db");
        LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            overrides: ConfigOverrides {
                database_url: Some(format!("sqlite://{}?mode=rwc", db_path.display())),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_prepares_schema_and_seed_data() {
        let dir = tempfile::tempdir().expect("temp dir");
        let app = bootstrap(file_overrides(&dir)).await.expect("bootstrap should succeed");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'outlets'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("outlets table should exist after bootstrap");
        assert_eq!(table_count, 1);

        let (row_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM outlets")
            .fetch_one(&app.db_pool)
            .await
            .expect("seeded rows should be countable");
        assert_eq!(row_count, SEED_OUTLETS.len() as i64);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_without_catalog_source_starts_with_empty_index() {
        let dir = tempfile::tempdir().expect("temp dir");
        let app = bootstrap(file_overrides(&dir)).await.expect("bootstrap should succeed");

        // The dispatch router still answers outlet queries from the store.
        let reply = app.dispatch.handle("smoke", "outlets in kuala lumpur").await;
        assert!(reply.starts_with("I found the following outlets:"), "got: {reply}");

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_rejects_invalid_configuration() {
        let result = bootstrap(LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            overrides: kopi_core::config::ConfigOverrides {
                database_url: Some("postgres://localhost/kopi".to_string()),
                ..Default::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("error").to_string();
        assert!(message.contains("database.url"));
    }
}
