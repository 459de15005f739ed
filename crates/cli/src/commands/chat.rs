use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use kopi_agent::catalog::{HttpProductSource, ProductSource};
use kopi_agent::index::ProductIndex;
use kopi_agent::llm::{HttpLlmClient, LlmClient};
use kopi_agent::router::DispatchRouter;
use kopi_agent::tools::{OutletTool, ProductTool};
use kopi_core::config::{AppConfig, LoadOptions};
use kopi_db::{connect_with_settings, fixtures, migrations, SqlOutletStore};

/// One REPL process is one conversation.
const SESSION_ID: &str = "local";

const BANNER: &str = "kopi assistant - type a message, /clear to reset history, /quit to exit";

pub fn run() -> ExitCode {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("chat: configuration issue: {error}");
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("chat: failed to initialize async runtime: {error}");
            return ExitCode::from(3);
        }
    };

    let setup = runtime.block_on(build_router(&config));
    let (router, pool) = match setup {
        Ok(parts) => parts,
        Err(message) => {
            eprintln!("chat: {message}");
            return ExitCode::from(4);
        }
    };

    println!("{BANNER}");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        match input {
            "/quit" | "/exit" => break,
            "/clear" => {
                runtime.block_on(router.clear_history(SESSION_ID));
                println!("History cleared.");
            }
            _ => {
                let reply = runtime.block_on(router.handle(SESSION_ID, input));
                println!("{reply}\n");
            }
        }

        let _ = io::stdout().flush();
    }

    runtime.block_on(pool.close());
    ExitCode::SUCCESS
}

async fn build_router(
    config: &AppConfig,
) -> Result<(DispatchRouter, kopi_db::DbPool), String> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| format!("database connection failed: {error}"))?;

    migrations::run_pending(&pool)
        .await
        .map_err(|error| format!("database migration failed: {error}"))?;
    fixtures::seed_if_empty(&pool)
        .await
        .map_err(|error| format!("outlet seeding failed: {error}"))?;

    let index = match config.catalog.source_url.as_deref() {
        Some(source_url) => {
            let source = HttpProductSource::from_config(&config.catalog, source_url);
            match source.product_names().await {
                Ok(names) => ProductIndex::build(names),
                Err(error) => {
                    eprintln!("chat: catalog fetch failed ({error}); product answers degrade");
                    ProductIndex::default()
                }
            }
        }
        None => ProductIndex::default(),
    };

    let llm: Arc<dyn LlmClient> = Arc::new(HttpLlmClient::from_config(&config.llm));
    let store = Arc::new(SqlOutletStore::new(pool.clone()));

    let router = DispatchRouter::new(
        ProductTool::new(index, llm.clone()),
        OutletTool::new(store),
        llm,
    );

    Ok((router, pool))
}
