//! Signatures proxy - serves pivoted form signatures over HTTP.

use std::sync::Arc;

use signatures_proxy::cli::ProxyCli;
use signatures_proxy::config::Config;
use signatures_proxy::db::PostgresStore;
use signatures_proxy::error::Result;
use signatures_proxy::logging;
use signatures_proxy::pivot::PivotQuery;
use signatures_proxy::server::{self, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = ProxyCli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load(&config_path)?;
    cli.apply(&mut config);

    info!("Database: {}", config.database.display_string());

    let store = Arc::new(PostgresStore::new(config.database.clone()));
    let state = AppState::new(store, PivotQuery::service(&config.query))
        .with_redacted_errors(config.server.redact_errors);

    server::serve(&config.server, state).await
}
