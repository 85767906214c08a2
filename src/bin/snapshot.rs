//! Signatures snapshot - pivots form signatures once and publishes them to a gist.

use signatures_proxy::cli::SnapshotCli;
use signatures_proxy::config::Config;
use signatures_proxy::db::PostgresStore;
use signatures_proxy::error::Result;
use signatures_proxy::logging;
use signatures_proxy::pivot::PivotQuery;
use signatures_proxy::publish::{self, GistClient, SnapshotOptions};
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
    let cli = SnapshotCli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load(&config_path)?;
    cli.apply(&mut config);

    info!("Database: {}", config.database.display_string());

    let store = PostgresStore::new(config.database.clone());
    let query = PivotQuery::snapshot(&config.query);
    let sink = GistClient::new(config.gist.clone())?;
    let options = SnapshotOptions {
        output: cli.output.clone(),
        skip_reason: cli.skip_reason(&config),
    };

    publish::run_snapshot(&store, &query, &sink, &options).await?;
    Ok(())
}
