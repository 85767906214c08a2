//! Snapshot publishing.
//!
//! Runs the pivot once, renders it as indented JSON and hands it to a
//! [`SnapshotSink`] unless publishing is not configured.

mod gist;

pub use gist::GistClient;

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::db::SignatureStore;
use crate::error::{ProxyError, Result};
use crate::pivot::PivotQuery;

/// Destination for a rendered snapshot.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Replaces the destination's content with `content`.
    async fn publish(&self, content: &str) -> Result<()>;
}

/// What happened to the rendered snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    Skipped(String),
}

/// Options for a single snapshot run.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    /// Also write the JSON to this file.
    pub output: Option<PathBuf>,

    /// Why publishing should be skipped, if it should.
    pub skip_reason: Option<String>,
}

/// Result of a snapshot run.
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    pub record_count: usize,
    pub json: String,
    pub outcome: PublishOutcome,
}

/// Fetches, renders and publishes one snapshot.
///
/// The sink is never called when `options.skip_reason` is set.
pub async fn run_snapshot(
    store: &dyn SignatureStore,
    query: &PivotQuery,
    sink: &dyn SnapshotSink,
    options: &SnapshotOptions,
) -> Result<SnapshotReport> {
    info!("Fetching data...");
    let records = store.fetch_signatures(query).await?;
    info!("Found {} signatures.", records.len());

    let json = serde_json::to_string_pretty(&records)?;

    if let Some(path) = &options.output {
        tokio::fs::write(path, &json).await.map_err(|e| {
            ProxyError::internal(format!("Failed to write {}: {e}", path.display()))
        })?;
        info!("Wrote snapshot to {}", path.display());
    }

    let outcome = match &options.skip_reason {
        Some(reason) => {
            warn!("Skipping Gist update ({reason}).");
            PublishOutcome::Skipped(reason.clone())
        }
        None => {
            info!("Updating Gist...");
            sink.publish(&json).await?;
            info!("Gist updated successfully.");
            PublishOutcome::Published
        }
    };

    Ok(SnapshotReport {
        record_count: records.len(),
        json,
        outcome,
    })
}
