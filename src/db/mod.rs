//! Database abstraction layer.
//!
//! Provides a trait-based interface for fetching pivoted signatures, so the
//! HTTP service and snapshot script can run against Postgres or an in-memory
//! store interchangeably.

mod mock;
mod postgres;

pub use mock::{FailingStore, MockStore};
pub use postgres::{connect_options, PostgresStore};

use crate::error::Result;
use crate::pivot::{PivotQuery, SignatureRecord};
use async_trait::async_trait;

/// Source of pivoted signature records.
///
/// Implementations own whatever connection they need for the duration of a
/// single call and release it before returning.
#[async_trait]
pub trait SignatureStore: Send + Sync {
    /// Runs the pivot and returns one record per respondent, newest first.
    async fn fetch_signatures(&self, query: &PivotQuery) -> Result<Vec<SignatureRecord>>;
}
