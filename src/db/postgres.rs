//! PostgreSQL/Redshift signature store.
//!
//! Provides `PostgresStore`, which implements `SignatureStore` using sqlx.
//! Every fetch opens its own connection and closes it before returning,
//! whether the query succeeded or not.

use crate::config::DatabaseConfig;
use crate::db::SignatureStore;
use crate::error::{ProxyError, Result};
use crate::pivot::{PivotQuery, SignatureRecord};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow, PgSslMode};
use sqlx::{Connection, Row};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Number of leading name columns before the pivoted attributes.
const NAME_COLUMNS: usize = 2;

/// Signature store backed by a PostgreSQL-wire database.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    config: DatabaseConfig,
}

impl PostgresStore {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Opens a fresh connection using the configured TLS mode and timeout.
    async fn open(&self) -> Result<PgConnection> {
        let options = connect_options(&self.config)?;
        let timeout = Duration::from_secs(self.config.connect_timeout_secs);

        debug!("Connecting to {}", self.config.display_string());

        match tokio::time::timeout(timeout, PgConnection::connect_with(&options)).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(map_connection_error(e, &self.config)),
            Err(_) => Err(ProxyError::connection(format!(
                "Connection to {}:{} timed out after {} seconds.",
                self.config.host_or_default(),
                self.config.port,
                self.config.connect_timeout_secs
            ))),
        }
    }
}

#[async_trait]
impl SignatureStore for PostgresStore {
    async fn fetch_signatures(&self, query: &PivotQuery) -> Result<Vec<SignatureRecord>> {
        let mut conn = self.open().await?;

        let start = Instant::now();
        let result = sqlx::query(&query.to_sql())
            .fetch_all(&mut conn)
            .await
            .map_err(|e| ProxyError::query(format_query_error(e)))
            .and_then(|rows| {
                rows.iter()
                    .map(|row| decode_record(row, query))
                    .collect::<Result<Vec<_>>>()
            });

        if let Err(e) = conn.close().await {
            warn!("Failed to close database connection cleanly: {e}");
        }

        let records = result?;
        debug!(
            "Pivot query returned {} rows in {:?}",
            records.len(),
            start.elapsed()
        );
        Ok(records)
    }
}

/// Builds sqlx connect options from the config.
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions> {
    let database = config
        .database
        .as_deref()
        .ok_or_else(|| ProxyError::config("Database name is required (set DB_NAME)"))?;

    let ssl_mode: PgSslMode = config.sslmode.parse().map_err(|_| {
        ProxyError::config(format!(
            "Invalid sslmode '{}'. Expected disable, allow, prefer, require, verify-ca or verify-full",
            config.sslmode
        ))
    })?;

    let mut options = PgConnectOptions::new()
        .host(config.host_or_default())
        .port(config.port)
        .database(database)
        .ssl_mode(ssl_mode);

    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }

    Ok(options)
}

/// Converts one result row into a record, reading columns by position.
fn decode_record(row: &PgRow, query: &PivotQuery) -> Result<SignatureRecord> {
    let text = |index: usize| -> Result<Option<String>> {
        row.try_get::<Option<String>, _>(index)
            .map_err(|e| ProxyError::query(format!("Failed to decode column {index}: {e}")))
    };

    let attributes = query
        .labels()
        .enumerate()
        .map(|(offset, label)| -> Result<(String, Option<String>)> {
            Ok((label.to_string(), text(NAME_COLUMNS + offset)?))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SignatureRecord {
        first_name: text(0)?,
        last_name: text(1)?,
        attributes,
    })
}

/// Maps sqlx connection errors to operator-readable messages.
///
/// Messages never include the password.
fn map_connection_error(error: sqlx::Error, config: &DatabaseConfig) -> ProxyError {
    let host = config.host_or_default();
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ProxyError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        ProxyError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        ProxyError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        ProxyError::connection(format!(
            "TLS negotiation with {host}:{port} failed (sslmode={}): {error}",
            config.sslmode
        ))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ProxyError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ProxyError::connection(error.to_string())
    }
}

/// Formats a query error with Postgres detail and hint if available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }

        if let Some(table) = pg_error.table() {
            result.push_str("\n  TABLE: ");
            result.push_str(table);
        }

        if let Some(column) = pg_error.column() {
            result.push_str("\n  COLUMN: ");
            result.push_str(column);
        }
    }

    result
}
