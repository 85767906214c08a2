//! Throwaway schema seeded with a small set of form answers.

use signatures_proxy::config::{DatabaseConfig, QuerySettings};
use signatures_proxy::db::connect_options;
use sqlx::{Connection, PgConnection};
use std::time::{SystemTime, UNIX_EPOCH};

/// Form id the seeded answers belong to.
pub const FORM_ID: i64 = 706308;

/// Respondents for `FORM_ID`, newest first.
pub const EXPECTED_ORDER: [&str; 3] = ["Grace", "Alan", "Ada"];

/// A seeded schema plus the config needed to reach it.
pub struct Seeded {
    pub config: DatabaseConfig,
    pub settings: QuerySettings,
}

impl Seeded {
    /// Drops the schema and everything in it.
    ///
    /// Call before asserting so a failing test does not leave the schema behind.
    pub async fn cleanup(self) {
        let Ok(mut conn) = open(&self.config).await else {
            return;
        };
        let _ = sqlx::raw_sql(&format!(
            "DROP SCHEMA IF EXISTS \"{}\" CASCADE",
            self.settings.schema
        ))
        .execute(&mut conn)
        .await;
        let _ = conn.close().await;
    }
}

/// Reads DATABASE_URL, defaulting to `sslmode=prefer` for local servers.
pub fn test_config() -> Option<DatabaseConfig> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let mut config = DatabaseConfig::from_connection_string(&url).ok()?;
    if !url.contains("sslmode=") {
        config.sslmode = "prefer".to_string();
    }
    Some(config)
}

async fn open(config: &DatabaseConfig) -> Result<PgConnection, sqlx::Error> {
    let options = connect_options(config).expect("valid test config");
    PgConnection::connect_with(&options).await
}

/// Creates a uniquely named schema with the three source tables and seeds it.
///
/// Returns `None` when DATABASE_URL is not set.
pub async fn seed() -> Option<Seeded> {
    let config = test_config()?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let schema = format!("sigproxy_test_{}_{nanos}", std::process::id());

    let mut conn = open(&config).await.expect("connect to DATABASE_URL");
    sqlx::raw_sql(&format!(
        r#"
        CREATE SCHEMA "{schema}";
        CREATE TABLE "{schema}".answers (
            id BIGINT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            first_name VARCHAR(255),
            last_name VARCHAR(255),
            created_at TIMESTAMP NOT NULL,
            form_id BIGINT NOT NULL
        );
        CREATE TABLE "{schema}".field_names (
            id BIGINT PRIMARY KEY,
            name VARCHAR(255) NOT NULL
        );
        CREATE TABLE "{schema}".field_values (
            user_id BIGINT NOT NULL,
            field_name_id BIGINT NOT NULL,
            value VARCHAR(1024)
        );
        INSERT INTO "{schema}".field_names (id, name) VALUES
            (1, 'Title'),
            (2, 'Institution / Organization'),
            (3, 'EPA_Supporter_Type'),
            (4, 'EPA_Notable');
        INSERT INTO "{schema}".answers (id, user_id, first_name, last_name, created_at, form_id) VALUES
            (1, 10, 'Ada', 'Lovelace', '2024-01-01 10:00:00', {FORM_ID}),
            (2, 20, 'Grace', 'Hopper', '2024-01-03 10:00:00', {FORM_ID}),
            (3, 30, 'Alan', 'Turing', '2024-01-02 10:00:00', {FORM_ID}),
            (4, 40, 'Eve', 'Other', '2024-01-04 10:00:00', 1);
        INSERT INTO "{schema}".field_values (user_id, field_name_id, value) VALUES
            (10, 1, 'Dr.'),
            (10, 2, 'Analytical Society'),
            (30, 3, 'Scientist'),
            (30, 1, 'Mr.'),
            (30, 1, 'Prof.'),
            (40, 1, 'Ms.');
        "#
    ))
    .execute(&mut conn)
    .await
    .expect("seed schema");
    let _ = conn.close().await;

    Some(Seeded {
        config,
        settings: QuerySettings {
            schema,
            form_id: FORM_ID,
        },
    })
}
