//! Connection integration tests.
//!
//! Tests database connectivity and error mapping.

use signatures_proxy::config::{DatabaseConfig, QuerySettings};
use signatures_proxy::db::{PostgresStore, SignatureStore};
use signatures_proxy::error::ProxyError;
use signatures_proxy::pivot::PivotQuery;

fn unreachable_config(host: &str, port: u16) -> DatabaseConfig {
    DatabaseConfig {
        host: Some(host.to_string()),
        port,
        database: Some("testdb".to_string()),
        user: Some("testuser".to_string()),
        password: Some("testpass".to_string()),
        sslmode: "require".to_string(),
        connect_timeout_secs: 5,
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_invalid_host() {
    let store = PostgresStore::new(unreachable_config(
        "invalid.host.that.does.not.exist.local",
        5439,
    ));

    let result = store
        .fetch_signatures(&PivotQuery::snapshot(&QuerySettings::default()))
        .await;

    // The specific message varies by resolver
    let error = result.unwrap_err();
    assert!(matches!(error, ProxyError::Connection(_)), "got {error:?}");
    assert!(!error.to_string().contains("testpass"));
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_refused_port() {
    let store = PostgresStore::new(unreachable_config("127.0.0.1", 1));

    let error = store
        .fetch_signatures(&PivotQuery::snapshot(&QuerySettings::default()))
        .await
        .unwrap_err();

    assert!(matches!(error, ProxyError::Connection(_)));
    assert!(error.to_string().contains("127.0.0.1:1"));
}

#[tokio::test(flavor = "current_thread")]
async fn test_missing_database_name_is_config_error() {
    let mut config = unreachable_config("127.0.0.1", 1);
    config.database = None;
    let store = PostgresStore::new(config);

    let error = store
        .fetch_signatures(&PivotQuery::snapshot(&QuerySettings::default()))
        .await
        .unwrap_err();

    assert!(matches!(error, ProxyError::Config(_)));
}

#[tokio::test]
async fn test_connect_with_wrong_password() {
    let Some(mut config) = super::fixture::test_config() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    config.password = Some("definitely-not-the-password".to_string());

    let store = PostgresStore::new(config);
    let result = store
        .fetch_signatures(&PivotQuery::snapshot(&QuerySettings::default()))
        .await;

    // Trust-auth servers accept any password; only check the failure shape.
    if let Err(error) = result {
        assert!(!error.to_string().contains("definitely-not-the-password"));
    }
}
