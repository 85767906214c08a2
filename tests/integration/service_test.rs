//! HTTP service integration tests.
//!
//! Drives the real router backed by `PostgresStore`.

use super::fixture;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use signatures_proxy::config::{DatabaseConfig, QuerySettings};
use signatures_proxy::db::PostgresStore;
use signatures_proxy::pivot::PivotQuery;
use signatures_proxy::server::{router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

async fn get_signatures(
    config: DatabaseConfig,
    settings: &QuerySettings,
) -> (StatusCode, serde_json::Value) {
    let state = AppState::new(
        Arc::new(PostgresStore::new(config)),
        PivotQuery::service(settings),
    );
    let req = Request::builder()
        .uri("/signatures")
        .body(Body::empty())
        .unwrap();

    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_unreachable_database_returns_500() {
    let config = DatabaseConfig {
        host: Some("127.0.0.1".to_string()),
        port: 1,
        database: Some("testdb".to_string()),
        sslmode: "disable".to_string(),
        connect_timeout_secs: 5,
        ..Default::default()
    };

    let (status, body) = get_signatures(config, &QuerySettings::default()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error_type"].as_str().unwrap().is_empty());
    assert!(!body["error_message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_signatures_count_matches_respondents() {
    let Some(seeded) = fixture::seed().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let (status, body) = get_signatures(seeded.config.clone(), &seeded.settings).await;
    seeded.cleanup().await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), fixture::EXPECTED_ORDER.len());
    assert_eq!(rows[0]["first_name"], "Grace");
    assert!(rows[0]["Title"].is_null());
}
