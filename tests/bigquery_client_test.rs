//! BigQuery REST client tests against a mock HTTP server

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use slack_export::adapters::bigquery::{
    BigQueryClient, InsertRow, TableDefinition, TableRef, Warehouse,
};
use slack_export::adapters::gcp::AccessTokenProvider;
use slack_export::config::{secret_string, RetryConfig};
use slack_export::core::tables::TableKind;
use slack_export::domain::{ExportError, WarehouseError};
use std::sync::Arc;

const TABLES: &str = "/projects/acme-data/datasets/slack/tables";

fn client(server: &ServerGuard) -> BigQueryClient {
    let auth = AccessTokenProvider::fixed(secret_string("ya29.test".to_string()));
    BigQueryClient::with_client(reqwest::Client::new(), &server.url(), Arc::new(auth))
}

fn fast_retry(max_retries: usize) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_delay_ms: 1,
        max_delay_ms: 5,
        backoff_multiplier: 2.0,
    }
}

fn users_table() -> TableRef {
    TableRef::new("acme-data", "slack", "users_20240305")
}

#[tokio::test]
async fn test_missing_table_is_not_found() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("{TABLES}/users_20240305").as_str())
        .match_header("authorization", "Bearer ya29.test")
        .with_status(404)
        .with_body(r#"{"error":{"code":404,"message":"Not found: Table acme-data:slack.users_20240305"}}"#)
        .create_async()
        .await;

    let err = client(&server)
        .table_metadata(&users_table())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::Warehouse(WarehouseError::TableNotFound(_))
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_table_metadata_parses_string_integers() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", format!("{TABLES}/users_20240305").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"description":"users","numRows":"12","creationTime":"1709632800000"}"#,
        )
        .create_async()
        .await;

    let metadata = client(&server).table_metadata(&users_table()).await.unwrap();

    assert_eq!(metadata.description.as_deref(), Some("users"));
    assert_eq!(metadata.num_rows, Some(12));
    assert_eq!(metadata.creation_time, Some(1_709_632_800_000));
}

#[tokio::test]
async fn test_create_table_sends_reference_and_schema() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", TABLES)
        .match_body(Matcher::PartialJson(json!({
            "tableReference": {
                "projectId": "acme-data",
                "datasetId": "slack",
                "tableId": "users_20240305"
            },
            "description": TableKind::Users.description()
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let definition = TableDefinition {
        description: TableKind::Users.description().to_string(),
        schema: TableKind::Users.schema(),
    };
    client(&server)
        .create_table(&users_table(), &definition)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_conflict_is_already_exists() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", TABLES)
        .with_status(409)
        .with_body(r#"{"error":{"code":409,"message":"Already Exists"}}"#)
        .create_async()
        .await;

    let definition = TableDefinition {
        description: String::new(),
        schema: TableKind::Users.schema(),
    };
    let err = client(&server)
        .create_table(&users_table(), &definition)
        .await
        .unwrap_err();

    assert!(err.is_table_already_exists());
}

#[tokio::test]
async fn test_api_error_uses_google_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", TABLES)
        .with_status(403)
        .with_body(r#"{"error":{"code":403,"message":"Access Denied: Dataset acme-data:slack"}}"#)
        .create_async()
        .await;

    let definition = TableDefinition {
        description: String::new(),
        schema: TableKind::Files.schema(),
    };
    let err = client(&server)
        .create_table(&users_table(), &definition)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "BigQuery API error: 403 - Access Denied: Dataset acme-data:slack"
    );
}

#[tokio::test]
async fn test_insert_rows_posts_insert_ids() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", format!("{TABLES}/users_20240305/insertAll").as_str())
        .match_body(Matcher::PartialJson(json!({
            "rows": [{ "insertId": "run-U1", "json": { "id": "U1" } }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"kind":"bigquery#tableDataInsertAllResponse"}"#)
        .create_async()
        .await;

    let rows = vec![InsertRow {
        insert_id: "run-U1".to_string(),
        json: json!({ "id": "U1" }),
    }];
    client(&server)
        .insert_rows(&users_table(), rows)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_insert_errors_fail_the_batch() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", format!("{TABLES}/users_20240305/insertAll").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"insertErrors":[{"index":0,"errors":[{"reason":"invalid","location":"created","message":"bad value"}]}]}"#,
        )
        .create_async()
        .await;

    let rows = vec![InsertRow {
        insert_id: "run-U1".to_string(),
        json: json!({ "id": "U1" }),
    }];
    let err = client(&server)
        .insert_rows(&users_table(), rows)
        .await
        .unwrap_err();

    match err {
        ExportError::Warehouse(WarehouseError::InsertFailed {
            failed_rows,
            message,
            ..
        }) => {
            assert_eq!(failed_rows, 1);
            assert_eq!(message, "row 0: invalid (created): bad value");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_insert_is_retried_after_server_error() {
    let mut server = Server::new_async().await;
    let path = format!("{TABLES}/users_20240305/insertAll");
    let unavailable = server
        .mock("POST", path.as_str())
        .with_status(503)
        .with_body(r#"{"error":{"code":503,"message":"backendError"}}"#)
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("POST", path.as_str())
        .match_body(Matcher::PartialJson(json!({
            "rows": [{ "insertId": "run-U1" }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"kind":"bigquery#tableDataInsertAllResponse"}"#)
        .expect(1)
        .create_async()
        .await;

    let rows = vec![InsertRow {
        insert_id: "run-U1".to_string(),
        json: json!({ "id": "U1" }),
    }];
    client(&server)
        .with_retry(fast_retry(3))
        .insert_rows(&users_table(), rows)
        .await
        .unwrap();

    unavailable.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_throttled_create_gives_up_after_max_attempts() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", TABLES)
        .with_status(429)
        .with_body(r#"{"error":{"code":429,"message":"rateLimitExceeded"}}"#)
        .expect(2)
        .create_async()
        .await;

    let definition = TableDefinition {
        description: String::new(),
        schema: TableKind::Users.schema(),
    };
    let err = client(&server)
        .with_retry(fast_retry(2))
        .create_table(&users_table(), &definition)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::Warehouse(WarehouseError::Api { status: 429, .. })
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("{TABLES}/users_20240305").as_str())
        .with_status(404)
        .with_body(r#"{"error":{"code":404,"message":"Not found"}}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client(&server)
        .with_retry(fast_retry(3))
        .table_metadata(&users_table())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::Warehouse(WarehouseError::TableNotFound(_))
    ));
    mock.assert_async().await;
}
