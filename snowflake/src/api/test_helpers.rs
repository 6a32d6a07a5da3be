//! Test helpers for the SQL API

#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use std::time::Duration;

pub fn create_test_client(url: &str) -> super::Client {
    let mut config = super::ClientConfig::new(url, "test-token");
    config.poll_interval = Duration::from_millis(5);
    super::Client::new(config).unwrap()
}

/// Successful statement body with the given columns and rows
pub fn result_body(columns: &[&str], rows: &[&[Option<&str>]]) -> String {
    serde_json::json!({
        "resultSetMetaData": {
            "numRows": rows.len(),
            "partitionInfo": [{"rowCount": rows.len()}],
            "rowType": columns
                .iter()
                .map(|name| serde_json::json!({"name": name, "type": "text"}))
                .collect::<Vec<_>>(),
        },
        "data": rows,
        "code": "090001",
        "statementHandle": "test-handle",
        "message": "Statement executed successfully."
    })
    .to_string()
}

/// Body for a statement with no result columns (GRANT, REVOKE, DDL)
pub fn status_body() -> String {
    result_body(&["status"], &[&[Some("Statement executed successfully.")]])
}

pub fn error_body(code: &str, message: &str) -> String {
    serde_json::json!({
        "code": code,
        "message": message,
        "sqlState": "02000",
        "statementHandle": "failed-handle"
    })
    .to_string()
}

pub async fn mock_statement(server: &mut ServerGuard, statement: &str, body: String) -> Mock {
    server
        .mock("POST", Matcher::Regex(r"^/api/v2/statements".to_string()))
        .match_body(Matcher::PartialJson(
            serde_json::json!({ "statement": statement }),
        ))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

pub async fn mock_statement_error(
    server: &mut ServerGuard,
    statement: &str,
    code: &str,
    message: &str,
) -> Mock {
    server
        .mock("POST", Matcher::Regex(r"^/api/v2/statements".to_string()))
        .match_body(Matcher::PartialJson(
            serde_json::json!({ "statement": statement }),
        ))
        .with_status(422)
        .with_body(error_body(code, message))
        .create_async()
        .await
}
