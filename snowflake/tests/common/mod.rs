//! Shared fixtures for the mock-server tests

#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use snowflake::SnowflakeProvider;
use tfplug::context::Context;
use tfplug::provider::{ConfigureProviderRequest, Provider};
use tfplug::resource::{ConfigureResourceRequest, ResourceWithConfigure};
use tfplug::types::{ClientCapabilities, DynamicValue};

pub const GRANT_COLUMNS: &[&str] = &[
    "created_on",
    "privilege",
    "granted_on",
    "name",
    "granted_to",
    "grantee_name",
    "grant_option",
    "granted_by",
];

pub const FUTURE_GRANT_COLUMNS: &[&str] = &[
    "created_on",
    "privilege",
    "grant_on",
    "name",
    "grant_to",
    "grantee_name",
    "grant_option",
];

/// Configure the provider against the mock server and build one of its resources
pub async fn configured_resource(
    server: &ServerGuard,
    type_name: &str,
) -> Box<dyn ResourceWithConfigure> {
    let mut provider = SnowflakeProvider::new();
    let configured = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config: DynamicValue::from_json(json!({
                    "host": server.url(),
                    "token": "test-token",
                })),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(configured.diagnostics.is_empty(), "{:?}", configured.diagnostics);

    let factories = provider.resources();
    let factory = factories.get(type_name).unwrap();
    let mut resource = factory();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: configured.provider_data,
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

pub fn result_body(columns: &[&str], rows: &[&[Option<&str>]]) -> String {
    json!({
        "resultSetMetaData": {
            "numRows": rows.len(),
            "partitionInfo": [{"rowCount": rows.len()}],
            "rowType": columns
                .iter()
                .map(|name| json!({"name": name, "type": "text"}))
                .collect::<Vec<_>>(),
        },
        "data": rows,
        "code": "090001",
        "statementHandle": "test-handle",
        "message": "Statement executed successfully."
    })
    .to_string()
}

pub fn status_body() -> String {
    result_body(&["status"], &[&[Some("Statement executed successfully.")]])
}

pub async fn mock_statement(server: &mut ServerGuard, statement: &str, body: String) -> Mock {
    server
        .mock("POST", Matcher::Regex(r"^/api/v2/statements".to_string()))
        .match_body(Matcher::PartialJson(json!({ "statement": statement })))
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
        .match_body(Matcher::PartialJson(json!({ "statement": statement })))
        .with_status(422)
        .with_body(
            json!({
                "code": code,
                "message": message,
                "sqlState": "02000",
                "statementHandle": "failed-handle"
            })
            .to_string(),
        )
        .create_async()
        .await
}

pub async fn mock_role_exists(server: &mut ServerGuard, database: &str, role: &str) -> Mock {
    mock_statement(
        server,
        &format!("SHOW DATABASE ROLES LIKE '{}' IN DATABASE \"{}\"", role, database),
        result_body(
            &["name", "owner", "comment"],
            &[&[Some(role), Some("SYSADMIN"), None]],
        ),
    )
    .await
}
