//! End-to-end grant lifecycles through the provider's resource factories

#![allow(clippy::disallowed_methods)]

mod common;

use common::*;
use mockito::Server;
use serde_json::json;
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, ImportResourceStateRequest,
    ReadResourceRequest, UpdateResourceRequest,
};
use tfplug::types::{has_errors, AttributePath, ClientCapabilities, DynamicValue};

const PRIVILEGES: &str = "snowflake_grant_privileges_to_database_role";
const ROLE_GRANTS: &str = "snowflake_database_role_grants";

fn database_grant_rows(privileges: &[&str]) -> String {
    let rows: Vec<Vec<Option<&str>>> = privileges
        .iter()
        .map(|privilege| {
            vec![
                Some("2024-01-01"),
                Some(*privilege),
                Some("DATABASE"),
                Some("DB1"),
                Some("DATABASE_ROLE"),
                Some("DB1.R1"),
                Some("false"),
                Some("SYSADMIN"),
            ]
        })
        .collect();
    let rows: Vec<&[Option<&str>]> = rows.iter().map(Vec::as_slice).collect();
    result_body(GRANT_COLUMNS, &rows)
}

#[tokio::test(flavor = "multi_thread")]
async fn adding_a_privilege_grants_only_the_new_one() {
    let mut server = Server::new_async().await;
    let first_grant = mock_statement(
        &mut server,
        "GRANT MONITOR USAGE ON DATABASE \"DB1\" TO DATABASE ROLE \"DB1\".\"R1\"",
        status_body(),
    )
    .await;
    let second_grant = mock_statement(
        &mut server,
        "GRANT MANAGE GRANTS ON DATABASE \"DB1\" TO DATABASE ROLE \"DB1\".\"R1\"",
        status_body(),
    )
    .await;
    let _role = mock_role_exists(&mut server, "DB1", "R1").await;
    let _show = mock_statement(
        &mut server,
        "SHOW GRANTS ON DATABASE \"DB1\"",
        database_grant_rows(&["MONITOR USAGE", "MANAGE GRANTS"]),
    )
    .await;

    let resource = configured_resource(&server, PRIVILEGES).await;
    let config = DynamicValue::from_json(json!({
        "role_name": "R1",
        "database_name": "DB1",
        "privileges": ["MONITOR USAGE"],
        "on_database": true,
    }));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: PRIVILEGES.to_string(),
                planned_state: config.clone(),
                config,
            },
        )
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    first_grant.assert_async().await;

    let config = DynamicValue::from_json(json!({
        "role_name": "R1",
        "database_name": "DB1",
        "privileges": ["MONITOR USAGE", "MANAGE GRANTS"],
        "on_database": true,
    }));
    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: PRIVILEGES.to_string(),
                prior_state: created.new_state,
                planned_state: config.clone(),
                config,
            },
        )
        .await;

    // No REVOKE is mocked, so any revoke would surface as an error
    assert!(!has_errors(&updated.diagnostics), "{:?}", updated.diagnostics);
    second_grant.assert_async().await;
    let mut privileges = updated
        .new_state
        .get_string_list(&AttributePath::new("privileges"))
        .unwrap();
    privileges.sort();
    assert_eq!(privileges, vec!["MANAGE GRANTS", "MONITOR USAGE"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn revoking_from_a_dropped_role_succeeds() {
    let mut server = Server::new_async().await;
    let revoke = mock_statement_error(
        &mut server,
        "REVOKE DATABASE ROLE \"DB1\".\"R1\" FROM ROLE \"ROLE2\"",
        "002003",
        "Role 'ROLE2' does not exist or not authorized.",
    )
    .await;
    let lookup = mock_statement(
        &mut server,
        "SHOW ROLES LIKE 'ROLE2'",
        result_body(&["name"], &[]),
    )
    .await;

    let resource = configured_resource(&server, ROLE_GRANTS).await;
    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: ROLE_GRANTS.to_string(),
                prior_state: DynamicValue::from_json(json!({
                    "id": "DB1|R1|ROLE2|",
                    "database_name": "DB1",
                    "role_name": "R1",
                    "roles": ["ROLE2"],
                })),
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    revoke.assert_async().await;
    lookup.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn future_tables_grant_survives_import() {
    let mut server = Server::new_async().await;
    let grant = mock_statement(
        &mut server,
        "GRANT SELECT ON FUTURE TABLES IN DATABASE \"DB1\" TO DATABASE ROLE \"DB1\".\"R1\"",
        status_body(),
    )
    .await;
    let _role = mock_role_exists(&mut server, "DB1", "R1").await;
    let _show = mock_statement(
        &mut server,
        "SHOW FUTURE GRANTS IN DATABASE \"DB1\"",
        result_body(
            FUTURE_GRANT_COLUMNS,
            &[&[
                Some("2024-01-01"),
                Some("SELECT"),
                Some("TABLE"),
                Some("DB1.<TABLE>"),
                Some("DATABASE_ROLE"),
                Some("DB1.R1"),
                Some("false"),
            ]],
        ),
    )
    .await;
    let revoke = mock_statement(
        &mut server,
        "REVOKE SELECT ON FUTURE TABLES IN DATABASE \"DB1\" FROM DATABASE ROLE \"DB1\".\"R1\"",
        status_body(),
    )
    .await;

    let resource = configured_resource(&server, PRIVILEGES).await;
    let config = DynamicValue::from_json(json!({
        "role_name": "R1",
        "database_name": "DB1",
        "privileges": ["SELECT"],
        "on_schema_object": [{
            "future": [{"object_type_plural": "TABLES", "in_database": true}]
        }],
    }));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: PRIVILEGES.to_string(),
                planned_state: config.clone(),
                config,
            },
        )
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    grant.assert_async().await;
    let id = created
        .new_state
        .get_string(&AttributePath::new("id"))
        .unwrap();

    let imported = resource
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: PRIVILEGES.to_string(),
                id: id.clone(),
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(imported.diagnostics.is_empty(), "{:?}", imported.diagnostics);
    let state = imported.imported_resources[0].state.clone();

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: PRIVILEGES.to_string(),
                current_state: state,
                client_capabilities: ClientCapabilities::default(),
            },
        )
        .await;
    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    let state = read.new_state.unwrap();
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), id);
    assert_eq!(
        state
            .get_string_list(&AttributePath::new("privileges"))
            .unwrap(),
        vec!["SELECT"]
    );

    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: PRIVILEGES.to_string(),
                prior_state: state,
            },
        )
        .await;
    assert!(deleted.diagnostics.is_empty(), "{:?}", deleted.diagnostics);
    revoke.assert_async().await;
}
