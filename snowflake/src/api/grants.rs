//! GRANT / REVOKE / SHOW GRANTS for database roles

use super::client::Client;
use super::error::ApiError;
use super::identifier::{self, quote_ident};
use super::response::Row;
use crate::grants::{
    attributed_privileges, BulkScope, GrantIdentity, GrantTarget, ObservedGrant, PrivilegeSet,
    SchemaObjectTarget, SchemaTarget,
};
use std::collections::BTreeSet;
use std::fmt;

/// What a read-back of a privilege grant found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The database role (or its database) no longer exists
    RoleMissing,
    /// The object the grant is on no longer exists
    TargetMissing,
    /// ALL PRIVILEGES and ALL-objects grants cannot be listed back
    Unobservable,
    /// Privileges of the identity that are currently granted
    Observed(BTreeSet<String>),
}

/// Filter for SHOW GRANTS
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowGrants {
    On {
        object_type: &'static str,
        name: String,
    },
    FutureInDatabase(String),
    FutureInSchema(String),
}

impl fmt::Display for ShowGrants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowGrants::On { object_type, name } => {
                write!(f, "SHOW GRANTS ON {} {}", object_type, name)
            }
            ShowGrants::FutureInDatabase(database) => {
                write!(f, "SHOW FUTURE GRANTS IN DATABASE {}", database)
            }
            ShowGrants::FutureInSchema(schema) => {
                write!(f, "SHOW FUTURE GRANTS IN SCHEMA {}", schema)
            }
        }
    }
}

/// Account-level principal a database role is granted to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grantee {
    Role(String),
    User(String),
}

impl Grantee {
    pub fn keyword(&self) -> &'static str {
        match self {
            Grantee::Role(_) => "ROLE",
            Grantee::User(_) => "USER",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Grantee::Role(name) | Grantee::User(name) => name,
        }
    }
}

/// One row of SHOW GRANTS OF DATABASE ROLE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRoleGrant {
    pub role: String,
    pub granted_to: String,
    pub grantee_name: String,
    pub granted_by: String,
}

impl DatabaseRoleGrant {
    /// None for grantee kinds other than account roles and users
    pub fn grantee(&self) -> Option<Grantee> {
        let name = identifier::unqualified(&self.grantee_name);
        match self.granted_to.to_ascii_uppercase().as_str() {
            "ROLE" => Some(Grantee::Role(name)),
            "USER" => Some(Grantee::User(name)),
            _ => None,
        }
    }
}

fn privilege_list(privileges: &PrivilegeSet) -> String {
    match privileges {
        PrivilegeSet::All => "ALL PRIVILEGES".to_string(),
        PrivilegeSet::Named(names) => names
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn bulk_scope(database: &str, scope: &BulkScope) -> Result<String, ApiError> {
    Ok(match scope {
        BulkScope::Database => format!("DATABASE {}", quote_ident(database)),
        BulkScope::Schema(schema) => {
            format!("SCHEMA {}", identifier::qualified_schema(database, schema)?)
        }
    })
}

/// The `ON ...` part of GRANT and REVOKE
pub fn on_clause(identity: &GrantIdentity) -> Result<String, ApiError> {
    let database = &identity.database_name;
    Ok(match &identity.target {
        GrantTarget::Database => format!("DATABASE {}", quote_ident(database)),
        GrantTarget::Schema(SchemaTarget::Named(schema)) => {
            format!("SCHEMA {}", identifier::qualified_schema(database, schema)?)
        }
        GrantTarget::Schema(SchemaTarget::AllInDatabase) => {
            format!("ALL SCHEMAS IN DATABASE {}", quote_ident(database))
        }
        GrantTarget::Schema(SchemaTarget::FutureInDatabase) => {
            format!("FUTURE SCHEMAS IN DATABASE {}", quote_ident(database))
        }
        GrantTarget::SchemaObject(SchemaObjectTarget::Named {
            object_type,
            object_name,
        }) => format!(
            "{} {}",
            object_type,
            identifier::qualified_object(database, object_name)?
        ),
        GrantTarget::SchemaObject(SchemaObjectTarget::All(bulk)) => format!(
            "ALL {} IN {}",
            bulk.object_type_plural,
            bulk_scope(database, &bulk.scope)?
        ),
        GrantTarget::SchemaObject(SchemaObjectTarget::Future(bulk)) => format!(
            "FUTURE {} IN {}",
            bulk.object_type_plural,
            bulk_scope(database, &bulk.scope)?
        ),
    })
}

pub fn grant_statement(identity: &GrantIdentity) -> Result<String, ApiError> {
    let mut statement = format!(
        "GRANT {} ON {} TO DATABASE ROLE {}",
        privilege_list(&identity.privileges),
        on_clause(identity)?,
        identifier::database_role(&identity.database_name, &identity.role_name)
    );
    if identity.with_grant_option {
        statement.push_str(" WITH GRANT OPTION");
    }
    Ok(statement)
}

pub fn revoke_statement(identity: &GrantIdentity) -> Result<String, ApiError> {
    Ok(format!(
        "REVOKE {} ON {} FROM DATABASE ROLE {}",
        privilege_list(&identity.privileges),
        on_clause(identity)?,
        identifier::database_role(&identity.database_name, &identity.role_name)
    ))
}

/// SHOW filter that lists grants of this identity, None when the grant
/// cannot be listed back
pub fn show_filter(identity: &GrantIdentity) -> Result<Option<ShowGrants>, ApiError> {
    if identity.privileges.is_all() || !identity.target.is_observable() {
        return Ok(None);
    }

    let database = &identity.database_name;
    let filter = match &identity.target {
        GrantTarget::Database => ShowGrants::On {
            object_type: "DATABASE",
            name: quote_ident(database),
        },
        GrantTarget::Schema(SchemaTarget::Named(schema)) => ShowGrants::On {
            object_type: "SCHEMA",
            name: identifier::qualified_schema(database, schema)?,
        },
        GrantTarget::Schema(SchemaTarget::FutureInDatabase) => {
            ShowGrants::FutureInDatabase(quote_ident(database))
        }
        GrantTarget::SchemaObject(SchemaObjectTarget::Named {
            object_type,
            object_name,
        }) => ShowGrants::On {
            object_type: object_type.as_str(),
            name: identifier::qualified_object(database, object_name)?,
        },
        GrantTarget::SchemaObject(SchemaObjectTarget::Future(bulk)) => match &bulk.scope {
            BulkScope::Database => ShowGrants::FutureInDatabase(quote_ident(database)),
            BulkScope::Schema(schema) => {
                ShowGrants::FutureInSchema(identifier::qualified_schema(database, schema)?)
            }
        },
        GrantTarget::Schema(SchemaTarget::AllInDatabase)
        | GrantTarget::SchemaObject(SchemaObjectTarget::All(_)) => return Ok(None),
    };
    Ok(Some(filter))
}

fn observed_grant(row: &Row) -> ObservedGrant {
    let granted_on = row
        .get("granted_on")
        .or_else(|| row.get("grant_on"))
        .unwrap_or_default();
    let granted_to = row
        .get("granted_to")
        .or_else(|| row.get("grant_to"))
        .unwrap_or_default();

    ObservedGrant {
        privilege: row.get_or_empty("privilege").to_string(),
        granted_on: granted_on.to_string(),
        name: row.get_or_empty("name").to_string(),
        granted_to: granted_to.to_string(),
        grantee_name: row.get_or_empty("grantee_name").to_string(),
        grant_option: row.get_bool("grant_option"),
        granted_by: row.get_or_empty("granted_by").to_string(),
    }
}

/// Privilege grant operations
pub struct GrantsApi<'a> {
    client: &'a Client,
}

impl<'a> GrantsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Issue one GRANT for the identity. An empty privilege set grants nothing.
    pub async fn grant(&self, identity: &GrantIdentity) -> Result<(), ApiError> {
        if identity.privileges.is_empty() {
            tracing::debug!(role = %identity.role_name, "no privileges to grant");
            return Ok(());
        }
        let statement = grant_statement(identity)?;
        self.client.execute(&statement).await?;
        Ok(())
    }

    /// Issue one REVOKE for the identity. An empty privilege set revokes nothing.
    pub async fn revoke(&self, identity: &GrantIdentity) -> Result<(), ApiError> {
        if identity.privileges.is_empty() {
            tracing::debug!(role = %identity.role_name, "no privileges to revoke");
            return Ok(());
        }
        let statement = revoke_statement(identity)?;
        self.client.execute(&statement).await?;
        Ok(())
    }

    pub async fn show(&self, filter: &ShowGrants) -> Result<Vec<ObservedGrant>, ApiError> {
        let result = self.client.execute(&filter.to_string()).await?;
        Ok(result.rows().iter().map(observed_grant).collect())
    }

    /// Read back which of the identity's privileges are granted
    pub async fn read_privileges(&self, identity: &GrantIdentity) -> Result<ReadOutcome, ApiError> {
        let filter = match show_filter(identity)? {
            Some(filter) => filter,
            None => {
                tracing::debug!(
                    role = %identity.role_name,
                    "grant cannot be listed back, keeping stored privileges"
                );
                return Ok(ReadOutcome::Unobservable);
            }
        };

        match self
            .client
            .database_roles()
            .show(&identity.database_name, &identity.role_name)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(ReadOutcome::RoleMissing),
            Err(err) if err.is_object_missing() => return Ok(ReadOutcome::RoleMissing),
            Err(err) => return Err(err),
        }

        let observed = match self.show(&filter).await {
            Ok(observed) => observed,
            Err(err) if err.is_object_missing() => return Ok(ReadOutcome::TargetMissing),
            Err(err) => return Err(err),
        };
        Ok(ReadOutcome::Observed(attributed_privileges(
            identity, &observed,
        )))
    }

    pub async fn grant_database_role(
        &self,
        database: &str,
        role: &str,
        grantee: &Grantee,
    ) -> Result<(), ApiError> {
        let statement = format!(
            "GRANT DATABASE ROLE {} TO {} {}",
            identifier::database_role(database, role),
            grantee.keyword(),
            quote_ident(grantee.name())
        );
        self.client.execute(&statement).await?;
        Ok(())
    }

    /// Revoke a database role from a grantee. A grantee that no longer
    /// exists has nothing left to revoke; that is confirmed with a lookup
    /// before the failure is ignored.
    pub async fn revoke_database_role(
        &self,
        database: &str,
        role: &str,
        grantee: &Grantee,
    ) -> Result<(), ApiError> {
        let statement = format!(
            "REVOKE DATABASE ROLE {} FROM {} {}",
            identifier::database_role(database, role),
            grantee.keyword(),
            quote_ident(grantee.name())
        );

        let err = match self.client.execute(&statement).await {
            Ok(_) => return Ok(()),
            Err(err) if err.is_object_missing() => err,
            Err(err) => return Err(err),
        };

        let principals = self.client.principals();
        let exists = match grantee {
            Grantee::Role(name) => principals.role_exists(name).await,
            Grantee::User(name) => principals.user_exists(name).await,
        };
        match exists {
            Ok(false) => {
                tracing::warn!(
                    grantee = grantee.name(),
                    kind = grantee.keyword(),
                    "grantee no longer exists, treating revoke of {}.{} as done",
                    database,
                    role
                );
                Ok(())
            }
            Ok(true) => Err(err),
            Err(lookup) => {
                tracing::debug!("grantee lookup failed: {}", lookup);
                Err(err)
            }
        }
    }

    pub async fn show_grants_of_database_role(
        &self,
        database: &str,
        role: &str,
    ) -> Result<Vec<DatabaseRoleGrant>, ApiError> {
        let statement = format!(
            "SHOW GRANTS OF DATABASE ROLE {}",
            identifier::database_role(database, role)
        );
        let result = self.client.execute(&statement).await?;
        Ok(result
            .rows()
            .iter()
            .map(|row| DatabaseRoleGrant {
                role: row.get_or_empty("role").to_string(),
                granted_to: row.get_or_empty("granted_to").to_string(),
                grantee_name: row.get_or_empty("grantee_name").to_string(),
                granted_by: row.get_or_empty("granted_by").to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::test_helpers::{
        create_test_client, mock_statement, mock_statement_error, result_body, status_body,
    };
    use crate::grants::{BulkTarget, ObjectType, PluralObjectType};
    use mockito::Server;

    const GRANT_COLUMNS: &[&str] = &[
        "created_on",
        "privilege",
        "granted_on",
        "name",
        "granted_to",
        "grantee_name",
        "grant_option",
        "granted_by",
    ];

    fn identity(target: GrantTarget, privileges: PrivilegeSet) -> GrantIdentity {
        GrantIdentity::new("R1", "DB1", privileges, false, target).unwrap()
    }

    fn future_tables(scope: BulkScope) -> GrantTarget {
        GrantTarget::SchemaObject(SchemaObjectTarget::Future(BulkTarget {
            object_type_plural: PluralObjectType::Tables,
            scope,
        }))
    }

    #[test]
    fn statements_cover_every_target_shape() {
        let cases = [
            (
                GrantTarget::Database,
                "GRANT MONITOR USAGE ON DATABASE \"DB1\" TO DATABASE ROLE \"DB1\".\"R1\"",
            ),
            (
                GrantTarget::Schema(SchemaTarget::Named("PUBLIC".to_string())),
                "GRANT MONITOR USAGE ON SCHEMA \"DB1\".\"PUBLIC\" TO DATABASE ROLE \"DB1\".\"R1\"",
            ),
            (
                GrantTarget::Schema(SchemaTarget::AllInDatabase),
                "GRANT MONITOR USAGE ON ALL SCHEMAS IN DATABASE \"DB1\" TO DATABASE ROLE \"DB1\".\"R1\"",
            ),
            (
                GrantTarget::SchemaObject(SchemaObjectTarget::Named {
                    object_type: ObjectType::ExternalTable,
                    object_name: "PUBLIC.EXT".to_string(),
                }),
                "GRANT MONITOR USAGE ON EXTERNAL TABLE \"DB1\".\"PUBLIC\".\"EXT\" TO DATABASE ROLE \"DB1\".\"R1\"",
            ),
            (
                future_tables(BulkScope::Database),
                "GRANT MONITOR USAGE ON FUTURE TABLES IN DATABASE \"DB1\" TO DATABASE ROLE \"DB1\".\"R1\"",
            ),
            (
                GrantTarget::SchemaObject(SchemaObjectTarget::All(BulkTarget {
                    object_type_plural: PluralObjectType::Views,
                    scope: BulkScope::Schema("PUBLIC".to_string()),
                })),
                "GRANT MONITOR USAGE ON ALL VIEWS IN SCHEMA \"DB1\".\"PUBLIC\" TO DATABASE ROLE \"DB1\".\"R1\"",
            ),
        ];

        for (target, expected) in cases {
            let id = identity(target, PrivilegeSet::named(["MONITOR USAGE"]));
            assert_eq!(grant_statement(&id).unwrap(), expected);
        }
    }

    #[test]
    fn revoke_and_grant_option_statements() {
        let mut id = identity(
            GrantTarget::Schema(SchemaTarget::FutureInDatabase),
            PrivilegeSet::All,
        );
        id.with_grant_option = true;

        assert_eq!(
            grant_statement(&id).unwrap(),
            "GRANT ALL PRIVILEGES ON FUTURE SCHEMAS IN DATABASE \"DB1\" TO DATABASE ROLE \"DB1\".\"R1\" WITH GRANT OPTION"
        );
        assert_eq!(
            revoke_statement(&id).unwrap(),
            "REVOKE ALL PRIVILEGES ON FUTURE SCHEMAS IN DATABASE \"DB1\" FROM DATABASE ROLE \"DB1\".\"R1\""
        );
    }

    #[test]
    fn show_filters_follow_the_target() {
        let in_schema = identity(
            future_tables(BulkScope::Schema("PUBLIC".to_string())),
            PrivilegeSet::named(["SELECT"]),
        );
        assert_eq!(
            show_filter(&in_schema).unwrap().unwrap().to_string(),
            "SHOW FUTURE GRANTS IN SCHEMA \"DB1\".\"PUBLIC\""
        );

        let in_database = identity(future_tables(BulkScope::Database), PrivilegeSet::named(["SELECT"]));
        assert_eq!(
            show_filter(&in_database).unwrap().unwrap().to_string(),
            "SHOW FUTURE GRANTS IN DATABASE \"DB1\""
        );

        let all_privileges = identity(
            GrantTarget::Schema(SchemaTarget::Named("PUBLIC".to_string())),
            PrivilegeSet::All,
        );
        assert_eq!(show_filter(&all_privileges).unwrap(), None);

        let all_schemas = identity(
            GrantTarget::Schema(SchemaTarget::AllInDatabase),
            PrivilegeSet::named(["USAGE"]),
        );
        assert_eq!(show_filter(&all_schemas).unwrap(), None);
    }

    #[tokio::test]
    async fn empty_privilege_sets_issue_no_statement() {
        let server = Server::new_async().await;
        let client = create_test_client(&server.url());
        let id = identity(GrantTarget::Database, PrivilegeSet::named(Vec::<String>::new()));

        client.grants().grant(&id).await.unwrap();
        client.grants().revoke(&id).await.unwrap();
    }

    #[tokio::test]
    async fn read_privileges_reports_only_attributed_privileges() {
        let mut server = Server::new_async().await;
        let _role = mock_statement(
            &mut server,
            "SHOW DATABASE ROLES LIKE 'R1' IN DATABASE \"DB1\"",
            result_body(&["name", "owner", "comment"], &[&[Some("R1"), Some("SYSADMIN"), None]]),
        )
        .await;
        let _grants = mock_statement(
            &mut server,
            "SHOW GRANTS ON DATABASE \"DB1\"",
            result_body(
                GRANT_COLUMNS,
                &[
                    &[
                        Some("2024-01-01"),
                        Some("MONITOR USAGE"),
                        Some("DATABASE"),
                        Some("DB1"),
                        Some("DATABASE_ROLE"),
                        Some("DB1.R1"),
                        Some("false"),
                        Some("SYSADMIN"),
                    ],
                    &[
                        Some("2024-01-01"),
                        Some("CREATE SCHEMA"),
                        Some("DATABASE"),
                        Some("DB1"),
                        Some("DATABASE_ROLE"),
                        Some("DB1.R1"),
                        Some("false"),
                        Some("SYSADMIN"),
                    ],
                ],
            ),
        )
        .await;

        let client = create_test_client(&server.url());
        let id = identity(
            GrantTarget::Database,
            PrivilegeSet::named(["MONITOR USAGE", "MANAGE GRANTS"]),
        );

        let outcome = client.grants().read_privileges(&id).await.unwrap();
        assert_eq!(
            outcome,
            ReadOutcome::Observed(["MONITOR USAGE".to_string()].into_iter().collect())
        );
    }

    #[tokio::test]
    async fn read_privileges_detects_missing_role() {
        let mut server = Server::new_async().await;
        let _role = mock_statement(
            &mut server,
            "SHOW DATABASE ROLES LIKE 'R1' IN DATABASE \"DB1\"",
            result_body(&["name", "owner", "comment"], &[]),
        )
        .await;

        let client = create_test_client(&server.url());
        let id = identity(GrantTarget::Database, PrivilegeSet::named(["USAGE"]));

        assert_eq!(
            client.grants().read_privileges(&id).await.unwrap(),
            ReadOutcome::RoleMissing
        );
    }

    #[tokio::test]
    async fn read_privileges_skips_unlistable_grants() {
        let server = Server::new_async().await;
        let client = create_test_client(&server.url());
        let id = identity(
            GrantTarget::Schema(SchemaTarget::Named("PUBLIC".to_string())),
            PrivilegeSet::All,
        );

        assert_eq!(
            client.grants().read_privileges(&id).await.unwrap(),
            ReadOutcome::Unobservable
        );
    }

    #[tokio::test]
    async fn revoke_from_dropped_role_succeeds() {
        let mut server = Server::new_async().await;
        let _revoke = mock_statement_error(
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

        let client = create_test_client(&server.url());
        client
            .grants()
            .revoke_database_role("DB1", "R1", &Grantee::Role("ROLE2".to_string()))
            .await
            .unwrap();
        lookup.assert_async().await;
    }

    #[tokio::test]
    async fn revoke_keeps_error_when_grantee_still_exists() {
        let mut server = Server::new_async().await;
        let _revoke = mock_statement_error(
            &mut server,
            "REVOKE DATABASE ROLE \"DB1\".\"R1\" FROM USER \"ALICE\"",
            "002003",
            "Database role 'DB1.R1' does not exist or not authorized.",
        )
        .await;
        let _lookup = mock_statement(
            &mut server,
            "SHOW USERS LIKE 'ALICE'",
            result_body(&["name", "login_name"], &[&[Some("ALICE"), Some("ALICE")]]),
        )
        .await;

        let client = create_test_client(&server.url());
        let err = client
            .grants()
            .revoke_database_role("DB1", "R1", &Grantee::User("ALICE".to_string()))
            .await
            .unwrap_err();
        assert!(err.is_object_missing());
    }

    #[tokio::test]
    async fn revoke_does_not_swallow_unrelated_errors() {
        let mut server = Server::new_async().await;
        let _revoke = mock_statement_error(
            &mut server,
            "REVOKE DATABASE ROLE \"DB1\".\"R1\" FROM ROLE \"ROLE2\"",
            "003001",
            "Insufficient privileges to operate on database role 'R1'",
        )
        .await;
        let client = create_test_client(&server.url());
        let result = client
            .grants()
            .revoke_database_role("DB1", "R1", &Grantee::Role("ROLE2".to_string()))
            .await;
        assert!(matches!(result, Err(ApiError::Statement { ref code, .. }) if code == "003001"));
    }

    #[tokio::test]
    async fn grants_of_database_role_expose_grantees() {
        let mut server = Server::new_async().await;
        let _show = mock_statement(
            &mut server,
            "SHOW GRANTS OF DATABASE ROLE \"DB1\".\"R1\"",
            result_body(
                &["created_on", "role", "granted_to", "grantee_name", "granted_by"],
                &[
                    &[Some("t"), Some("DB1.R1"), Some("ROLE"), Some("ANALYST"), Some("SYSADMIN")],
                    &[Some("t"), Some("DB1.R1"), Some("USER"), Some("ALICE"), Some("SYSADMIN")],
                    &[Some("t"), Some("DB1.R1"), Some("DATABASE_ROLE"), Some("DB1.R2"), Some("SYSADMIN")],
                ],
            ),
        )
        .await;
        let _grant = mock_statement(
            &mut server,
            "GRANT DATABASE ROLE \"DB1\".\"R1\" TO ROLE \"ANALYST\"",
            status_body(),
        )
        .await;

        let client = create_test_client(&server.url());
        client
            .grants()
            .grant_database_role("DB1", "R1", &Grantee::Role("ANALYST".to_string()))
            .await
            .unwrap();

        let grants = client
            .grants()
            .show_grants_of_database_role("DB1", "R1")
            .await
            .unwrap();
        let grantees: Vec<_> = grants.iter().filter_map(DatabaseRoleGrant::grantee).collect();
        assert_eq!(
            grantees,
            vec![
                Grantee::Role("ANALYST".to_string()),
                Grantee::User("ALICE".to_string())
            ]
        );
    }
}
