//! Grants of a database role to account roles and users

use crate::api::grants::{DatabaseRoleGrant, Grantee};
use crate::api::ApiError;
use crate::provider_data::{not_configured, SnowflakeProviderData};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource, ModifyPlanRequest,
    ModifyPlanResponse, ReadResourceRequest, ReadResourceResponse, Resource,
    ResourceMetadataRequest, ResourceMetadataResponse, ResourceSchemaRequest,
    ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{has_errors, AttributePath, Diagnostic, Dynamic, DynamicValue};

const TYPE_NAME: &str = "snowflake_database_role_grants";

/// `database|role|roles|users`, grantee lists comma-joined and sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseRoleGrants {
    pub database_name: String,
    pub role_name: String,
    pub roles: BTreeSet<String>,
    pub users: BTreeSet<String>,
}

impl DatabaseRoleGrants {
    fn grantees(&self) -> impl Iterator<Item = Grantee> + '_ {
        self.roles
            .iter()
            .cloned()
            .map(Grantee::Role)
            .chain(self.users.iter().cloned().map(Grantee::User))
    }

    fn insert(&mut self, grantee: &Grantee) {
        match grantee {
            Grantee::Role(name) => self.roles.insert(name.clone()),
            Grantee::User(name) => self.users.insert(name.clone()),
        };
    }

    fn remove(&mut self, grantee: &Grantee) {
        match grantee {
            Grantee::Role(name) => self.roles.remove(name),
            Grantee::User(name) => self.users.remove(name),
        };
    }
}

impl fmt::Display for DatabaseRoleGrants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |names: &BTreeSet<String>| names.iter().cloned().collect::<Vec<_>>().join(",");
        write!(
            f,
            "{}|{}|{}|{}",
            self.database_name,
            self.role_name,
            join(&self.roles),
            join(&self.users)
        )
    }
}

impl FromStr for DatabaseRoleGrants {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = |list: &str| -> BTreeSet<String> {
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        };
        match s.split('|').collect::<Vec<_>>().as_slice() {
            [database, role, roles, users] if !database.is_empty() && !role.is_empty() => {
                Ok(Self {
                    database_name: database.to_string(),
                    role_name: role.to_string(),
                    roles: split(roles),
                    users: split(users),
                })
            }
            _ => Err(format!(
                "expected database|role|roles|users with comma-separated grantees, found '{}'",
                s
            )),
        }
    }
}

#[derive(Default)]
pub struct DatabaseRoleGrantsResource {
    provider_data: Option<SnowflakeProviderData>,
}

impl DatabaseRoleGrantsResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Grants a database role to account roles and users")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("database_name", AttributeType::String)
                    .description("Database the role belongs to")
                    .required()
                    .requires_replace()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("role_name", AttributeType::String)
                    .description("Database role to grant")
                    .required()
                    .requires_replace()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("roles", AttributeType::Set(Box::new(AttributeType::String)))
                    .description("Account roles receiving the database role")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("users", AttributeType::Set(Box::new(AttributeType::String)))
                    .description("Users receiving the database role")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("enable_multiple_grants", AttributeType::Bool)
                    .description("Only track grantees listed here; grants made elsewhere are left alone")
                    .optional()
                    .build(),
            )
            .build()
    }

    fn extract_grants(&self, config: &DynamicValue) -> Result<DatabaseRoleGrants, Diagnostic> {
        let string = |name: &str| {
            config.get_string(&AttributePath::new(name)).map_err(|_| {
                Diagnostic::error(
                    format!("Missing {}", name),
                    format!("The '{}' attribute is required", name),
                )
                .with_attribute(AttributePath::new(name))
            })
        };
        let set = |name: &str| {
            config
                .get_string_list(&AttributePath::new(name))
                .map(|list| list.into_iter().collect::<BTreeSet<_>>())
                .map_err(|e| {
                    Diagnostic::error(format!("Invalid {}", name), e.to_string())
                        .with_attribute(AttributePath::new(name))
                })
        };

        let grants = DatabaseRoleGrants {
            database_name: string("database_name")?,
            role_name: string("role_name")?,
            roles: set("roles")?,
            users: set("users")?,
        };

        let reserved = grants
            .grantees()
            .map(|g| g.name().to_string())
            .chain([grants.database_name.clone(), grants.role_name.clone()])
            .find(|name| name.contains('|') || name.contains(','));
        if let Some(name) = reserved {
            return Err(Diagnostic::error(
                "Invalid name",
                format!("'{}' contains '|' or ',' which cannot be stored in the id", name),
            ));
        }
        Ok(grants)
    }

    /// Apply `desired` starting from `current`, revoking before granting.
    /// `current` tracks what has been applied when a statement fails.
    async fn converge(
        &self,
        provider_data: &SnowflakeProviderData,
        current: &mut DatabaseRoleGrants,
        desired: &DatabaseRoleGrants,
    ) -> Result<(), ApiError> {
        let grants = provider_data.client.grants();

        let stale: Vec<Grantee> = current
            .grantees()
            .filter(|g| !desired.grantees().any(|d| d == *g))
            .collect();
        for grantee in stale {
            grants
                .revoke_database_role(&current.database_name, &current.role_name, &grantee)
                .await?;
            current.remove(&grantee);
        }

        let missing: Vec<Grantee> = desired
            .grantees()
            .filter(|g| !current.grantees().any(|c| c == *g))
            .collect();
        for grantee in missing {
            grants
                .grant_database_role(&desired.database_name, &desired.role_name, &grantee)
                .await?;
            current.insert(&grantee);
        }
        Ok(())
    }
}

fn set_grantees(state: &mut DynamicValue, grants: &DatabaseRoleGrants) -> tfplug::Result<()> {
    state.set_string(&AttributePath::new("id"), grants.to_string())?;
    state.set_string_list(&AttributePath::new("roles"), grants.roles.iter().cloned())?;
    state.set_string_list(&AttributePath::new("users"), grants.users.iter().cloned())?;
    Ok(())
}

fn imported_state(grants: &DatabaseRoleGrants) -> tfplug::Result<DynamicValue> {
    let mut state = DynamicValue::object();
    state.set_string(
        &AttributePath::new("database_name"),
        grants.database_name.clone(),
    )?;
    state.set_string(&AttributePath::new("role_name"), grants.role_name.clone())?;
    state.set_bool(&AttributePath::new("enable_multiple_grants"), false)?;
    set_grantees(&mut state, grants)?;
    Ok(state)
}

/// Grantees from SHOW GRANTS OF DATABASE ROLE, limited to `tracked` when set
fn observed_grants(
    base: &DatabaseRoleGrants,
    rows: &[DatabaseRoleGrant],
    tracked: Option<&DatabaseRoleGrants>,
) -> DatabaseRoleGrants {
    let mut observed = DatabaseRoleGrants {
        database_name: base.database_name.clone(),
        role_name: base.role_name.clone(),
        ..Default::default()
    };
    for row in rows {
        match row.grantee() {
            Some(grantee) => {
                let keep = tracked
                    .map(|t| t.grantees().any(|g| g == grantee))
                    .unwrap_or(true);
                if keep {
                    observed.insert(&grantee);
                }
            }
            None => tracing::warn!(
                granted_to = %row.granted_to,
                grantee = %row.grantee_name,
                "ignoring grant of database role to unsupported grantee kind"
            ),
        }
    }
    observed
}

#[async_trait]
impl Resource for DatabaseRoleGrantsResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = Self::schema_static().validate(&request.config);

        let config = &request.config;
        let roles = AttributePath::new("roles");
        let users = AttributePath::new("users");
        let unknown = |path: &AttributePath| matches!(config.get(path), Ok(Dynamic::Unknown));
        let no_grantees = !config.is_set(&roles) && !config.is_set(&users);
        if !has_errors(&diagnostics) && no_grantees && !unknown(&roles) && !unknown(&users) {
            diagnostics.push(Diagnostic::error(
                "No grantees",
                "At least one of roles or users must be set",
            ));
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn modify_plan(&self, _ctx: Context, request: ModifyPlanRequest) -> ModifyPlanResponse {
        let requires_replace =
            Self::schema_static().replacement_paths(&request.prior_state, &request.proposed_new_state);
        let mut planned_state = request.proposed_new_state;

        let changed = ["roles", "users"].iter().any(|name| {
            let path = AttributePath::new(name);
            let prior: BTreeSet<String> = request
                .prior_state
                .get_string_list(&path)
                .unwrap_or_default()
                .into_iter()
                .collect();
            match planned_state.get_string_list(&path) {
                Ok(planned) => prior != planned.into_iter().collect(),
                Err(_) => true,
            }
        });

        let mut diagnostics = vec![];
        if request.prior_state.is_null() || !requires_replace.is_empty() || changed {
            if let Err(e) = planned_state.mark_unknown(&AttributePath::new("id")) {
                diagnostics.push(Diagnostic::error("Failed to plan id", e.to_string()));
            }
        }

        ModifyPlanResponse {
            planned_state,
            requires_replace,
            diagnostics,
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let desired = match self.extract_grants(&request.config) {
            Ok(grants) => grants,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        tracing::info!(request_id = %ctx.request_id(), id = %desired, "granting database role");
        let mut current = DatabaseRoleGrants {
            database_name: desired.database_name.clone(),
            role_name: desired.role_name.clone(),
            ..Default::default()
        };
        if let Err(e) = self.converge(provider_data, &mut current, &desired).await {
            diagnostics.push(Diagnostic::error(
                "Failed to grant database role",
                format!("API error: {}", e),
            ));
        }

        let mut new_state = request.planned_state;
        if let Err(e) = set_grantees(&mut new_state, &current) {
            diagnostics.push(Diagnostic::error("Failed to set state", e.to_string()));
        }
        CreateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let stored = match request
            .current_state
            .get_string(&AttributePath::new("id"))
            .map_err(|e| e.to_string())
            .and_then(|id| id.parse::<DatabaseRoleGrants>())
        {
            Ok(stored) => stored,
            Err(e) => {
                diagnostics.push(Diagnostic::error("Invalid resource identifier", e));
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };
        let only_tracked = request
            .current_state
            .get_bool_or(&AttributePath::new("enable_multiple_grants"), false)
            .unwrap_or(false);

        let rows = match provider_data
            .client
            .grants()
            .show_grants_of_database_role(&stored.database_name, &stored.role_name)
            .await
        {
            Ok(rows) => rows,
            Err(e) if e.is_object_missing() => {
                tracing::info!(
                    request_id = %ctx.request_id(),
                    id = %stored,
                    "database role no longer exists, removing from state"
                );
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                };
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read database role grants",
                    format!("API error: {}", e),
                ));
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let observed = observed_grants(&stored, &rows, only_tracked.then_some(&stored));
        let mut new_state = request.current_state;
        if let Err(e) = set_grantees(&mut new_state, &observed) {
            diagnostics.push(Diagnostic::error("Failed to set state", e.to_string()));
        }
        ReadResourceResponse {
            new_state: Some(new_state),
            diagnostics,
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let (mut current, desired) = match self
            .extract_grants(&request.prior_state)
            .and_then(|prior| self.extract_grants(&request.config).map(|desired| (prior, desired)))
        {
            Ok(pair) => pair,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        tracing::info!(request_id = %ctx.request_id(), from = %current, to = %desired, "updating database role grants");
        let result = self.converge(provider_data, &mut current, &desired).await;

        let mut new_state = match result {
            Ok(()) => request.planned_state,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to update database role grants",
                    format!("API error: {}", e),
                ));
                request.prior_state
            }
        };
        if let Err(e) = set_grantees(&mut new_state, &current) {
            diagnostics.push(Diagnostic::error("Failed to set state", e.to_string()));
        }
        UpdateResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(not_configured());
                return DeleteResourceResponse { diagnostics };
            }
        };

        let mut current = match self.extract_grants(&request.prior_state) {
            Ok(grants) => grants,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        tracing::info!(request_id = %ctx.request_id(), id = %current, "revoking database role");
        let nothing = DatabaseRoleGrants {
            database_name: current.database_name.clone(),
            role_name: current.role_name.clone(),
            ..Default::default()
        };
        if let Err(e) = self.converge(provider_data, &mut current, &nothing).await {
            diagnostics.push(Diagnostic::error(
                "Failed to revoke database role",
                format!("API error: {}", e),
            ));
        }
        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let grants = match request.id.parse::<DatabaseRoleGrants>() {
            Ok(grants) => grants,
            Err(e) => {
                return ImportResourceStateResponse {
                    imported_resources: vec![],
                    diagnostics: vec![Diagnostic::error("Invalid import identifier", e)],
                }
            }
        };

        match imported_state(&grants) {
            Ok(state) => ImportResourceStateResponse {
                imported_resources: vec![ImportedResource {
                    type_name: request.type_name,
                    state,
                }],
                diagnostics: vec![],
            },
            Err(e) => ImportResourceStateResponse {
                imported_resources: vec![],
                diagnostics: vec![Diagnostic::error("Failed to build state", e.to_string())],
            },
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for DatabaseRoleGrantsResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];
        match SnowflakeProviderData::downcast(request.provider_data) {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureResourceResponse { diagnostics }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::test_helpers::{
        create_test_client, mock_statement, mock_statement_error, result_body, status_body,
    };
    use mockito::{Server, ServerGuard};
    use serde_json::json;
    use tfplug::types::ClientCapabilities;

    fn configured(server: &ServerGuard) -> DatabaseRoleGrantsResource {
        DatabaseRoleGrantsResource {
            provider_data: Some(SnowflakeProviderData::new(create_test_client(&server.url()))),
        }
    }

    fn state(roles: &[&str], users: &[&str]) -> DynamicValue {
        let grants = DatabaseRoleGrants {
            database_name: "DB1".to_string(),
            role_name: "R1".to_string(),
            roles: roles.iter().map(|s| s.to_string()).collect(),
            users: users.iter().map(|s| s.to_string()).collect(),
        };
        DynamicValue::from_json(json!({
            "id": grants.to_string(),
            "database_name": "DB1",
            "role_name": "R1",
            "roles": roles,
            "users": users,
        }))
    }

    #[test]
    fn id_round_trips() {
        let id = "DB1|R1|ANALYST,LOADER|ALICE";
        let grants: DatabaseRoleGrants = id.parse().unwrap();
        assert_eq!(grants.roles.len(), 2);
        assert_eq!(grants.users.len(), 1);
        assert_eq!(grants.to_string(), id);

        assert!("DB1|R1|ANALYST".parse::<DatabaseRoleGrants>().is_err());
        assert!("|R1||".parse::<DatabaseRoleGrants>().is_err());
    }

    #[tokio::test]
    async fn validate_requires_a_grantee() {
        let response = DatabaseRoleGrantsResource::new()
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: TYPE_NAME.to_string(),
                    config: DynamicValue::from_json(json!({
                        "database_name": "DB1", "role_name": "R1", "roles": []
                    })),
                    client_capabilities: ClientCapabilities::default(),
                },
            )
            .await;
        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "No grantees");
    }

    #[tokio::test]
    async fn delete_tolerates_dropped_grantee() {
        let mut server = Server::new_async().await;
        let _revoke = mock_statement_error(
            &mut server,
            "REVOKE DATABASE ROLE \"DB1\".\"R1\" FROM ROLE \"ROLE2\"",
            "002003",
            "Role 'ROLE2' does not exist or not authorized.",
        )
        .await;
        let _lookup = mock_statement(
            &mut server,
            "SHOW ROLES LIKE 'ROLE2'",
            result_body(&["name"], &[]),
        )
        .await;

        let response = configured(&server)
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    prior_state: state(&["ROLE2"], &[]),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    }

    #[tokio::test]
    async fn update_removes_then_adds() {
        let mut server = Server::new_async().await;
        let revoke = mock_statement(
            &mut server,
            "REVOKE DATABASE ROLE \"DB1\".\"R1\" FROM USER \"ALICE\"",
            status_body(),
        )
        .await;
        let grant = mock_statement(
            &mut server,
            "GRANT DATABASE ROLE \"DB1\".\"R1\" TO ROLE \"LOADER\"",
            status_body(),
        )
        .await;

        let config = state(&["ANALYST", "LOADER"], &[]);
        let response = configured(&server)
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    prior_state: state(&["ANALYST"], &["ALICE"]),
                    planned_state: config.clone(),
                    config,
                },
            )
            .await;

        revoke.assert_async().await;
        grant.assert_async().await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("id"))
                .unwrap(),
            "DB1|R1|ANALYST,LOADER|"
        );
    }

    #[tokio::test]
    async fn read_tracks_only_listed_grantees_when_multiple_grants_enabled() {
        let mut server = Server::new_async().await;
        let _show = mock_statement(
            &mut server,
            "SHOW GRANTS OF DATABASE ROLE \"DB1\".\"R1\"",
            result_body(
                &["created_on", "role", "granted_to", "grantee_name", "granted_by"],
                &[
                    &[Some("t"), Some("DB1.R1"), Some("ROLE"), Some("ANALYST"), Some("SYSADMIN")],
                    &[Some("t"), Some("DB1.R1"), Some("ROLE"), Some("OTHER"), Some("SYSADMIN")],
                    &[Some("t"), Some("DB1.R1"), Some("USER"), Some("ALICE"), Some("SYSADMIN")],
                ],
            ),
        )
        .await;

        let mut current = state(&["ANALYST"], &["ALICE"]);
        current
            .set_bool(&AttributePath::new("enable_multiple_grants"), true)
            .unwrap();
        let response = configured(&server)
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    current_state: current,
                    client_capabilities: ClientCapabilities::default(),
                },
            )
            .await;

        let new_state = response.new_state.unwrap();
        assert_eq!(
            new_state.get_string_list(&AttributePath::new("roles")).unwrap(),
            vec!["ANALYST".to_string()]
        );
        assert_eq!(
            new_state.get_string_list(&AttributePath::new("users")).unwrap(),
            vec!["ALICE".to_string()]
        );
    }

    #[tokio::test]
    async fn read_removes_state_for_missing_role() {
        let mut server = Server::new_async().await;
        let _show = mock_statement_error(
            &mut server,
            "SHOW GRANTS OF DATABASE ROLE \"DB1\".\"R1\"",
            "002003",
            "Database role 'DB1.R1' does not exist or not authorized.",
        )
        .await;

        let response = configured(&server)
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    current_state: state(&["ANALYST"], &[]),
                    client_capabilities: ClientCapabilities::default(),
                },
            )
            .await;
        assert!(response.new_state.is_none());
    }
}
