//! Database role resource

use crate::api::database_roles::DatabaseRole;
use crate::provider_data::{not_configured, SnowflakeProviderData};
use async_trait::async_trait;
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
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

const TYPE_NAME: &str = "snowflake_database_role";

#[derive(Debug, Clone, PartialEq, Eq)]
struct DatabaseRoleConfig {
    database: String,
    name: String,
    comment: Option<String>,
}

impl DatabaseRoleConfig {
    fn id(&self) -> String {
        format!("{}|{}", self.database, self.name)
    }
}

fn parse_id(id: &str) -> Result<(String, String), Diagnostic> {
    match id.split('|').collect::<Vec<_>>().as_slice() {
        [database, name] if !database.is_empty() && !name.is_empty() => {
            Ok((database.to_string(), name.to_string()))
        }
        _ => Err(Diagnostic::error(
            "Invalid resource identifier",
            format!("expected database|name, found '{}'", id),
        )),
    }
}

#[derive(Default)]
pub struct DatabaseRoleResource {
    provider_data: Option<SnowflakeProviderData>,
}

impl DatabaseRoleResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a database role")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("database", AttributeType::String)
                    .description("Database the role is created in")
                    .required()
                    .requires_replace()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Role name. Changing it renames the role")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("comment", AttributeType::String)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("owner", AttributeType::String)
                    .description("Role that owns the database role")
                    .computed()
                    .build(),
            )
            .build()
    }

    fn extract_role_config(&self, config: &DynamicValue) -> Result<DatabaseRoleConfig, Diagnostic> {
        let database = config
            .get_string(&AttributePath::new("database"))
            .map_err(|_| Diagnostic::error("Missing database", "The 'database' attribute is required"))?;
        let name = config
            .get_string(&AttributePath::new("name"))
            .map_err(|_| Diagnostic::error("Missing name", "The 'name' attribute is required"))?;
        let comment = config
            .get_optional_string(&AttributePath::new("comment"))
            .map_err(|e| Diagnostic::error("Invalid comment", e.to_string()))?;

        if database.contains('|') || name.contains('|') {
            return Err(Diagnostic::error(
                "Invalid name",
                "database and name must not contain '|'",
            ));
        }
        Ok(DatabaseRoleConfig {
            database,
            name,
            comment,
        })
    }
}

fn apply_role(
    state: &mut DynamicValue,
    database: &str,
    role: &DatabaseRole,
) -> tfplug::Result<()> {
    state.set_string(&AttributePath::new("id"), format!("{}|{}", database, role.name))?;
    state.set_string(&AttributePath::new("database"), database.to_string())?;
    state.set_string(&AttributePath::new("name"), role.name.clone())?;
    match &role.comment {
        Some(comment) => state.set_string(&AttributePath::new("comment"), comment.clone())?,
        None => state.set_null(&AttributePath::new("comment"))?,
    }
    state.set_string(&AttributePath::new("owner"), role.owner.clone())
}

#[async_trait]
impl Resource for DatabaseRoleResource {
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
        ValidateResourceConfigResponse {
            diagnostics: Self::schema_static().validate(&request.config),
        }
    }

    async fn modify_plan(&self, _ctx: Context, request: ModifyPlanRequest) -> ModifyPlanResponse {
        let requires_replace =
            Self::schema_static().replacement_paths(&request.prior_state, &request.proposed_new_state);
        let mut planned_state = request.proposed_new_state;
        let mut diagnostics = vec![];

        let name = AttributePath::new("name");
        let renamed = request.prior_state.get_string(&name).ok() != planned_state.get_string(&name).ok();
        if request.prior_state.is_null() || renamed {
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

        let role_config = match self.extract_role_config(&request.config) {
            Ok(config) => config,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        tracing::info!(request_id = %ctx.request_id(), id = %role_config.id(), "creating database role");
        let roles = provider_data.client.database_roles();
        if let Err(e) = roles
            .create(
                &role_config.database,
                &role_config.name,
                role_config.comment.as_deref(),
            )
            .await
        {
            diagnostics.push(Diagnostic::error(
                "Failed to create database role",
                format!("API error: {}", e),
            ));
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }

        let mut new_state = request.planned_state;
        let owner = match roles.show(&role_config.database, &role_config.name).await {
            Ok(Some(role)) => role.owner,
            Ok(None) => String::new(),
            Err(e) => {
                diagnostics.push(Diagnostic::warning(
                    "Could not read back database role",
                    format!("API error: {}", e),
                ));
                String::new()
            }
        };
        let role = DatabaseRole {
            name: role_config.name.clone(),
            comment: role_config.comment.clone(),
            owner,
        };
        if let Err(e) = apply_role(&mut new_state, &role_config.database, &role) {
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

        let (database, name) = match request
            .current_state
            .get_string(&AttributePath::new("id"))
            .map_err(|_| Diagnostic::error("Missing id", "The resource state has no id"))
            .and_then(|id| parse_id(&id))
        {
            Ok(parts) => parts,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        match provider_data.client.database_roles().show(&database, &name).await {
            Ok(Some(role)) => {
                let mut new_state = request.current_state;
                if let Err(e) = apply_role(&mut new_state, &database, &role) {
                    diagnostics.push(Diagnostic::error("Failed to set state", e.to_string()));
                }
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Ok(None) => {
                tracing::info!(request_id = %ctx.request_id(), database = %database, name = %name, "database role no longer exists, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) if e.is_object_missing() => ReadResourceResponse {
                new_state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read database role",
                    format!("API error: {}", e),
                ));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
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

        let (prior, desired) = match self
            .extract_role_config(&request.prior_state)
            .and_then(|prior| self.extract_role_config(&request.config).map(|desired| (prior, desired)))
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

        let roles = provider_data.client.database_roles();
        let mut new_state = request.prior_state.clone();

        if prior.name != desired.name {
            tracing::info!(request_id = %ctx.request_id(), from = %prior.id(), to = %desired.id(), "renaming database role");
            if let Err(e) = roles.rename(&prior.database, &prior.name, &desired.name).await {
                diagnostics.push(Diagnostic::error(
                    "Failed to rename database role",
                    format!("API error: {}", e),
                ));
                return UpdateResourceResponse {
                    new_state,
                    diagnostics,
                };
            }
            let renamed = new_state
                .set_string(&AttributePath::new("name"), desired.name.clone())
                .and_then(|_| new_state.set_string(&AttributePath::new("id"), desired.id()));
            if let Err(e) = renamed {
                diagnostics.push(Diagnostic::error("Failed to set state", e.to_string()));
            }
        }

        if prior.comment != desired.comment {
            let result = match &desired.comment {
                Some(comment) => roles.set_comment(&desired.database, &desired.name, comment).await,
                None => roles.unset_comment(&desired.database, &desired.name).await,
            };
            if let Err(e) = result {
                diagnostics.push(Diagnostic::error(
                    "Failed to update database role comment",
                    format!("API error: {}", e),
                ));
                return UpdateResourceResponse {
                    new_state,
                    diagnostics,
                };
            }
        }

        let mut new_state = request.planned_state;
        let owner = request
            .prior_state
            .get_optional_string(&AttributePath::new("owner"))
            .ok()
            .flatten()
            .unwrap_or_default();
        let role = DatabaseRole {
            name: desired.name.clone(),
            comment: desired.comment.clone(),
            owner,
        };
        if let Err(e) = apply_role(&mut new_state, &desired.database, &role) {
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

        let role_config = match self.extract_role_config(&request.prior_state) {
            Ok(config) => config,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        tracing::info!(request_id = %ctx.request_id(), id = %role_config.id(), "dropping database role");
        if let Err(e) = provider_data
            .client
            .database_roles()
            .drop(&role_config.database, &role_config.name)
            .await
        {
            diagnostics.push(Diagnostic::error(
                "Failed to drop database role",
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
        let imported = parse_id(&request.id).and_then(|(database, name)| {
            let mut state = DynamicValue::object();
            state
                .set_string(&AttributePath::new("id"), request.id.clone())
                .and_then(|_| state.set_string(&AttributePath::new("database"), database))
                .and_then(|_| state.set_string(&AttributePath::new("name"), name))
                .map(|_| state)
                .map_err(|e| Diagnostic::error("Failed to build state", e.to_string()))
        });

        // Comment and owner are filled in by the read that follows import
        match imported {
            Ok(state) => ImportResourceStateResponse {
                imported_resources: vec![ImportedResource {
                    type_name: request.type_name,
                    state,
                }],
                diagnostics: vec![],
            },
            Err(diag) => ImportResourceStateResponse {
                imported_resources: vec![],
                diagnostics: vec![diag],
            },
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for DatabaseRoleResource {
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
