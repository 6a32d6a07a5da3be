//! Privileges granted to a database role
//!
//! The grant is identified by its [`GrantIdentity`], stored as the resource
//! id. Only `privileges` changes in place; everything else replaces the
//! resource. Reads report only privileges the identity itself granted, so
//! grants made outside Terraform never show up as drift.

use crate::api::grants::ReadOutcome;
use crate::grants::{
    diff, BulkOptions, ConfigurationError, GrantIdentity, GrantTarget, GrantTargetOptions,
    OnSchemaObjectOptions, OnSchemaOptions, PrivilegeDelta, PrivilegeSet,
};
use crate::provider_data::{not_configured, SnowflakeProviderData};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
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
use tfplug::schema::{
    AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder, Schema, SchemaBuilder,
};
use tfplug::types::{has_errors, AttributePath, Diagnostic, Dynamic, DynamicValue};

const TYPE_NAME: &str = "snowflake_grant_privileges_to_database_role";

#[derive(Default)]
pub struct GrantPrivilegesToDatabaseRoleResource {
    provider_data: Option<SnowflakeProviderData>,
}

impl GrantPrivilegesToDatabaseRoleResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Grants privileges on a database, schema or schema objects to a database role")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Encoded grant identity")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("role_name", AttributeType::String)
                    .description("Database role receiving the privileges")
                    .required()
                    .requires_replace()
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
                AttributeBuilder::new("privileges", AttributeType::Set(Box::new(AttributeType::String)))
                    .description("Privileges to grant. Not allowed together with all_privileges")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("all_privileges", AttributeType::Bool)
                    .description("Grant ALL PRIVILEGES. Not allowed with privileges or on_database")
                    .optional()
                    .requires_replace()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("with_grant_option", AttributeType::Bool)
                    .description("Allow the role to grant the privileges to others")
                    .optional()
                    .requires_replace()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("on_database", AttributeType::Bool)
                    .description("Grant on the database itself")
                    .optional()
                    .requires_replace()
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("on_schema")
                    .description("Grant on a schema, all schemas or future schemas of the database")
                    .max_items(1)
                    .requires_replace()
                    .attribute(
                        AttributeBuilder::new("schema_name", AttributeType::String)
                            .description("Schema name, relative to database_name or fully qualified")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("all_schemas", AttributeType::Bool)
                            .description("Grant on every existing schema in the database")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("future_schemas", AttributeType::Bool)
                            .description("Grant on schemas created later in the database")
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("on_schema_object")
                    .description("Grant on one schema object, all objects of a type or future objects of a type")
                    .max_items(1)
                    .requires_replace()
                    .attribute(
                        AttributeBuilder::new("object_type", AttributeType::String)
                            .description("Object type, e.g. TABLE or MATERIALIZED VIEW")
                            .optional()
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("object_name", AttributeType::String)
                            .description("Object name as schema.object or database.schema.object")
                            .optional()
                            .build(),
                    )
                    .block(bulk_block("all", "Grant on all existing objects of a type"))
                    .block(bulk_block("future", "Grant on objects of a type created later"))
                    .build(),
            )
            .build()
    }

    /// Build the grant identity from configuration
    fn extract_identity(&self, config: &DynamicValue) -> Result<GrantIdentity, Diagnostic> {
        let role_name = required_string(config, "role_name")?;
        let database_name = required_string(config, "database_name")?;

        let options = target_options(config)
            .map_err(|e| Diagnostic::error("Invalid grant target", e.to_string()))?;
        let target = GrantTarget::resolve(&options).map_err(configuration_diagnostic)?;

        let privileges = config
            .get_string_list(&AttributePath::new("privileges"))
            .map_err(|e| {
                Diagnostic::error("Invalid privileges", e.to_string())
                    .with_attribute(AttributePath::new("privileges"))
            })?;
        let all_privileges = config
            .get_bool_or(&AttributePath::new("all_privileges"), false)
            .map_err(|e| Diagnostic::error("Invalid all_privileges", e.to_string()))?;
        let with_grant_option = config
            .get_bool_or(&AttributePath::new("with_grant_option"), false)
            .map_err(|e| Diagnostic::error("Invalid with_grant_option", e.to_string()))?;

        let privileges = PrivilegeSet::resolve(&privileges, all_privileges, &target)
            .map_err(configuration_diagnostic)?;

        GrantIdentity::new(
            role_name,
            database_name,
            privileges,
            with_grant_option,
            target,
        )
        .map_err(configuration_diagnostic)
    }

    /// Read the grant back after create or update. Privileges that cannot be
    /// confirmed are reported as a warning and left to the next refresh.
    async fn confirm(
        &self,
        provider_data: &SnowflakeProviderData,
        identity: &GrantIdentity,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let outcome = provider_data
            .client
            .grants()
            .read_privileges(identity)
            .await;
        let missing: Vec<String> = match outcome {
            Ok(ReadOutcome::Observed(observed)) => identity
                .privileges
                .names()
                .difference(&observed)
                .cloned()
                .collect(),
            Ok(ReadOutcome::Unobservable) => return,
            Ok(ReadOutcome::RoleMissing) | Ok(ReadOutcome::TargetMissing) => {
                identity.privileges.names().into_iter().collect()
            }
            Err(e) => {
                tracing::warn!(id = %identity, "failed to read back grant: {}", e);
                diagnostics.push(Diagnostic::warning(
                    "Could not read back grant",
                    format!("API error: {}", e),
                ));
                return;
            }
        };

        if !missing.is_empty() {
            diagnostics.push(Diagnostic::warning(
                "Privileges not confirmed",
                format!(
                    "SHOW GRANTS did not list {} for database role {}.{}",
                    missing.join(", "),
                    identity.database_name,
                    identity.role_name
                ),
            ));
        }
    }
}

fn bulk_block(name: &str, description: &str) -> NestedBlock {
    NestedBlockBuilder::new(name)
        .description(description)
        .max_items(1)
        .attribute(
            AttributeBuilder::new("object_type_plural", AttributeType::String)
                .description("Plural object type, e.g. TABLES or MATERIALIZED VIEWS")
                .required()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("in_database", AttributeType::Bool)
                .description("Objects anywhere in the database")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("in_schema", AttributeType::String)
                .description("Objects in this schema, relative to database_name or fully qualified")
                .optional()
                .build(),
        )
        .build()
}

fn required_string(config: &DynamicValue, name: &str) -> Result<String, Diagnostic> {
    config.get_string(&AttributePath::new(name)).map_err(|_| {
        Diagnostic::error(
            format!("Missing {}", name),
            format!("The '{}' attribute is required", name),
        )
        .with_attribute(AttributePath::new(name))
    })
}

fn target_options(config: &DynamicValue) -> tfplug::Result<GrantTargetOptions> {
    let on_database = config.get_bool_or(&AttributePath::new("on_database"), false)?;
    let on_schema = match config.get_block(&AttributePath::new("on_schema"))? {
        Some(block) => Some(OnSchemaOptions {
            schema_name: block.get_optional_string(&AttributePath::new("schema_name"))?,
            all_schemas: block.get_bool_or(&AttributePath::new("all_schemas"), false)?,
            future_schemas: block.get_bool_or(&AttributePath::new("future_schemas"), false)?,
        }),
        None => None,
    };
    let on_schema_object = match config.get_block(&AttributePath::new("on_schema_object"))? {
        Some(block) => Some(OnSchemaObjectOptions {
            object_type: block.get_optional_string(&AttributePath::new("object_type"))?,
            object_name: block.get_optional_string(&AttributePath::new("object_name"))?,
            all: bulk_options(&block, "all")?,
            future: bulk_options(&block, "future")?,
        }),
        None => None,
    };

    Ok(GrantTargetOptions {
        on_database,
        on_schema,
        on_schema_object,
    })
}

fn bulk_options(block: &DynamicValue, name: &str) -> tfplug::Result<Option<BulkOptions>> {
    let bulk = match block.get_block(&AttributePath::new(name))? {
        Some(bulk) => bulk,
        None => return Ok(None),
    };
    Ok(Some(BulkOptions {
        object_type_plural: bulk
            .get_optional_string(&AttributePath::new("object_type_plural"))?
            .unwrap_or_default(),
        in_database: bulk.get_bool_or(&AttributePath::new("in_database"), false)?,
        in_schema: bulk.get_optional_string(&AttributePath::new("in_schema"))?,
    }))
}

fn configuration_diagnostic(err: ConfigurationError) -> Diagnostic {
    let attribute = match &err {
        ConfigurationError::PrivilegesConflict
        | ConfigurationError::NoPrivileges
        | ConfigurationError::InvalidPrivilege(_) => Some("privileges"),
        ConfigurationError::AllPrivilegesOnDatabase => Some("all_privileges"),
        ConfigurationError::MissingValue(field) => Some(*field),
        _ => None,
    };
    let diagnostic = Diagnostic::error("Invalid grant configuration", err.to_string());
    match attribute {
        Some(name) => diagnostic.with_attribute(AttributePath::new(name)),
        None => diagnostic,
    }
}

fn contains_unknown(value: &Dynamic) -> bool {
    match value {
        Dynamic::Unknown => true,
        Dynamic::List(items) => items.iter().any(contains_unknown),
        Dynamic::Map(entries) => entries.values().any(contains_unknown),
        _ => false,
    }
}

fn decode_identity(state: &DynamicValue) -> Result<GrantIdentity, Diagnostic> {
    let id = state
        .get_string(&AttributePath::new("id"))
        .map_err(|_| Diagnostic::error("Missing id", "The resource state has no id"))?;
    id.parse::<GrantIdentity>().map_err(|e| {
        Diagnostic::error(
            "Invalid resource identifier",
            format!("Failed to decode grant id '{}': {}", id, e),
        )
    })
}

/// Privileges last recorded in state. An empty list is kept as is so that
/// privileges revoked outside Terraform are granted again.
fn state_privileges(state: &DynamicValue, identity: &GrantIdentity) -> BTreeSet<String> {
    let path = AttributePath::new("privileges");
    match state.get(&path) {
        Ok(Dynamic::List(_)) => state
            .get_string_list(&path)
            .map(|list| list.into_iter().collect())
            .unwrap_or_else(|_| identity.privileges.names()),
        _ => identity.privileges.names(),
    }
}

fn set_applied(state: &mut DynamicValue, identity: &GrantIdentity) -> tfplug::Result<()> {
    state.set_string(&AttributePath::new("id"), identity.to_string())?;
    if let PrivilegeSet::Named(names) = &identity.privileges {
        state.set_string_list(&AttributePath::new("privileges"), names.iter().cloned())?;
    }
    Ok(())
}

fn optional_string(value: &Option<String>) -> Dynamic {
    value
        .as_ref()
        .map(|v| Dynamic::String(v.clone()))
        .unwrap_or(Dynamic::Null)
}

fn bulk_value(options: &Option<BulkOptions>) -> Dynamic {
    let items = options
        .iter()
        .map(|bulk| {
            Dynamic::Map(HashMap::from([
                (
                    "object_type_plural".to_string(),
                    Dynamic::String(bulk.object_type_plural.clone()),
                ),
                ("in_database".to_string(), Dynamic::Bool(bulk.in_database)),
                ("in_schema".to_string(), optional_string(&bulk.in_schema)),
            ]))
        })
        .collect();
    Dynamic::List(items)
}

/// Full state for an identity, as produced by import
fn state_from_identity(identity: &GrantIdentity) -> tfplug::Result<DynamicValue> {
    let mut state = DynamicValue::object();
    state.set_string(&AttributePath::new("id"), identity.to_string())?;
    state.set_string(&AttributePath::new("role_name"), identity.role_name.clone())?;
    state.set_string(
        &AttributePath::new("database_name"),
        identity.database_name.clone(),
    )?;
    state.set_bool(
        &AttributePath::new("with_grant_option"),
        identity.with_grant_option,
    )?;

    match &identity.privileges {
        PrivilegeSet::All => {
            state.set_null(&AttributePath::new("privileges"))?;
            state.set_bool(&AttributePath::new("all_privileges"), true)?;
        }
        PrivilegeSet::Named(names) => {
            state.set_string_list(&AttributePath::new("privileges"), names.iter().cloned())?;
            state.set_bool(&AttributePath::new("all_privileges"), false)?;
        }
    }

    let options = identity.target.to_options();
    state.set_bool(&AttributePath::new("on_database"), options.on_database)?;

    let on_schema = options
        .on_schema
        .iter()
        .map(|schema| {
            Dynamic::Map(HashMap::from([
                ("schema_name".to_string(), optional_string(&schema.schema_name)),
                ("all_schemas".to_string(), Dynamic::Bool(schema.all_schemas)),
                (
                    "future_schemas".to_string(),
                    Dynamic::Bool(schema.future_schemas),
                ),
            ]))
        })
        .collect();
    state.set_list(&AttributePath::new("on_schema"), on_schema)?;

    let on_schema_object = options
        .on_schema_object
        .iter()
        .map(|object| {
            Dynamic::Map(HashMap::from([
                ("object_type".to_string(), optional_string(&object.object_type)),
                ("object_name".to_string(), optional_string(&object.object_name)),
                ("all".to_string(), bulk_value(&object.all)),
                ("future".to_string(), bulk_value(&object.future)),
            ]))
        })
        .collect();
    state.set_list(&AttributePath::new("on_schema_object"), on_schema_object)?;

    Ok(state)
}

#[async_trait]
impl Resource for GrantPrivilegesToDatabaseRoleResource {
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

        // Values computed by other resources are checked again at apply time
        if !has_errors(&diagnostics) && !contains_unknown(&request.config.value) {
            if let Err(diag) = self.extract_identity(&request.config) {
                diagnostics.push(diag);
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn modify_plan(&self, _ctx: Context, request: ModifyPlanRequest) -> ModifyPlanResponse {
        let requires_replace =
            Self::schema_static().replacement_paths(&request.prior_state, &request.proposed_new_state);
        let mut planned_state = request.proposed_new_state;

        let privileges = AttributePath::new("privileges");
        let privileges_changed = match (
            request.prior_state.get_string_list(&privileges),
            planned_state.get(&privileges),
        ) {
            (_, Ok(Dynamic::Unknown)) => true,
            (Ok(prior), _) => {
                let proposed: BTreeSet<String> = planned_state
                    .get_string_list(&privileges)
                    .unwrap_or_default()
                    .into_iter()
                    .collect();
                prior.into_iter().collect::<BTreeSet<_>>() != proposed
            }
            (Err(_), _) => true,
        };

        let mut diagnostics = vec![];
        if request.prior_state.is_null() || !requires_replace.is_empty() || privileges_changed {
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

        let identity = match self.extract_identity(&request.config) {
            Ok(identity) => identity,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        tracing::info!(request_id = %ctx.request_id(), id = %identity, "granting privileges to database role");
        if let Err(e) = provider_data.client.grants().grant(&identity).await {
            diagnostics.push(Diagnostic::error(
                "Failed to grant privileges",
                format!("API error: {}", e),
            ));
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }

        let mut new_state = request.planned_state;
        if let Err(e) = set_applied(&mut new_state, &identity) {
            diagnostics.push(Diagnostic::error("Failed to set state", e.to_string()));
        }
        self.confirm(provider_data, &identity, &mut diagnostics).await;

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

        let identity = match decode_identity(&request.current_state) {
            Ok(identity) => identity,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        match provider_data
            .client
            .grants()
            .read_privileges(&identity)
            .await
        {
            Ok(ReadOutcome::Observed(observed)) => {
                let mut new_state = request.current_state;
                if let Err(e) =
                    new_state.set_string_list(&AttributePath::new("privileges"), observed)
                {
                    diagnostics.push(Diagnostic::error("Failed to set state", e.to_string()));
                }
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics,
                }
            }
            Ok(ReadOutcome::Unobservable) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics,
            },
            Ok(outcome @ (ReadOutcome::RoleMissing | ReadOutcome::TargetMissing)) => {
                tracing::info!(
                    request_id = %ctx.request_id(),
                    id = %identity,
                    ?outcome,
                    "grant no longer exists, removing from state"
                );
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read grants",
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

        let identities = decode_identity(&request.prior_state)
            .and_then(|prior| self.extract_identity(&request.config).map(|desired| (prior, desired)));
        let (prior, desired) = match identities {
            Ok(identities) => identities,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let old_privileges = state_privileges(&request.prior_state, &prior);
        let delta = match (&prior.privileges, &desired.privileges) {
            (PrivilegeSet::Named(_), PrivilegeSet::Named(new)) => diff(&old_privileges, new),
            (PrivilegeSet::All, PrivilegeSet::All) => PrivilegeDelta::default(),
            _ => {
                diagnostics.push(Diagnostic::error(
                    "Cannot change all_privileges in place",
                    "Switching between all_privileges and privileges requires replacing the grant",
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        tracing::info!(
            request_id = %ctx.request_id(),
            id = %prior,
            to_add = ?delta.to_add,
            to_remove = ?delta.to_remove,
            "updating privileges of database role"
        );

        let grants = provider_data.client.grants();
        if let Err(e) = grants
            .revoke(&prior.with_privileges(PrivilegeSet::Named(delta.to_remove.clone())))
            .await
        {
            diagnostics.push(Diagnostic::error(
                "Failed to revoke privileges",
                format!("API error: {}", e),
            ));
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        }

        if let Err(e) = grants
            .grant(&desired.with_privileges(PrivilegeSet::Named(delta.to_add.clone())))
            .await
        {
            diagnostics.push(Diagnostic::error(
                "Failed to grant privileges",
                format!("API error: {}", e),
            ));
            // The revokes already happened
            let remaining: BTreeSet<String> =
                old_privileges.difference(&delta.to_remove).cloned().collect();
            let mut new_state = request.prior_state;
            if let Err(e) = set_applied(
                &mut new_state,
                &prior.with_privileges(PrivilegeSet::Named(remaining)),
            ) {
                diagnostics.push(Diagnostic::error("Failed to set state", e.to_string()));
            }
            return UpdateResourceResponse {
                new_state,
                diagnostics,
            };
        }

        let mut new_state = request.planned_state;
        if let Err(e) = set_applied(&mut new_state, &desired) {
            diagnostics.push(Diagnostic::error("Failed to set state", e.to_string()));
        }
        if !delta.is_empty() {
            self.confirm(provider_data, &desired, &mut diagnostics).await;
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

        let identity = match decode_identity(&request.prior_state) {
            Ok(identity) => identity,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        tracing::info!(request_id = %ctx.request_id(), id = %identity, "revoking privileges from database role");
        if let Err(e) = provider_data.client.grants().revoke(&identity).await {
            diagnostics.push(Diagnostic::error(
                "Failed to revoke privileges",
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
        let state = request
            .id
            .parse::<GrantIdentity>()
            .map_err(|e| {
                Diagnostic::error(
                    "Invalid import identifier",
                    format!(
                        "{}. Expected role|database|privileges|all_privileges|with_grant_option|\
                         on_database|on_schema|on_schema_object|all|future|object_type|\
                         object_name|object_type_plural|in_schema|schema_name",
                        e
                    ),
                )
            })
            .and_then(|identity| {
                state_from_identity(&identity)
                    .map_err(|e| Diagnostic::error("Failed to build state", e.to_string()))
            });

        match state {
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
impl ResourceWithConfigure for GrantPrivilegesToDatabaseRoleResource {
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
