//! Terraform provider core for Snowflake database roles and their grants

pub mod api;
pub mod config;
pub mod data_sources;
pub mod grants;
pub mod provider_data;
pub mod resources;

pub use provider_data::SnowflakeProviderData;

use async_trait::async_trait;
use config::ProviderConfig;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, ValidateProviderConfigRequest,
    ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, ServerCapabilities};

#[derive(Default)]
pub struct SnowflakeProvider;

impl SnowflakeProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Snowflake provider")
            .attribute(
                AttributeBuilder::new("account", AttributeType::String)
                    .description("Account identifier. Can also be set with SNOWFLAKE_ACCOUNT")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("host", AttributeType::String)
                    .description("Full base URL, overrides the URL derived from account. Can also be set with SNOWFLAKE_HOST")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("token", AttributeType::String)
                    .description("Bearer token for the SQL API. Can also be set with SNOWFLAKE_TOKEN")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("token_type", AttributeType::String)
                    .description("OAUTH, KEYPAIR_JWT or PROGRAMMATIC_ACCESS_TOKEN")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("role", AttributeType::String)
                    .description("Role the session runs statements as")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("warehouse", AttributeType::String)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .description("Skip TLS certificate verification")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("request_timeout", AttributeType::Number)
                    .description("Per-request timeout in seconds")
                    .optional()
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl Provider for SnowflakeProvider {
    fn type_name(&self) -> &str {
        "snowflake"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            server_capabilities: ServerCapabilities::default(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        ValidateProviderConfigResponse {
            diagnostics: Self::schema_static().validate(&request.config),
        }
    }

    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        tfplug::logging::init_from_env();

        let config = match ProviderConfig::from_config(&request.config) {
            Ok(config) => config,
            Err(diagnostics) => {
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };
        tracing::debug!(request_id = %ctx.request_id(), config = ?config, "configuring provider");

        match SnowflakeProviderData::from_config(&config) {
            Ok(data) => ConfigureProviderResponse {
                diagnostics: vec![],
                provider_data: Some(Arc::new(data) as Arc<dyn Any + Send + Sync>),
            },
            Err(e) => ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                )],
                provider_data: None,
            },
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "snowflake_database_role".to_string(),
            Box::new(|| {
                Box::new(resources::DatabaseRoleResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "snowflake_database_role_grants".to_string(),
            Box::new(|| {
                Box::new(resources::DatabaseRoleGrantsResource::new())
                    as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "snowflake_grant_privileges_to_database_role".to_string(),
            Box::new(|| {
                Box::new(resources::GrantPrivilegesToDatabaseRoleResource::new())
                    as Box<dyn ResourceWithConfigure>
            }),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            "snowflake_current_role".to_string(),
            Box::new(|| {
                Box::new(data_sources::CurrentRoleDataSource::new())
                    as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories
    }
}
