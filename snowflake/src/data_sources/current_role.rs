//! Current role data source

use crate::provider_data::{not_configured, SnowflakeProviderData};
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

const TYPE_NAME: &str = "snowflake_current_role";

#[derive(Default)]
pub struct CurrentRoleDataSource {
    provider_data: Option<SnowflakeProviderData>,
}

impl CurrentRoleDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Primary role of the provider's Snowflake session")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Name of the active role, null when none is set")
                    .computed()
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl DataSource for CurrentRoleDataSource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => return ReadDataSourceResponse::failed(not_configured()),
        };

        let mut diagnostics = vec![];

        let mut state = DynamicValue::object();
        let role = match provider_data.client.principals().current_role().await {
            Ok(role) => role,
            Err(e) => {
                tracing::warn!(request_id = %ctx.request_id(), error = %e, "could not determine current role");
                diagnostics.push(Diagnostic::warning(
                    "Could not determine current role",
                    format!("API error: {}", e),
                ));
                None
            }
        };

        let written = state
            .set_string(&AttributePath::new("id"), role.clone().unwrap_or_default())
            .and_then(|_| match role {
                Some(role) => state.set_string(&AttributePath::new("name"), role),
                None => state.set_null(&AttributePath::new("name")),
            });
        if let Err(e) = written {
            diagnostics.push(Diagnostic::error("Failed to set state", e.to_string()));
        }

        ReadDataSourceResponse { state, diagnostics }
    }
}

#[async_trait]
impl DataSourceWithConfigure for CurrentRoleDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];
        match SnowflakeProviderData::downcast(request.provider_data) {
            Ok(data) => self.provider_data = Some(data),
            Err(diag) => diagnostics.push(diag),
        }
        ConfigureDataSourceResponse { diagnostics }
    }
}
