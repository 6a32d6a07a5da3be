//! Provider data structure passed to resources and data sources

use crate::api::Client;
use crate::config::ProviderConfig;
use std::any::Any;
use std::sync::Arc;
use tfplug::types::Diagnostic;

#[derive(Clone)]
pub struct SnowflakeProviderData {
    pub client: Arc<Client>,
}

impl SnowflakeProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, crate::api::ApiError> {
        Client::new(config.client_config()).map(Self::new)
    }

    /// Recover provider data handed to a resource or data source at configure time
    pub fn downcast(provider_data: Option<Arc<dyn Any + Send + Sync>>) -> Result<Self, Diagnostic> {
        match provider_data {
            Some(data) => data
                .downcast_ref::<SnowflakeProviderData>()
                .cloned()
                .ok_or_else(|| {
                    Diagnostic::error(
                        "Invalid provider data",
                        "Failed to extract SnowflakeProviderData from provider data",
                    )
                }),
            None => Err(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            )),
        }
    }
}

pub(crate) fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}
