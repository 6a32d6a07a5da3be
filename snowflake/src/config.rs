//! Provider configuration
//!
//! Every attribute falls back to a `SNOWFLAKE_*` environment variable when it
//! is absent from the provider block.

use crate::api::{ClientConfig, TokenType};
use std::time::Duration;
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

pub const ACCOUNT_ENV: &str = "SNOWFLAKE_ACCOUNT";
pub const HOST_ENV: &str = "SNOWFLAKE_HOST";
pub const TOKEN_ENV: &str = "SNOWFLAKE_TOKEN";
pub const TOKEN_TYPE_ENV: &str = "SNOWFLAKE_TOKEN_TYPE";
pub const ROLE_ENV: &str = "SNOWFLAKE_ROLE";
pub const WAREHOUSE_ENV: &str = "SNOWFLAKE_WAREHOUSE";
pub const INSECURE_ENV: &str = "SNOWFLAKE_INSECURE";
pub const REQUEST_TIMEOUT_ENV: &str = "SNOWFLAKE_REQUEST_TIMEOUT";

#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub token: String,
    pub token_type: TokenType,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub insecure: bool,
    pub request_timeout: Option<Duration>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("role", &self.role)
            .field("warehouse", &self.warehouse)
            .field("insecure", &self.insecure)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Read the provider block, filling gaps from the environment.
    /// All problems are reported, not just the first.
    pub fn from_config(config: &DynamicValue) -> Result<Self, Vec<Diagnostic>> {
        let mut diagnostics = vec![];

        let account = string_setting(config, "account", ACCOUNT_ENV, &mut diagnostics);
        let host = string_setting(config, "host", HOST_ENV, &mut diagnostics);
        let token = string_setting(config, "token", TOKEN_ENV, &mut diagnostics);
        let token_type = string_setting(config, "token_type", TOKEN_TYPE_ENV, &mut diagnostics);
        let role = string_setting(config, "role", ROLE_ENV, &mut diagnostics);
        let warehouse = string_setting(config, "warehouse", WAREHOUSE_ENV, &mut diagnostics);
        let insecure = bool_setting(config, "insecure", INSECURE_ENV, &mut diagnostics);
        let request_timeout = timeout_setting(config, &mut diagnostics);

        let base_url = match (host, account) {
            (Some(host), _) => Some(host),
            (None, Some(account)) => Some(account_url(&account)),
            (None, None) => {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing Snowflake account",
                        format!(
                            "account is required (set in provider config or {} env var), \
                             unless host is set (or {})",
                            ACCOUNT_ENV, HOST_ENV
                        ),
                    )
                    .with_attribute(AttributePath::new("account")),
                );
                None
            }
        };

        if token.is_none() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing Snowflake token",
                    format!(
                        "token is required (set in provider config or {} env var)",
                        TOKEN_ENV
                    ),
                )
                .with_attribute(AttributePath::new("token")),
            );
        }

        let token_type = match token_type.as_deref().map(str::parse::<TokenType>) {
            None => TokenType::default(),
            Some(Ok(token_type)) => token_type,
            Some(Err(e)) => {
                diagnostics.push(
                    Diagnostic::error("Invalid token_type", e)
                        .with_attribute(AttributePath::new("token_type")),
                );
                TokenType::default()
            }
        };

        match (base_url, token) {
            (Some(base_url), Some(token)) if diagnostics.is_empty() => Ok(Self {
                base_url,
                token,
                token_type,
                role,
                warehouse,
                insecure,
                request_timeout,
            }),
            _ => Err(diagnostics),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.base_url.clone(), self.token.clone());
        config.token_type = self.token_type;
        config.role = self.role.clone();
        config.warehouse = self.warehouse.clone();
        config.insecure = self.insecure;
        config.request_timeout = self.request_timeout;
        config
    }
}

/// Account identifiers are case-insensitive; the host name is lowercase
pub fn account_url(account: &str) -> String {
    format!(
        "https://{}.snowflakecomputing.com",
        account.trim().to_ascii_lowercase()
    )
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn string_setting(
    config: &DynamicValue,
    name: &str,
    env: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    match config.get_optional_string(&AttributePath::new(name)) {
        Ok(Some(value)) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Ok(_) => env_value(env),
        Err(e) => {
            diagnostics.push(
                Diagnostic::error(format!("Invalid {}", name), e.to_string())
                    .with_attribute(AttributePath::new(name)),
            );
            None
        }
    }
}

fn bool_setting(
    config: &DynamicValue,
    name: &str,
    env: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let path = AttributePath::new(name);
    if config.is_set(&path) {
        return match config.get_bool(&path) {
            Ok(value) => value,
            Err(e) => {
                diagnostics.push(
                    Diagnostic::error(format!("Invalid {}", name), e.to_string())
                        .with_attribute(path),
                );
                false
            }
        };
    }

    match env_value(env) {
        None => false,
        Some(value) => match value.to_ascii_lowercase().parse::<bool>() {
            Ok(value) => value,
            Err(_) => {
                diagnostics.push(Diagnostic::error(
                    format!("Invalid {}", env),
                    format!("{} must be 'true' or 'false', found '{}'", env, value),
                ));
                false
            }
        },
    }
}

fn timeout_setting(config: &DynamicValue, diagnostics: &mut Vec<Diagnostic>) -> Option<Duration> {
    let path = AttributePath::new("request_timeout");
    let seconds = if config.is_set(&path) {
        match config.get_number(&path) {
            Ok(seconds) => Some(seconds),
            Err(e) => {
                diagnostics.push(
                    Diagnostic::error("Invalid request_timeout", e.to_string())
                        .with_attribute(path.clone()),
                );
                return None;
            }
        }
    } else {
        match env_value(REQUEST_TIMEOUT_ENV).map(|v| v.parse::<f64>()) {
            None => None,
            Some(Ok(seconds)) => Some(seconds),
            Some(Err(_)) => {
                diagnostics.push(Diagnostic::error(
                    format!("Invalid {}", REQUEST_TIMEOUT_ENV),
                    format!("{} must be a number of seconds", REQUEST_TIMEOUT_ENV),
                ));
                return None;
            }
        }
    };

    match seconds {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => {
            Some(Duration::from_secs_f64(seconds))
        }
        Some(_) => {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid request_timeout",
                    "request_timeout must be a positive number of seconds",
                )
                .with_attribute(path),
            );
            None
        }
        None => None,
    }
}
