use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::error::ApiError;
use super::response::{QueryResult, StatementError, StatementResponse};

const STATEMENTS_PATH: &str = "/api/v2/statements";
const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";
const CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// How the bearer token was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenType {
    #[default]
    OAuth,
    KeypairJwt,
    ProgrammaticAccessToken,
}

impl TokenType {
    pub fn as_header_value(&self) -> &'static str {
        match self {
            TokenType::OAuth => "OAUTH",
            TokenType::KeypairJwt => "KEYPAIR_JWT",
            TokenType::ProgrammaticAccessToken => "PROGRAMMATIC_ACCESS_TOKEN",
        }
    }
}

impl FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OAUTH" => Ok(TokenType::OAuth),
            "KEYPAIR_JWT" | "JWT" => Ok(TokenType::KeypairJwt),
            "PROGRAMMATIC_ACCESS_TOKEN" | "PAT" => Ok(TokenType::ProgrammaticAccessToken),
            other => Err(format!(
                "unknown token type '{}', expected OAUTH, KEYPAIR_JWT or PROGRAMMATIC_ACCESS_TOKEN",
                other
            )),
        }
    }
}

/// Connection settings for the SQL API
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    pub token_type: TokenType,
    /// Session role statements run as
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub insecure: bool,
    /// Client-side HTTP timeout; None leaves requests unbounded
    pub request_timeout: Option<Duration>,
    /// Delay between status checks of an asynchronously executing statement
    pub poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            token_type: TokenType::default(),
            role: None,
            warehouse: None,
            insecure: false,
            request_timeout: None,
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
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

/// Snowflake SQL API client. Each call runs exactly one statement.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    auth_header: String,
    token_type: TokenType,
    role: Option<String>,
    warehouse: Option<String>,
    poll_interval: Duration,
}

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", config.base_url, e)))?;
        if config.token.is_empty() {
            return Err(ApiError::AuthError);
        }

        let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(config.insecure);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header: format!("Bearer {}", config.token),
                token_type: config.token_type,
                role: config.role,
                warehouse: config.warehouse,
                poll_interval: config.poll_interval,
            }),
        })
    }

    /// Grant and revoke operations
    pub fn grants(&self) -> crate::api::grants::GrantsApi<'_> {
        crate::api::grants::GrantsApi::new(self)
    }

    /// Database role lifecycle operations
    pub fn database_roles(&self) -> crate::api::database_roles::DatabaseRolesApi<'_> {
        crate::api::database_roles::DatabaseRolesApi::new(self)
    }

    /// Account role and user lookups
    pub fn principals(&self) -> crate::api::principals::PrincipalsApi<'_> {
        crate::api::principals::PrincipalsApi::new(self)
    }

    /// Run one statement and collect every partition of its result set.
    ///
    /// A 202 answer means Snowflake is still executing; the handle is
    /// polled until the statement finishes. Failed statements are never
    /// resubmitted.
    pub async fn execute(&self, statement: &str) -> Result<QueryResult, ApiError> {
        let request_id = Uuid::new_v4();
        let mut url = self.statements_url(None);
        url.query_pairs_mut()
            .append_pair("requestId", &request_id.to_string());

        tracing::debug!(%request_id, statement, "submitting statement");

        let body = StatementRequest {
            statement,
            role: self.inner.role.as_deref(),
            warehouse: self.inner.warehouse.as_deref(),
        };
        let response = self
            .authorized(self.inner.http_client.post(url))
            .json(&body)
            .send()
            .await?;

        let (status, mut parsed) = self.handle_response(statement, response).await?;
        if status == StatusCode::ACCEPTED {
            parsed = self.wait_for_completion(statement, parsed).await?;
        }

        let mut result = QueryResult::from_response(&parsed);
        let partitions = parsed
            .result_set_meta_data
            .as_ref()
            .map(|meta| meta.partition_info.len())
            .unwrap_or(0);
        if partitions > 1 {
            let handle = required_handle(statement, &parsed)?;
            for partition in 1..partitions {
                let page = self.fetch(statement, &handle, Some(partition)).await?;
                result.extend(page.data);
            }
        }

        tracing::debug!(%request_id, rows = result.len(), "statement completed");
        Ok(result)
    }

    async fn wait_for_completion(
        &self,
        statement: &str,
        mut pending: StatementResponse,
    ) -> Result<StatementResponse, ApiError> {
        let handle = required_handle(statement, &pending)?;
        loop {
            tracing::debug!(handle = %handle, "statement still running");
            tokio::time::sleep(self.inner.poll_interval).await;

            let url = self.statements_url(Some(&handle));
            let response = self
                .authorized(self.inner.http_client.get(url))
                .send()
                .await?;
            let (status, parsed) = self.handle_response(statement, response).await?;
            if status != StatusCode::ACCEPTED {
                return Ok(parsed);
            }
            pending = parsed;
            if pending.statement_handle.is_none() {
                pending.statement_handle = Some(handle.clone());
            }
        }
    }

    async fn fetch(
        &self,
        statement: &str,
        handle: &str,
        partition: Option<usize>,
    ) -> Result<StatementResponse, ApiError> {
        let mut url = self.statements_url(Some(handle));
        if let Some(partition) = partition {
            url.query_pairs_mut()
                .append_pair("partition", &partition.to_string());
        }
        let response = self
            .authorized(self.inner.http_client.get(url))
            .send()
            .await?;
        let (_, parsed) = self.handle_response(statement, response).await?;
        Ok(parsed)
    }

    fn statements_url(&self, handle: Option<&str>) -> Url {
        let mut url = self.inner.base_url.clone();
        match handle {
            Some(handle) => url.set_path(&format!(
                "{}/{}",
                STATEMENTS_PATH,
                urlencoding::encode(handle)
            )),
            None => url.set_path(STATEMENTS_PATH),
        }
        url
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(AUTHORIZATION, &self.inner.auth_header)
            .header(TOKEN_TYPE_HEADER, self.inner.token_type.as_header_value())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }

    async fn handle_response(
        &self,
        statement: &str,
        response: reqwest::Response,
    ) -> Result<(StatusCode, StatementResponse), ApiError> {
        let status = response.status();

        if status.is_success() {
            let parsed = self.parse_success_response(response).await?;
            return Ok((status, parsed));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::AuthError);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }
        if status.is_server_error() {
            return Err(ApiError::ServiceUnavailable);
        }

        self.handle_error_response(statement, response).await
    }

    async fn parse_success_response(
        &self,
        response: reqwest::Response,
    ) -> Result<StatementResponse, ApiError> {
        let text = response.text().await?;
        tracing::trace!("SQL API response body: {}", text);

        serde_json::from_str::<StatementResponse>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    async fn handle_error_response<T>(
        &self,
        statement: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match serde_json::from_str::<StatementError>(&text) {
            Ok(err) if !err.code.is_empty() => Err(ApiError::Statement {
                statement: statement.to_string(),
                code: err.code,
                sql_state: err.sql_state,
                message: err.message,
            }),
            _ => Err(ApiError::Http {
                status,
                message: text,
            }),
        }
    }
}

fn required_handle(statement: &str, response: &StatementResponse) -> Result<String, ApiError> {
    response.statement_handle.clone().ok_or_else(|| {
        ApiError::ParseError(format!(
            "response for `{}` carries no statement handle",
            statement
        ))
    })
}
