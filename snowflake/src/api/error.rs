use super::identifier::IdentifierError;
use thiserror::Error;

/// Snowflake error code for "object does not exist or not authorized"
pub const OBJECT_DOES_NOT_EXIST: &str = "002003";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    /// A SQL statement was rejected by Snowflake
    #[error("statement `{statement}` failed ({code}): {message}")]
    Statement {
        statement: String,
        code: String,
        sql_state: Option<String>,
        message: String,
    },

    #[error("API returned error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,
}

impl ApiError {
    /// True when Snowflake reports the object (or grantee) as missing
    pub fn is_object_missing(&self) -> bool {
        match self {
            ApiError::Statement { code, message, .. } => {
                code == OBJECT_DOES_NOT_EXIST || message.contains("does not exist")
            }
            _ => false,
        }
    }

    pub fn statement(&self) -> Option<&str> {
        match self {
            ApiError::Statement { statement, .. } => Some(statement),
            _ => None,
        }
    }
}
