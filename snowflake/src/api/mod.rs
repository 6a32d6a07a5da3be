//! Snowflake SQL API client and statement gateways

pub mod client;
pub mod database_roles;
pub mod error;
pub mod grants;
pub mod identifier;
pub mod principals;
pub mod response;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::{Client, ClientConfig, TokenType};
pub use error::ApiError;
pub use response::{QueryResult, Row};
