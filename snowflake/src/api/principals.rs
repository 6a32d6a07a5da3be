//! Account roles, users and the session role

use super::client::Client;
use super::error::ApiError;
use super::identifier::quote_literal;

pub struct PrincipalsApi<'a> {
    client: &'a Client,
}

impl<'a> PrincipalsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn role_exists(&self, name: &str) -> Result<bool, ApiError> {
        let statement = format!("SHOW ROLES LIKE {}", quote_literal(name));
        let result = self.client.execute(&statement).await?;
        Ok(result
            .rows()
            .iter()
            .any(|row| row.get_or_empty("name") == name))
    }

    /// Users are matched on name or login name
    pub async fn user_exists(&self, name: &str) -> Result<bool, ApiError> {
        let statement = format!("SHOW USERS LIKE {}", quote_literal(name));
        let result = self.client.execute(&statement).await?;
        Ok(result.rows().iter().any(|row| {
            row.get_or_empty("name") == name
                || row.get_or_empty("login_name").eq_ignore_ascii_case(name)
        }))
    }

    /// Primary role of the session, None when no role is active
    pub async fn current_role(&self) -> Result<Option<String>, ApiError> {
        let result = self
            .client
            .execute("SELECT CURRENT_ROLE() AS \"ROLE\"")
            .await?;
        Ok(result
            .rows()
            .first()
            .and_then(|row| row.get("ROLE"))
            .map(str::to_string))
    }
}
