//! Database role lifecycle

use super::client::Client;
use super::error::ApiError;
use super::identifier::{self, quote_ident, quote_literal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRole {
    pub name: String,
    pub comment: Option<String>,
    pub owner: String,
}

pub struct DatabaseRolesApi<'a> {
    client: &'a Client,
}

impl<'a> DatabaseRolesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        database: &str,
        name: &str,
        comment: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut statement = format!(
            "CREATE DATABASE ROLE {}",
            identifier::database_role(database, name)
        );
        if let Some(comment) = comment {
            statement.push_str(&format!(" COMMENT = {}", quote_literal(comment)));
        }
        self.client.execute(&statement).await?;
        Ok(())
    }

    /// Exact-name lookup; None when the role does not exist
    pub async fn show(&self, database: &str, name: &str) -> Result<Option<DatabaseRole>, ApiError> {
        let statement = format!(
            "SHOW DATABASE ROLES LIKE {} IN DATABASE {}",
            quote_literal(name),
            quote_ident(database)
        );
        let result = self.client.execute(&statement).await?;
        let qualified = format!("{}.{}", database, name);

        Ok(result
            .rows()
            .iter()
            .find(|row| {
                let found = row.get_or_empty("name");
                found == name || found == qualified
            })
            .map(|row| DatabaseRole {
                name: name.to_string(),
                comment: row
                    .get("comment")
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
                owner: row.get_or_empty("owner").to_string(),
            }))
    }

    pub async fn set_comment(
        &self,
        database: &str,
        name: &str,
        comment: &str,
    ) -> Result<(), ApiError> {
        let statement = format!(
            "ALTER DATABASE ROLE {} SET COMMENT = {}",
            identifier::database_role(database, name),
            quote_literal(comment)
        );
        self.client.execute(&statement).await?;
        Ok(())
    }

    pub async fn unset_comment(&self, database: &str, name: &str) -> Result<(), ApiError> {
        let statement = format!(
            "ALTER DATABASE ROLE {} UNSET COMMENT",
            identifier::database_role(database, name)
        );
        self.client.execute(&statement).await?;
        Ok(())
    }

    pub async fn rename(&self, database: &str, from: &str, to: &str) -> Result<(), ApiError> {
        let statement = format!(
            "ALTER DATABASE ROLE {} RENAME TO {}",
            identifier::database_role(database, from),
            identifier::database_role(database, to)
        );
        self.client.execute(&statement).await?;
        Ok(())
    }

    pub async fn drop(&self, database: &str, name: &str) -> Result<(), ApiError> {
        let statement = format!(
            "DROP DATABASE ROLE {}",
            identifier::database_role(database, name)
        );
        self.client.execute(&statement).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use crate::api::test_helpers::{create_test_client, mock_statement, result_body, status_body};
    use mockito::Server;

    #[tokio::test]
    async fn show_matches_exact_name_only() {
        let mut server = Server::new_async().await;
        let _show = mock_statement(
            &mut server,
            "SHOW DATABASE ROLES LIKE 'R_1' IN DATABASE \"DB1\"",
            result_body(
                &["created_on", "name", "owner", "comment"],
                &[
                    &[Some("t"), Some("RX1"), Some("SYSADMIN"), None],
                    &[Some("t"), Some("R_1"), Some("SYSADMIN"), Some("analysts")],
                ],
            ),
        )
        .await;

        let client = create_test_client(&server.url());
        let role = client
            .database_roles()
            .show("DB1", "R_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(role.name, "R_1");
        assert_eq!(role.comment.as_deref(), Some("analysts"));
        assert_eq!(role.owner, "SYSADMIN");
    }

    #[tokio::test]
    async fn show_returns_none_for_missing_role() {
        let mut server = Server::new_async().await;
        let _show = mock_statement(
            &mut server,
            "SHOW DATABASE ROLES LIKE 'GONE' IN DATABASE \"DB1\"",
            result_body(&["name", "owner", "comment"], &[]),
        )
        .await;

        let client = create_test_client(&server.url());
        assert!(client
            .database_roles()
            .show("DB1", "GONE")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn lifecycle_statements_are_quoted() {
        let mut server = Server::new_async().await;
        let statements = [
            "CREATE DATABASE ROLE \"DB1\".\"R1\" COMMENT = 'it''s mine'",
            "ALTER DATABASE ROLE \"DB1\".\"R1\" SET COMMENT = 'new'",
            "ALTER DATABASE ROLE \"DB1\".\"R1\" UNSET COMMENT",
            "ALTER DATABASE ROLE \"DB1\".\"R1\" RENAME TO \"DB1\".\"R2\"",
            "DROP DATABASE ROLE \"DB1\".\"R2\"",
        ];
        let mut mocks = Vec::new();
        for statement in statements {
            mocks.push(mock_statement(&mut server, statement, status_body()).await);
        }

        let client = create_test_client(&server.url());
        let roles = client.database_roles();
        roles.create("DB1", "R1", Some("it's mine")).await.unwrap();
        roles.set_comment("DB1", "R1", "new").await.unwrap();
        roles.unset_comment("DB1", "R1").await.unwrap();
        roles.rename("DB1", "R1", "R2").await.unwrap();
        roles.drop("DB1", "R2").await.unwrap();

        for mock in mocks {
            mock.assert_async().await;
        }
    }
}
