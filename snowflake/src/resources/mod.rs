//! Resource implementations

pub mod database_role;
pub mod database_role_grants;
pub mod grant_privileges_to_database_role;

pub use database_role::DatabaseRoleResource;
pub use database_role_grants::DatabaseRoleGrantsResource;
pub use grant_privileges_to_database_role::GrantPrivilegesToDatabaseRoleResource;
