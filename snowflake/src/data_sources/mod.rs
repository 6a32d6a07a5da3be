//! Data source implementations

pub mod current_role;

pub use current_role::CurrentRoleDataSource;
