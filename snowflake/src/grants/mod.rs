//! Grant model: targets, resource identity and reconciliation

pub mod identity;
pub mod reconcile;
pub mod target;

pub use identity::{GrantIdentity, IdentityError};
pub use reconcile::{attributed_privileges, diff, ObservedGrant, PrivilegeDelta};
pub use target::{
    BulkOptions, BulkScope, BulkTarget, ConfigurationError, GrantTarget, GrantTargetOptions,
    ObjectType, OnSchemaObjectOptions, OnSchemaOptions, PluralObjectType, PrivilegeSet,
    SchemaObjectTarget, SchemaTarget,
};
