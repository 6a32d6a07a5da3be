//! Resource identity for privilege grants to a database role
//!
//! The identity is stored as the resource id: fifteen `|`-separated fields
//!
//! ```text
//! role|database|privileges|all_privileges|with_grant_option|on_database|
//! on_schema|on_schema_object|all|future|object_type|object_name|
//! object_type_plural|in_schema|schema_name
//! ```
//!
//! Privileges are comma-joined and sorted; booleans are `true`/`false`.

use super::target::{
    BulkScope, BulkTarget, ConfigurationError, GrantTarget, ObjectType, PluralObjectType,
    PrivilegeSet, SchemaObjectTarget, SchemaTarget,
};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const FIELD_DELIMITER: char = '|';
pub const PRIVILEGE_DELIMITER: char = ',';
const FIELD_COUNT: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identifier must have 15 fields separated by '|', found {0}")]
    FieldCount(usize),

    #[error("identifier field {field} must be 'true' or 'false', found '{value}'")]
    InvalidBool { field: &'static str, value: String },

    #[error("identifier does not describe a single grant target: {0}")]
    InvalidTarget(&'static str),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantIdentity {
    pub role_name: String,
    pub database_name: String,
    pub privileges: PrivilegeSet,
    pub with_grant_option: bool,
    pub target: GrantTarget,
}

impl GrantIdentity {
    /// Build an identity, rejecting values the id format cannot carry
    pub fn new(
        role_name: impl Into<String>,
        database_name: impl Into<String>,
        privileges: PrivilegeSet,
        with_grant_option: bool,
        target: GrantTarget,
    ) -> Result<Self, ConfigurationError> {
        let identity = Self {
            role_name: role_name.into(),
            database_name: database_name.into(),
            privileges,
            with_grant_option,
            target,
        };
        identity.check_encodable()?;
        Ok(identity)
    }

    /// Same grant with a different privilege set
    pub fn with_privileges(&self, privileges: PrivilegeSet) -> Self {
        Self {
            privileges,
            ..self.clone()
        }
    }

    fn check_encodable(&self) -> Result<(), ConfigurationError> {
        if self.role_name.trim().is_empty() {
            return Err(ConfigurationError::MissingValue("role_name"));
        }
        if self.database_name.trim().is_empty() {
            return Err(ConfigurationError::MissingValue("database_name"));
        }
        if self.privileges.is_all() && self.target == GrantTarget::Database {
            return Err(ConfigurationError::AllPrivilegesOnDatabase);
        }

        let fields = self.fields();
        let named = [
            ("role_name", 0),
            ("database_name", 1),
            ("object_name", 11),
            ("schema_name", 14),
        ];
        for (field, index) in named {
            if fields[index].contains(FIELD_DELIMITER) {
                return Err(ConfigurationError::ReservedCharacter {
                    field,
                    value: fields[index].clone(),
                    delimiter: FIELD_DELIMITER,
                });
            }
        }

        self.target.check_names()?;

        if let PrivilegeSet::Named(privileges) = &self.privileges {
            for privilege in privileges {
                if privilege.trim().is_empty() || privilege.trim() != privilege {
                    return Err(ConfigurationError::InvalidPrivilege(privilege.clone()));
                }
                for delimiter in [FIELD_DELIMITER, PRIVILEGE_DELIMITER] {
                    if privilege.contains(delimiter) {
                        return Err(ConfigurationError::ReservedCharacter {
                            field: "privileges",
                            value: privilege.clone(),
                            delimiter,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn fields(&self) -> [String; FIELD_COUNT] {
        let flag = |b: bool| b.to_string();

        let (all_privileges, privileges) = match &self.privileges {
            PrivilegeSet::All => (true, String::new()),
            PrivilegeSet::Named(names) => (
                false,
                names
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        };

        let mut on_database = false;
        let mut on_schema = false;
        let mut on_schema_object = false;
        let mut all = false;
        let mut future = false;
        let mut object_type = String::new();
        let mut object_name = String::new();
        let mut object_type_plural = String::new();
        let mut in_schema = false;
        let mut schema_name = String::new();

        match &self.target {
            GrantTarget::Database => on_database = true,
            GrantTarget::Schema(schema) => {
                on_schema = true;
                match schema {
                    SchemaTarget::Named(name) => schema_name = name.clone(),
                    SchemaTarget::AllInDatabase => all = true,
                    SchemaTarget::FutureInDatabase => future = true,
                }
            }
            GrantTarget::SchemaObject(object) => {
                on_schema_object = true;
                match object {
                    SchemaObjectTarget::Named {
                        object_type: t,
                        object_name: n,
                    } => {
                        object_type = t.as_str().to_string();
                        object_name = n.clone();
                    }
                    SchemaObjectTarget::All(target) | SchemaObjectTarget::Future(target) => {
                        all = matches!(object, SchemaObjectTarget::All(_));
                        future = !all;
                        object_type_plural = target.object_type_plural.as_str().to_string();
                        if let BulkScope::Schema(schema) = &target.scope {
                            in_schema = true;
                            schema_name = schema.clone();
                        }
                    }
                }
            }
        }

        [
            self.role_name.clone(),
            self.database_name.clone(),
            privileges,
            flag(all_privileges),
            flag(self.with_grant_option),
            flag(on_database),
            flag(on_schema),
            flag(on_schema_object),
            flag(all),
            flag(future),
            object_type,
            object_name,
            object_type_plural,
            flag(in_schema),
            schema_name,
        ]
    }
}

impl fmt::Display for GrantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields().join("|"))
    }
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, IdentityError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(IdentityError::InvalidBool {
            field,
            value: other.to_string(),
        }),
    }
}

impl FromStr for GrantIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(FIELD_DELIMITER).collect();
        let [role_name, database_name, privileges, all_privileges, with_grant_option, on_database, on_schema, on_schema_object, all, future, object_type, object_name, object_type_plural, in_schema, schema_name] =
            parts.as_slice()
        else {
            return Err(IdentityError::FieldCount(parts.len()));
        };

        let all_privileges = parse_flag("all_privileges", all_privileges)?;
        let with_grant_option = parse_flag("with_grant_option", with_grant_option)?;
        let on_database = parse_flag("on_database", on_database)?;
        let on_schema = parse_flag("on_schema", on_schema)?;
        let on_schema_object = parse_flag("on_schema_object", on_schema_object)?;
        let all = parse_flag("all", all)?;
        let future = parse_flag("future", future)?;
        let in_schema = parse_flag("in_schema", in_schema)?;

        let target = match (on_database, on_schema, on_schema_object) {
            (true, false, false) => {
                if all
                    || future
                    || in_schema
                    || !object_type.is_empty()
                    || !object_name.is_empty()
                    || !object_type_plural.is_empty()
                    || !schema_name.is_empty()
                {
                    return Err(IdentityError::InvalidTarget(
                        "on_database carries schema or object fields",
                    ));
                }
                GrantTarget::Database
            }
            (false, true, false) => {
                if in_schema
                    || !object_type.is_empty()
                    || !object_name.is_empty()
                    || !object_type_plural.is_empty()
                {
                    return Err(IdentityError::InvalidTarget(
                        "on_schema carries object fields",
                    ));
                }
                let schema = match (schema_name.is_empty(), all, future) {
                    (false, false, false) => SchemaTarget::Named(schema_name.to_string()),
                    (true, true, false) => SchemaTarget::AllInDatabase,
                    (true, false, true) => SchemaTarget::FutureInDatabase,
                    _ => {
                        return Err(IdentityError::InvalidTarget(
                            "on_schema needs exactly one of schema name, all or future",
                        ))
                    }
                };
                GrantTarget::Schema(schema)
            }
            (false, false, true) => {
                let named = !object_type.is_empty() || !object_name.is_empty();
                let object = match (named, all, future) {
                    (true, false, false) => {
                        if object_type.is_empty()
                            || object_name.is_empty()
                            || in_schema
                            || !schema_name.is_empty()
                            || !object_type_plural.is_empty()
                        {
                            return Err(IdentityError::InvalidTarget(
                                "named schema object needs exactly object type and object name",
                            ));
                        }
                        SchemaObjectTarget::Named {
                            object_type: object_type.parse::<ObjectType>()?,
                            object_name: object_name.to_string(),
                        }
                    }
                    (false, true, false) | (false, false, true) => {
                        let scope = match (in_schema, schema_name.is_empty()) {
                            (true, false) => BulkScope::Schema(schema_name.to_string()),
                            (false, true) => BulkScope::Database,
                            _ => {
                                return Err(IdentityError::InvalidTarget(
                                    "in_schema and schema name must be set together",
                                ))
                            }
                        };
                        let target = BulkTarget {
                            object_type_plural: object_type_plural.parse::<PluralObjectType>()?,
                            scope,
                        };
                        if all {
                            SchemaObjectTarget::All(target)
                        } else {
                            SchemaObjectTarget::Future(target)
                        }
                    }
                    _ => {
                        return Err(IdentityError::InvalidTarget(
                            "on_schema_object needs exactly one of a named object, all or future",
                        ))
                    }
                };
                GrantTarget::SchemaObject(object)
            }
            _ => {
                return Err(IdentityError::InvalidTarget(
                    "exactly one of on_database, on_schema or on_schema_object must be true",
                ))
            }
        };

        let privileges = match (all_privileges, privileges.is_empty()) {
            (true, true) if target == GrantTarget::Database => {
                return Err(ConfigurationError::AllPrivilegesOnDatabase.into())
            }
            (true, true) => PrivilegeSet::All,
            (true, false) => return Err(ConfigurationError::PrivilegesConflict.into()),
            (false, _) => PrivilegeSet::Named(
                privileges
                    .split(PRIVILEGE_DELIMITER)
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect::<BTreeSet<_>>(),
            ),
        };

        let identity = GrantIdentity {
            role_name: role_name.to_string(),
            database_name: database_name.to_string(),
            privileges,
            with_grant_option,
            target,
        };
        identity.check_encodable()?;
        Ok(identity)
    }
}
