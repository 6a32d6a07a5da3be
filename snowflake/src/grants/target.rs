//! Grant targets and privilege sets
//!
//! A grant lands on exactly one of: the database, a schema (named, all or
//! future), or a schema object (named, all or future of a plural type in a
//! database or schema). Configuration is resolved into a [`GrantTarget`]
//! once; anything ambiguous is a [`ConfigurationError`].

use crate::api::identifier::{self, IdentifierError};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("exactly one of on_database, on_schema or on_schema_object must be set")]
    NoTarget,

    #[error("only one of on_database, on_schema or on_schema_object may be set, found {}", .0.join(", "))]
    MultipleTargets(Vec<&'static str>),

    #[error("{block}: {reason}")]
    InvalidBlock {
        block: &'static str,
        reason: &'static str,
    },

    #[error("unknown object type '{0}'")]
    UnknownObjectType(String),

    #[error("unknown plural object type '{0}'")]
    UnknownPluralObjectType(String),

    #[error("{field}: {source}")]
    InvalidName {
        field: &'static str,
        source: IdentifierError,
    },

    #[error("all_privileges cannot be used with on_database")]
    AllPrivilegesOnDatabase,

    #[error("privileges and all_privileges cannot both be set")]
    PrivilegesConflict,

    #[error("privileges must not be empty unless all_privileges is set")]
    NoPrivileges,

    #[error("{0} must not be empty")]
    MissingValue(&'static str),

    #[error("privilege '{0}' must be a non-empty name without surrounding whitespace")]
    InvalidPrivilege(String),

    #[error("{field} value '{value}' contains reserved character '{delimiter}'")]
    ReservedCharacter {
        field: &'static str,
        value: String,
        delimiter: char,
    },
}

macro_rules! object_types {
    ($($variant:ident / $plural_variant:ident => $singular:literal, $plural:literal;)*) => {
        /// Schema object kinds a privilege can be granted on
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ObjectType {
            $($variant,)*
        }

        /// Plural spelling used by ALL and FUTURE grants
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum PluralObjectType {
            $($plural_variant,)*
        }

        impl ObjectType {
            pub const ALL: &'static [ObjectType] = &[$(ObjectType::$variant,)*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ObjectType::$variant => $singular,)*
                }
            }

            pub fn plural(&self) -> PluralObjectType {
                match self {
                    $(ObjectType::$variant => PluralObjectType::$plural_variant,)*
                }
            }
        }

        impl PluralObjectType {
            pub const ALL: &'static [PluralObjectType] = &[$(PluralObjectType::$plural_variant,)*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(PluralObjectType::$plural_variant => $plural,)*
                }
            }

            pub fn singular(&self) -> ObjectType {
                match self {
                    $(PluralObjectType::$plural_variant => ObjectType::$variant,)*
                }
            }
        }
    };
}

object_types! {
    Alert / Alerts => "ALERT", "ALERTS";
    DynamicTable / DynamicTables => "DYNAMIC TABLE", "DYNAMIC TABLES";
    EventTable / EventTables => "EVENT TABLE", "EVENT TABLES";
    FileFormat / FileFormats => "FILE FORMAT", "FILE FORMATS";
    Function / Functions => "FUNCTION", "FUNCTIONS";
    Procedure / Procedures => "PROCEDURE", "PROCEDURES";
    Secret / Secrets => "SECRET", "SECRETS";
    Sequence / Sequences => "SEQUENCE", "SEQUENCES";
    Pipe / Pipes => "PIPE", "PIPES";
    MaskingPolicy / MaskingPolicies => "MASKING POLICY", "MASKING POLICIES";
    PasswordPolicy / PasswordPolicies => "PASSWORD POLICY", "PASSWORD POLICIES";
    RowAccessPolicy / RowAccessPolicies => "ROW ACCESS POLICY", "ROW ACCESS POLICIES";
    SessionPolicy / SessionPolicies => "SESSION POLICY", "SESSION POLICIES";
    Tag / Tags => "TAG", "TAGS";
    Stage / Stages => "STAGE", "STAGES";
    Stream / Streams => "STREAM", "STREAMS";
    Table / Tables => "TABLE", "TABLES";
    ExternalTable / ExternalTables => "EXTERNAL TABLE", "EXTERNAL TABLES";
    Task / Tasks => "TASK", "TASKS";
    View / Views => "VIEW", "VIEWS";
    MaterializedView / MaterializedViews => "MATERIALIZED VIEW", "MATERIALIZED VIEWS";
}

/// Uppercase, underscores as spaces, single spaces between words
pub(crate) fn normalize_type_name(name: &str) -> String {
    name.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

impl FromStr for ObjectType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_type_name(s);
        ObjectType::ALL
            .iter()
            .find(|t| t.as_str() == normalized)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownObjectType(s.to_string()))
    }
}

impl FromStr for PluralObjectType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_type_name(s);
        PluralObjectType::ALL
            .iter()
            .find(|t| t.as_str() == normalized)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownPluralObjectType(s.to_string()))
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PluralObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantTarget {
    /// The identity's own database
    Database,
    Schema(SchemaTarget),
    SchemaObject(SchemaObjectTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaTarget {
    Named(String),
    AllInDatabase,
    FutureInDatabase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaObjectTarget {
    Named {
        object_type: ObjectType,
        object_name: String,
    },
    All(BulkTarget),
    Future(BulkTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkTarget {
    pub object_type_plural: PluralObjectType,
    pub scope: BulkScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkScope {
    Database,
    Schema(String),
}

/// Target options as written in configuration, before resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantTargetOptions {
    pub on_database: bool,
    pub on_schema: Option<OnSchemaOptions>,
    pub on_schema_object: Option<OnSchemaObjectOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnSchemaOptions {
    pub schema_name: Option<String>,
    pub all_schemas: bool,
    pub future_schemas: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnSchemaObjectOptions {
    pub object_type: Option<String>,
    pub object_name: Option<String>,
    pub all: Option<BulkOptions>,
    pub future: Option<BulkOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOptions {
    pub object_type_plural: String,
    pub in_database: bool,
    pub in_schema: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl GrantTarget {
    /// Resolve configuration into exactly one target
    pub fn resolve(options: &GrantTargetOptions) -> Result<Self, ConfigurationError> {
        let mut branches = Vec::new();
        if options.on_database {
            branches.push("on_database");
        }
        if options.on_schema.is_some() {
            branches.push("on_schema");
        }
        if options.on_schema_object.is_some() {
            branches.push("on_schema_object");
        }
        if branches.len() > 1 {
            return Err(ConfigurationError::MultipleTargets(branches));
        }

        if options.on_database {
            return Ok(GrantTarget::Database);
        }
        if let Some(on_schema) = &options.on_schema {
            return Self::resolve_schema(on_schema).map(GrantTarget::Schema);
        }
        if let Some(on_schema_object) = &options.on_schema_object {
            return Self::resolve_schema_object(on_schema_object).map(GrantTarget::SchemaObject);
        }
        Err(ConfigurationError::NoTarget)
    }

    fn resolve_schema(options: &OnSchemaOptions) -> Result<SchemaTarget, ConfigurationError> {
        let schema_name = non_empty(&options.schema_name);
        let set = [
            schema_name.is_some(),
            options.all_schemas,
            options.future_schemas,
        ]
        .iter()
        .filter(|b| **b)
        .count();
        if set != 1 {
            return Err(ConfigurationError::InvalidBlock {
                block: "on_schema",
                reason: "exactly one of schema_name, all_schemas or future_schemas must be set",
            });
        }

        match schema_name {
            Some(name) => {
                check_schema_name("on_schema.schema_name", name)?;
                Ok(SchemaTarget::Named(name.to_string()))
            }
            None if options.all_schemas => Ok(SchemaTarget::AllInDatabase),
            None => Ok(SchemaTarget::FutureInDatabase),
        }
    }

    fn resolve_schema_object(
        options: &OnSchemaObjectOptions,
    ) -> Result<SchemaObjectTarget, ConfigurationError> {
        let object_type = non_empty(&options.object_type);
        let object_name = non_empty(&options.object_name);
        let named = object_type.is_some() || object_name.is_some();
        let set = [named, options.all.is_some(), options.future.is_some()]
            .iter()
            .filter(|b| **b)
            .count();
        if set != 1 {
            return Err(ConfigurationError::InvalidBlock {
                block: "on_schema_object",
                reason: "exactly one of object_type with object_name, all or future must be set",
            });
        }

        if let Some(all) = &options.all {
            return Self::resolve_bulk("on_schema_object.all", all).map(SchemaObjectTarget::All);
        }
        if let Some(future) = &options.future {
            return Self::resolve_bulk("on_schema_object.future", future)
                .map(SchemaObjectTarget::Future);
        }

        match (object_type, object_name) {
            (Some(object_type), Some(object_name)) => {
                let object_type = object_type.parse::<ObjectType>()?;
                check_object_name("on_schema_object.object_name", object_name)?;
                Ok(SchemaObjectTarget::Named {
                    object_type,
                    object_name: object_name.to_string(),
                })
            }
            _ => Err(ConfigurationError::InvalidBlock {
                block: "on_schema_object",
                reason: "object_type and object_name must be set together",
            }),
        }
    }

    fn resolve_bulk(
        block: &'static str,
        options: &BulkOptions,
    ) -> Result<BulkTarget, ConfigurationError> {
        let object_type_plural = options.object_type_plural.parse::<PluralObjectType>()?;
        let scope = match (options.in_database, non_empty(&options.in_schema)) {
            (true, None) => BulkScope::Database,
            (false, Some(schema)) => {
                check_schema_name(block, schema)?;
                BulkScope::Schema(schema.to_string())
            }
            _ => {
                return Err(ConfigurationError::InvalidBlock {
                    block,
                    reason: "exactly one of in_database or in_schema must be set",
                })
            }
        };
        Ok(BulkTarget {
            object_type_plural,
            scope,
        })
    }

    /// Apply the name checks of [`GrantTarget::resolve`] to an already built target
    pub fn check_names(&self) -> Result<(), ConfigurationError> {
        match self {
            GrantTarget::Database
            | GrantTarget::Schema(SchemaTarget::AllInDatabase | SchemaTarget::FutureInDatabase) => {
                Ok(())
            }
            GrantTarget::Schema(SchemaTarget::Named(name)) => {
                check_schema_name("on_schema.schema_name", name)
            }
            GrantTarget::SchemaObject(SchemaObjectTarget::Named { object_name, .. }) => {
                check_object_name("on_schema_object.object_name", object_name)
            }
            GrantTarget::SchemaObject(
                SchemaObjectTarget::All(bulk) | SchemaObjectTarget::Future(bulk),
            ) => match &bulk.scope {
                BulkScope::Database => Ok(()),
                BulkScope::Schema(schema) => check_schema_name("on_schema_object.in_schema", schema),
            },
        }
    }

    /// Object type SHOW GRANTS reports in granted_on / grant_on for this target
    pub fn granted_on(&self) -> &'static str {
        match self {
            GrantTarget::Database => "DATABASE",
            GrantTarget::Schema(_) => "SCHEMA",
            GrantTarget::SchemaObject(SchemaObjectTarget::Named { object_type, .. }) => {
                object_type.as_str()
            }
            GrantTarget::SchemaObject(
                SchemaObjectTarget::All(bulk) | SchemaObjectTarget::Future(bulk),
            ) => bulk.object_type_plural.singular().as_str(),
        }
    }

    pub fn is_future(&self) -> bool {
        matches!(
            self,
            GrantTarget::Schema(SchemaTarget::FutureInDatabase)
                | GrantTarget::SchemaObject(SchemaObjectTarget::Future(_))
        )
    }

    /// ALL grants are expanded at grant time and cannot be listed back
    pub fn is_observable(&self) -> bool {
        !matches!(
            self,
            GrantTarget::Schema(SchemaTarget::AllInDatabase)
                | GrantTarget::SchemaObject(SchemaObjectTarget::All(_))
        )
    }

    /// Inverse of [`GrantTarget::resolve`]
    pub fn to_options(&self) -> GrantTargetOptions {
        let bulk_options = |bulk: &BulkTarget| BulkOptions {
            object_type_plural: bulk.object_type_plural.as_str().to_string(),
            in_database: bulk.scope == BulkScope::Database,
            in_schema: match &bulk.scope {
                BulkScope::Schema(schema) => Some(schema.clone()),
                BulkScope::Database => None,
            },
        };

        match self {
            GrantTarget::Database => GrantTargetOptions {
                on_database: true,
                ..Default::default()
            },
            GrantTarget::Schema(schema) => GrantTargetOptions {
                on_schema: Some(OnSchemaOptions {
                    schema_name: match schema {
                        SchemaTarget::Named(name) => Some(name.clone()),
                        _ => None,
                    },
                    all_schemas: *schema == SchemaTarget::AllInDatabase,
                    future_schemas: *schema == SchemaTarget::FutureInDatabase,
                }),
                ..Default::default()
            },
            GrantTarget::SchemaObject(object) => {
                let options = match object {
                    SchemaObjectTarget::Named {
                        object_type,
                        object_name,
                    } => OnSchemaObjectOptions {
                        object_type: Some(object_type.as_str().to_string()),
                        object_name: Some(object_name.clone()),
                        ..Default::default()
                    },
                    SchemaObjectTarget::All(bulk) => OnSchemaObjectOptions {
                        all: Some(bulk_options(bulk)),
                        ..Default::default()
                    },
                    SchemaObjectTarget::Future(bulk) => OnSchemaObjectOptions {
                        future: Some(bulk_options(bulk)),
                        ..Default::default()
                    },
                };
                GrantTargetOptions {
                    on_schema_object: Some(options),
                    ..Default::default()
                }
            }
        }
    }
}

fn check_schema_name(field: &'static str, name: &str) -> Result<(), ConfigurationError> {
    let parts = identifier::parse_qualified(name)
        .map_err(|source| ConfigurationError::InvalidName { field, source })?;
    if parts.len() > 2 {
        return Err(ConfigurationError::InvalidName {
            field,
            source: IdentifierError::PartCount {
                name: name.to_string(),
                expected: "1 or 2",
                found: parts.len(),
            },
        });
    }
    Ok(())
}

fn check_object_name(field: &'static str, name: &str) -> Result<(), ConfigurationError> {
    let parts = identifier::parse_qualified(name)
        .map_err(|source| ConfigurationError::InvalidName { field, source })?;
    match parts.len() {
        2 | 3 => Ok(()),
        found => Err(ConfigurationError::InvalidName {
            field,
            source: IdentifierError::PartCount {
                name: name.to_string(),
                expected: "2 or 3",
                found,
            },
        }),
    }
}

/// Privileges of one grant: ALL PRIVILEGES or an explicit set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegeSet {
    All,
    Named(BTreeSet<String>),
}

impl PrivilegeSet {
    pub fn named<I, S>(privileges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PrivilegeSet::Named(privileges.into_iter().map(Into::into).collect())
    }

    /// Combine the privileges and all_privileges attributes for a target
    pub fn resolve(
        privileges: &[String],
        all_privileges: bool,
        target: &GrantTarget,
    ) -> Result<Self, ConfigurationError> {
        let named: BTreeSet<String> = privileges
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        match (all_privileges, named.is_empty()) {
            (true, false) => Err(ConfigurationError::PrivilegesConflict),
            (true, true) if *target == GrantTarget::Database => {
                Err(ConfigurationError::AllPrivilegesOnDatabase)
            }
            (true, true) => Ok(PrivilegeSet::All),
            (false, true) => Err(ConfigurationError::NoPrivileges),
            (false, false) => Ok(PrivilegeSet::Named(named)),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, PrivilegeSet::All)
    }

    /// Explicit privileges; empty for ALL PRIVILEGES
    pub fn names(&self) -> BTreeSet<String> {
        match self {
            PrivilegeSet::All => BTreeSet::new(),
            PrivilegeSet::Named(names) => names.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PrivilegeSet::Named(names) if names.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn future_tables_in_database() -> GrantTargetOptions {
        GrantTargetOptions {
            on_schema_object: Some(OnSchemaObjectOptions {
                future: Some(BulkOptions {
                    object_type_plural: "TABLES".to_string(),
                    in_database: true,
                    in_schema: None,
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn object_types_parse_case_insensitively() {
        assert_eq!(
            "materialized_view".parse::<ObjectType>().unwrap(),
            ObjectType::MaterializedView
        );
        assert_eq!(
            " row  access policies".parse::<PluralObjectType>().unwrap(),
            PluralObjectType::RowAccessPolicies
        );
        assert!("WAREHOUSE".parse::<ObjectType>().is_err());
    }

    #[test]
    fn every_plural_maps_to_its_singular() {
        assert_eq!(ObjectType::ALL.len(), 21);
        for object_type in ObjectType::ALL {
            assert_eq!(object_type.plural().singular(), *object_type);
        }
        assert_eq!(PluralObjectType::MaskingPolicies.as_str(), "MASKING POLICIES");
    }

    #[test]
    fn database_target_resolves() {
        let options = GrantTargetOptions {
            on_database: true,
            ..Default::default()
        };
        assert_eq!(GrantTarget::resolve(&options).unwrap(), GrantTarget::Database);
    }

    #[test]
    fn zero_or_many_branches_are_rejected() {
        assert_eq!(
            GrantTarget::resolve(&GrantTargetOptions::default()),
            Err(ConfigurationError::NoTarget)
        );

        let options = GrantTargetOptions {
            on_database: true,
            on_schema: Some(OnSchemaOptions {
                schema_name: Some("PUBLIC".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            GrantTarget::resolve(&options),
            Err(ConfigurationError::MultipleTargets(vec![
                "on_database",
                "on_schema"
            ]))
        );
    }

    #[test]
    fn ambiguous_schema_branch_is_rejected() {
        let options = GrantTargetOptions {
            on_schema: Some(OnSchemaOptions {
                schema_name: Some("PUBLIC".to_string()),
                all_schemas: true,
                future_schemas: false,
            }),
            ..Default::default()
        };
        assert!(matches!(
            GrantTarget::resolve(&options),
            Err(ConfigurationError::InvalidBlock {
                block: "on_schema",
                ..
            })
        ));

        let empty = GrantTargetOptions {
            on_schema: Some(OnSchemaOptions {
                schema_name: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(GrantTarget::resolve(&empty).is_err());
    }

    #[test]
    fn schema_object_requires_type_and_name_together() {
        let options = GrantTargetOptions {
            on_schema_object: Some(OnSchemaObjectOptions {
                object_type: Some("TABLE".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            GrantTarget::resolve(&options),
            Err(ConfigurationError::InvalidBlock {
                reason: "object_type and object_name must be set together",
                ..
            })
        ));

        let unqualified = GrantTargetOptions {
            on_schema_object: Some(OnSchemaObjectOptions {
                object_type: Some("TABLE".to_string()),
                object_name: Some("T1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            GrantTarget::resolve(&unqualified),
            Err(ConfigurationError::InvalidName { .. })
        ));
    }

    #[test]
    fn named_object_and_named_plus_bulk_conflict() {
        let options = GrantTargetOptions {
            on_schema_object: Some(OnSchemaObjectOptions {
                object_type: Some("VIEW".to_string()),
                object_name: Some("PUBLIC.V1".to_string()),
                all: Some(BulkOptions {
                    object_type_plural: "VIEWS".to_string(),
                    in_database: true,
                    in_schema: None,
                }),
                future: None,
            }),
            ..Default::default()
        };
        assert!(GrantTarget::resolve(&options).is_err());
    }

    #[test]
    fn bulk_scope_needs_exactly_one_of_database_or_schema() {
        let mut options = future_tables_in_database();
        let target = GrantTarget::resolve(&options).unwrap();
        assert_eq!(
            target,
            GrantTarget::SchemaObject(SchemaObjectTarget::Future(BulkTarget {
                object_type_plural: PluralObjectType::Tables,
                scope: BulkScope::Database,
            }))
        );
        assert!(target.is_future());
        assert_eq!(target.granted_on(), "TABLE");

        if let Some(object) = options.on_schema_object.as_mut() {
            if let Some(future) = object.future.as_mut() {
                future.in_schema = Some("PUBLIC".to_string());
            }
        }
        assert!(GrantTarget::resolve(&options).is_err());
    }

    #[test]
    fn options_round_trip_through_targets() {
        let options = future_tables_in_database();
        let target = GrantTarget::resolve(&options).unwrap();
        assert_eq!(target.to_options(), options);

        let schema = GrantTargetOptions {
            on_schema: Some(OnSchemaOptions {
                all_schemas: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        let target = GrantTarget::resolve(&schema).unwrap();
        assert!(!target.is_observable());
        assert_eq!(target.to_options(), schema);
    }

    #[test]
    fn privilege_sets_follow_policy() {
        let usage = vec!["USAGE".to_string(), " MONITOR ".to_string()];
        assert_eq!(
            PrivilegeSet::resolve(&usage, false, &GrantTarget::Database).unwrap(),
            PrivilegeSet::named(["MONITOR", "USAGE"])
        );
        assert_eq!(
            PrivilegeSet::resolve(&[], true, &GrantTarget::Database),
            Err(ConfigurationError::AllPrivilegesOnDatabase)
        );
        assert_eq!(
            PrivilegeSet::resolve(&usage, true, &GrantTarget::Schema(SchemaTarget::AllInDatabase)),
            Err(ConfigurationError::PrivilegesConflict)
        );
        assert_eq!(
            PrivilegeSet::resolve(&[], false, &GrantTarget::Database),
            Err(ConfigurationError::NoPrivileges)
        );
        assert!(PrivilegeSet::resolve(
            &[],
            true,
            &GrantTarget::Schema(SchemaTarget::Named("PUBLIC".to_string()))
        )
        .unwrap()
        .is_all());
    }
}
