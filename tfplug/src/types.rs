//! Core type system for tfplug
//!
//! This module provides the core types exchanged with the host: the Dynamic
//! attribute bag, attribute paths and diagnostics.

use crate::error::{Result, TfplugError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dynamic represents Terraform values that can be of any type
/// This is the core type for all configuration and state data
/// Always use the type-safe accessors on DynamicValue instead of matching directly
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// Explicit null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (all numbers are f64 to match Terraform)
    Number(f64),
    /// String value
    String(String),
    /// List of values (sets are also carried as lists)
    List(Vec<Dynamic>),
    /// Map of string keys to values (objects are represented as Maps)
    Map(HashMap<String, Dynamic>),
    /// Value not yet known (during planning)
    Unknown,
}

const UNKNOWN_SENTINEL: &str = "__unknown__";

impl Serialize for Dynamic {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Number(n) => serializer.serialize_f64(*n),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::List(l) => l.serialize(serializer),
            Dynamic::Map(m) => m.serialize(serializer),
            Dynamic::Unknown => serializer.serialize_str(UNKNOWN_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Dynamic::from(value))
    }
}

impl From<serde_json::Value> for Dynamic {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Dynamic::Null,
            serde_json::Value::Bool(b) => Dynamic::Bool(b),
            serde_json::Value::Number(n) => Dynamic::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) if s == UNKNOWN_SENTINEL => Dynamic::Unknown,
            serde_json::Value::String(s) => Dynamic::String(s),
            serde_json::Value::Array(items) => {
                Dynamic::List(items.into_iter().map(Dynamic::from).collect())
            }
            serde_json::Value::Object(fields) => Dynamic::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Dynamic::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Dynamic::String(value.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Dynamic::String(value)
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Dynamic::Bool(value)
    }
}

impl Dynamic {
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
            Dynamic::Unknown => "unknown",
        }
    }

    /// Null, unknown and empty collections all count as "not set"
    pub fn is_unset(&self) -> bool {
        match self {
            Dynamic::Null | Dynamic::Unknown => true,
            Dynamic::List(l) => l.is_empty(),
            _ => false,
        }
    }
}

/// DynamicValue wraps Dynamic and provides encoding/decoding capabilities
/// This is what gets passed between Terraform and the provider
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    pub fn unknown() -> Self {
        Self {
            value: Dynamic::Unknown,
        }
    }

    /// Empty object, the usual starting point for building state
    pub fn object() -> Self {
        Self {
            value: Dynamic::Map(HashMap::new()),
        }
    }

    pub fn from_json(value: serde_json::Value) -> Self {
        Self {
            value: Dynamic::from(value),
        }
    }

    pub fn encode_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.value)
            .map_err(|e| TfplugError::EncodingError(format!("json encoding failed: {}", e)))
    }

    pub fn decode_json(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::null());
        }
        let value = serde_json::from_slice(data)
            .map_err(|e| TfplugError::DecodingError(format!("json decoding failed: {}", e)))?;
        Ok(Self { value })
    }

    /// Type-safe accessors - use these instead of pattern matching
    /// These handle path navigation and type checking
    pub fn get(&self, path: &AttributePath) -> Result<&Dynamic> {
        self.navigate_path(path)
    }

    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::String(s) => Ok(s.clone()),
            _ => Err(mismatch("string", value)),
        }
    }

    pub fn get_number(&self, path: &AttributePath) -> Result<f64> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::Number(n) => Ok(*n),
            _ => Err(mismatch("number", value)),
        }
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::Bool(b) => Ok(*b),
            _ => Err(mismatch("bool", value)),
        }
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::List(l) => Ok(l.clone()),
            _ => Err(mismatch("list", value)),
        }
    }

    pub fn get_map(&self, path: &AttributePath) -> Result<HashMap<String, Dynamic>> {
        let value = self.navigate_path(path)?;
        match value {
            Dynamic::Map(m) => Ok(m.clone()),
            _ => Err(mismatch("map", value)),
        }
    }

    /// String attribute that may be absent or null
    pub fn get_optional_string(&self, path: &AttributePath) -> Result<Option<String>> {
        match self.navigate_path(path) {
            Ok(Dynamic::Null) | Ok(Dynamic::Unknown) => Ok(None),
            Ok(Dynamic::String(s)) => Ok(Some(s.clone())),
            Ok(other) => Err(mismatch("string", other)),
            Err(e) if e.is_missing() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Bool attribute falling back to `default` when absent or null
    pub fn get_bool_or(&self, path: &AttributePath, default: bool) -> Result<bool> {
        match self.navigate_path(path) {
            Ok(Dynamic::Null) | Ok(Dynamic::Unknown) => Ok(default),
            Ok(Dynamic::Bool(b)) => Ok(*b),
            Ok(other) => Err(mismatch("bool", other)),
            Err(e) if e.is_missing() => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// List or set of strings; absent or null yields an empty vector
    pub fn get_string_list(&self, path: &AttributePath) -> Result<Vec<String>> {
        let value = match self.navigate_path(path) {
            Ok(value) => value,
            Err(e) if e.is_missing() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        match value {
            Dynamic::Null | Dynamic::Unknown => Ok(Vec::new()),
            Dynamic::List(items) => items
                .iter()
                .map(|item| match item {
                    Dynamic::String(s) => Ok(s.clone()),
                    other => Err(mismatch("string", other)),
                })
                .collect(),
            other => Err(mismatch("list", other)),
        }
    }

    /// Single nested block (a list block limited to one item).
    /// Returns None when the block is absent, null or empty.
    pub fn get_block(&self, path: &AttributePath) -> Result<Option<DynamicValue>> {
        let value = match self.navigate_path(path) {
            Ok(value) => value,
            Err(e) if e.is_missing() => return Ok(None),
            Err(e) => return Err(e),
        };
        match value {
            Dynamic::Null | Dynamic::Unknown => Ok(None),
            Dynamic::Map(_) => Ok(Some(DynamicValue::new(value.clone()))),
            Dynamic::List(items) => match items.as_slice() {
                [] => Ok(None),
                [first] => Ok(Some(DynamicValue::new(first.clone()))),
                _ => Err(TfplugError::Custom(format!(
                    "expected at most one block, got {}",
                    items.len()
                ))),
            },
            other => Err(mismatch("block", other)),
        }
    }

    /// True when the attribute is present and set to something other than
    /// null, unknown or an empty collection
    pub fn is_set(&self, path: &AttributePath) -> bool {
        self.navigate_path(path)
            .map(|value| !value.is_unset())
            .unwrap_or(false)
    }

    /// Type-safe setters - use for building state/config objects
    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set_value(path, Dynamic::String(value))
    }

    pub fn set_number(&mut self, path: &AttributePath, value: f64) -> Result<()> {
        self.set_value(path, Dynamic::Number(value))
    }

    pub fn set_bool(&mut self, path: &AttributePath, value: bool) -> Result<()> {
        self.set_value(path, Dynamic::Bool(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::List(value))
    }

    pub fn set_string_list<I, S>(&mut self, path: &AttributePath, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = values
            .into_iter()
            .map(|s| Dynamic::String(s.into()))
            .collect();
        self.set_value(path, Dynamic::List(items))
    }

    pub fn set_map(&mut self, path: &AttributePath, value: HashMap<String, Dynamic>) -> Result<()> {
        self.set_value(path, Dynamic::Map(value))
    }

    pub fn set_null(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Null)
    }

    /// Helpers for handling unknown values during planning
    pub fn is_null(&self) -> bool {
        matches!(self.value, Dynamic::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.value, Dynamic::Unknown)
    }

    /// Mark computed values as unknown during planning
    pub fn mark_unknown(&mut self, path: &AttributePath) -> Result<()> {
        self.set_value(path, Dynamic::Unknown)
    }

    fn navigate_path<'a>(&'a self, path: &AttributePath) -> Result<&'a Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => m
                    .get(name)
                    .ok_or_else(|| TfplugError::AttributeNotFound(name.clone()))?,
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    let idx = *idx as usize;
                    l.get(idx).ok_or_else(|| {
                        TfplugError::AttributeNotFound(format!("[{}]", idx))
                    })?
                }
                (Dynamic::Null, AttributePathStep::AttributeName(name)) => {
                    return Err(TfplugError::AttributeNotFound(name.clone()))
                }
                (other, _) => {
                    return Err(TfplugError::InvalidPath(format!(
                        "cannot step into {} value",
                        other.type_name()
                    )))
                }
            };
        }

        Ok(current)
    }

    fn set_value(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        let (last, parents) = match path.steps.split_last() {
            Some(split) => split,
            None => {
                self.value = new_value;
                return Ok(());
            }
        };

        // For non-empty paths, ensure we have a map at the root
        if !matches!(self.value, Dynamic::Map(_) | Dynamic::List(_)) {
            self.value = Dynamic::Map(HashMap::new());
        }

        let mut current = &mut self.value;
        for (idx, step) in parents.iter().enumerate() {
            let next_is_index = matches!(
                path.steps.get(idx + 1),
                Some(AttributePathStep::ElementKeyInt(_))
            );
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name))
                | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                    let entry = m.entry(name.clone()).or_insert(Dynamic::Null);
                    if matches!(entry, Dynamic::Null) {
                        *entry = if next_is_index {
                            Dynamic::List(Vec::new())
                        } else {
                            Dynamic::Map(HashMap::new())
                        };
                    }
                    entry
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(i)) => {
                    let len = l.len();
                    l.get_mut(*i as usize).ok_or_else(|| {
                        TfplugError::InvalidPath(format!("list index {} out of bounds ({})", i, len))
                    })?
                }
                (other, _) => {
                    return Err(TfplugError::InvalidPath(format!(
                        "cannot step into {} value",
                        other.type_name()
                    )))
                }
            };
        }

        match (current, last) {
            (Dynamic::Map(m), AttributePathStep::AttributeName(name))
            | (Dynamic::Map(m), AttributePathStep::ElementKeyString(name)) => {
                m.insert(name.clone(), new_value);
                Ok(())
            }
            (Dynamic::List(l), AttributePathStep::ElementKeyInt(i)) => {
                let i = *i as usize;
                if i < l.len() {
                    l[i] = new_value;
                    Ok(())
                } else if i == l.len() {
                    l.push(new_value);
                    Ok(())
                } else {
                    Err(TfplugError::InvalidPath(format!(
                        "list index {} out of bounds ({})",
                        i,
                        l.len()
                    )))
                }
            }
            (other, _) => Err(TfplugError::InvalidPath(format!(
                "cannot set into {} value",
                other.type_name()
            ))),
        }
    }
}

fn mismatch(expected: &str, actual: &Dynamic) -> TfplugError {
    TfplugError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

/// AttributePath represents a path to an attribute within a DynamicValue
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.steps
            .push(AttributePathStep::ElementKeyString(key.to_string()));
        self
    }
}

impl std::fmt::Display for AttributePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                AttributePathStep::AttributeName(name) if i == 0 => write!(f, "{}", name)?,
                AttributePathStep::AttributeName(name) => write!(f, ".{}", name)?,
                AttributePathStep::ElementKeyString(key) => write!(f, "[\"{}\"]", key)?,
                AttributePathStep::ElementKeyInt(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// Individual step in an AttributePath
#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    /// Access attribute by name in object/map
    AttributeName(String),
    /// Access element by string key (for maps)
    ElementKeyString(String),
    /// Access element by integer index (for lists)
    ElementKeyInt(i64),
}

/// Diagnostic represents a warning or error from the provider
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// True when any diagnostic in the slice is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Invalid,
    Error,
    Warning,
}

/// ServerCapabilities indicates provider capabilities
#[derive(Debug, Clone, Default)]
pub struct ServerCapabilities {
    pub plan_destroy: bool,
    pub get_provider_schema_optional: bool,
}

/// ClientCapabilities indicates Terraform client capabilities
#[derive(Debug, Clone, Default)]
pub struct ClientCapabilities {
    pub deferral_allowed: bool,
    pub write_only_attributes_allowed: bool,
}

/// Config represents configuration values
pub type Config = DynamicValue;

/// State represents resource state values
pub type State = DynamicValue;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dynamic_value_string_access() {
        let mut dv = DynamicValue::object();
        dv.set_string(&AttributePath::new("name"), "test".to_string())
            .unwrap();

        let result = dv.get_string(&AttributePath::new("name")).unwrap();
        assert_eq!(result, "test");
    }

    #[test]
    fn dynamic_value_nested_access() {
        let mut dv = DynamicValue::object();
        let path = AttributePath::new("config").attribute("endpoint");
        dv.set_string(&path, "https://example.com".to_string())
            .unwrap();

        let result = dv.get_string(&path).unwrap();
        assert_eq!(result, "https://example.com");
    }

    #[test]
    fn missing_attribute_is_distinguished_from_wrong_type() {
        let dv = DynamicValue::from_json(json!({"name": 3}));

        let missing = dv.get_string(&AttributePath::new("other")).unwrap_err();
        assert!(missing.is_missing());

        let wrong = dv.get_string(&AttributePath::new("name")).unwrap_err();
        assert!(matches!(wrong, TfplugError::TypeMismatch { .. }));
    }

    #[test]
    fn optional_accessors_treat_null_as_absent() {
        let dv = DynamicValue::from_json(json!({"comment": null, "flag": null}));

        assert_eq!(
            dv.get_optional_string(&AttributePath::new("comment"))
                .unwrap(),
            None
        );
        assert_eq!(
            dv.get_optional_string(&AttributePath::new("absent"))
                .unwrap(),
            None
        );
        assert!(dv.get_bool_or(&AttributePath::new("flag"), true).unwrap());
        assert!(!dv.get_bool_or(&AttributePath::new("absent"), false).unwrap());
    }

    #[test]
    fn string_list_reads_sets_and_tolerates_null() {
        let dv = DynamicValue::from_json(json!({"privileges": ["USAGE", "MONITOR"], "roles": null}));

        assert_eq!(
            dv.get_string_list(&AttributePath::new("privileges"))
                .unwrap(),
            vec!["USAGE".to_string(), "MONITOR".to_string()]
        );
        assert!(dv
            .get_string_list(&AttributePath::new("roles"))
            .unwrap()
            .is_empty());
        assert!(dv
            .get_string_list(&AttributePath::new("users"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn single_block_accepts_list_or_object_form() {
        let as_list = DynamicValue::from_json(json!({"on_schema": [{"schema_name": "S"}]}));
        let as_object = DynamicValue::from_json(json!({"on_schema": {"schema_name": "S"}}));
        let empty = DynamicValue::from_json(json!({"on_schema": []}));

        for dv in [as_list, as_object] {
            let block = dv.get_block(&AttributePath::new("on_schema")).unwrap().unwrap();
            assert_eq!(
                block.get_string(&AttributePath::new("schema_name")).unwrap(),
                "S"
            );
        }
        assert!(empty
            .get_block(&AttributePath::new("on_schema"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn single_block_rejects_multiple_items() {
        let dv = DynamicValue::from_json(json!({"on_schema": [{}, {}]}));
        assert!(dv.get_block(&AttributePath::new("on_schema")).is_err());
    }

    #[test]
    fn set_value_builds_intermediate_lists() {
        let mut dv = DynamicValue::object();
        let path = AttributePath::new("on_schema").index(0).attribute("schema_name");
        dv.set_string(&path, "S".to_string()).unwrap();

        assert_eq!(dv.get_string(&path).unwrap(), "S");
        assert_eq!(dv.get_list(&AttributePath::new("on_schema")).unwrap().len(), 1);
    }

    #[test]
    fn json_encoding_preserves_unknown_marker() {
        let mut dv = DynamicValue::object();
        dv.mark_unknown(&AttributePath::new("id")).unwrap();

        let encoded = dv.encode_json().unwrap();
        let decoded = DynamicValue::decode_json(&encoded).unwrap();

        assert_eq!(decoded, dv);
        assert!(!decoded.is_set(&AttributePath::new("id")));
    }

    #[test]
    fn attribute_path_display() {
        let path = AttributePath::new("on_schema_object")
            .index(0)
            .attribute("future");
        assert_eq!(path.to_string(), "on_schema_object[0].future");
    }
}
