//! Schema types and builders for tfplug
//!
//! This module provides the schema system for describing provider, resource
//! and data source configuration: attribute types, nested blocks, the
//! validation the host would otherwise perform, and requires-replace planning.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

/// AttributeType defines the type system for Terraform attributes
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

/// Block represents a configuration block
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
    pub deprecated: bool,
}

/// Attribute represents a single configuration attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Changing the value destroys and recreates the resource
    pub requires_replace: bool,
    /// Sibling attribute or block names that may not be set together with this one
    pub conflicts_with: Vec<String>,
    pub deprecated: bool,
}

/// NestedBlock represents a nested configuration block
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: i64,
    /// Zero means unbounded
    pub max_items: i64,
    pub requires_replace: bool,
}

/// NestingMode defines how nested blocks are structured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    Single,
    List,
    Set,
}

impl Block {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, name: &str) -> Option<&NestedBlock> {
        self.block_types.iter().find(|b| b.type_name == name)
    }

    /// Check a configuration object against this block.
    ///
    /// Reports missing required attributes, conflicting attributes that are
    /// both set, and nested blocks outside their item bounds. Unknown values
    /// are never reported as missing.
    pub fn validate(&self, config: &DynamicValue, path: &AttributePath) -> Vec<Diagnostic> {
        let mut diagnostics = vec![];

        for attr in &self.attributes {
            let attr_path = child_path(path, &attr.name);
            let value = config.get(&AttributePath::new(&attr.name)).ok();

            if attr.required && !attr.computed {
                let missing = matches!(value, None | Some(Dynamic::Null));
                if missing {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!("The argument \"{}\" is required", attr_path),
                        )
                        .with_attribute(attr_path.clone()),
                    );
                }
            }

            if !config.is_set(&AttributePath::new(&attr.name)) {
                continue;
            }
            for other in &attr.conflicts_with {
                // Report each mutually declared pair once
                let reported_by_other = other < &attr.name
                    && self
                        .attribute(other)
                        .map(|o| o.conflicts_with.contains(&attr.name))
                        .unwrap_or(false);
                if config.is_set(&AttributePath::new(other)) && !reported_by_other {
                    diagnostics.push(
                        Diagnostic::error(
                            "Conflicting configuration arguments",
                            format!("\"{}\": conflicts with {}", attr_path, other),
                        )
                        .with_attribute(attr_path.clone()),
                    );
                }
            }
        }

        for nested in &self.block_types {
            let block_path = child_path(path, &nested.type_name);
            let items = match config.get(&AttributePath::new(&nested.type_name)) {
                Ok(Dynamic::List(items)) => items.clone(),
                Ok(single @ Dynamic::Map(_)) => vec![single.clone()],
                _ => vec![],
            };

            let count = items.len() as i64;
            if count < nested.min_items {
                diagnostics.push(
                    Diagnostic::error(
                        "Insufficient blocks",
                        format!(
                            "At least {} \"{}\" blocks are required",
                            nested.min_items, block_path
                        ),
                    )
                    .with_attribute(block_path.clone()),
                );
            }
            if nested.max_items > 0 && count > nested.max_items {
                diagnostics.push(
                    Diagnostic::error(
                        "Too many blocks",
                        format!(
                            "No more than {} \"{}\" blocks are allowed",
                            nested.max_items, block_path
                        ),
                    )
                    .with_attribute(block_path.clone()),
                );
            }

            for (idx, item) in items.into_iter().enumerate() {
                let item_path = block_path.clone().index(idx as i64);
                let item_value = DynamicValue::new(item);
                diagnostics.extend(nested.block.validate(&item_value, &item_path));
            }
        }

        diagnostics
    }
}

impl Schema {
    pub fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        self.block.validate(config, &AttributePath::root())
    }

    /// Top-level attributes and blocks marked requires-replace whose value
    /// differs between prior state and the proposed new state
    pub fn replacement_paths(
        &self,
        prior: &DynamicValue,
        proposed: &DynamicValue,
    ) -> Vec<AttributePath> {
        if prior.is_null() {
            return vec![];
        }

        let names = self
            .block
            .attributes
            .iter()
            .filter(|a| a.requires_replace)
            .map(|a| a.name.as_str())
            .chain(
                self.block
                    .block_types
                    .iter()
                    .filter(|b| b.requires_replace)
                    .map(|b| b.type_name.as_str()),
            );

        names
            .filter(|name| {
                let path = AttributePath::new(name);
                let before = prior.get(&path).ok();
                let after = proposed.get(&path).ok();
                differs(before, after)
            })
            .map(AttributePath::new)
            .collect()
    }
}

fn differs(before: Option<&Dynamic>, after: Option<&Dynamic>) -> bool {
    let unset = |v: Option<&Dynamic>| v.map(Dynamic::is_unset).unwrap_or(true);
    match (before, after) {
        (_, Some(Dynamic::Unknown)) => false,
        (b, a) if unset(b) && unset(a) => false,
        (Some(b), Some(a)) => b != a,
        _ => true,
    }
}

fn child_path(parent: &AttributePath, name: &str) -> AttributePath {
    parent.clone().attribute(name)
}

/// AttributeBuilder provides fluent API for building attributes
/// Use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                requires_replace: false,
                conflicts_with: Vec::new(),
                deprecated: false,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.attribute.requires_replace = true;
        self
    }

    pub fn conflicts_with(mut self, names: &[&str]) -> Self {
        self.attribute
            .conflicts_with
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// NestedBlockBuilder builds list blocks, optionally nested in each other
pub struct NestedBlockBuilder {
    nested: NestedBlock,
}

impl NestedBlockBuilder {
    pub fn new(type_name: &str) -> Self {
        Self {
            nested: NestedBlock {
                type_name: type_name.to_string(),
                block: Block::default(),
                nesting: NestingMode::List,
                min_items: 0,
                max_items: 0,
                requires_replace: false,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.nested.block.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.nested.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.nested.block.block_types.push(block);
        self
    }

    pub fn min_items(mut self, min: i64) -> Self {
        self.nested.min_items = min;
        self
    }

    pub fn max_items(mut self, max: i64) -> Self {
        self.nested.max_items = max;
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.nested.requires_replace = true;
        self
    }

    pub fn build(self) -> NestedBlock {
        self.nested
    }
}

/// SchemaBuilder provides fluent API for building schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block::default(),
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.schema.block.block_types.push(block);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
