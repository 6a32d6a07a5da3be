//! Snowflake identifier parsing and quoting
//!
//! Names arrive bare (`MY_SCHEMA`), quoted (`"my schema"`) or dotted
//! (`SCHEMA.TABLE`, `"S"."T"`). Every part is rendered double-quoted so the
//! name reaches Snowflake exactly as written.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier '{0}' has an empty part")]
    EmptyPart(String),

    #[error("identifier '{0}' has an unterminated quote")]
    UnterminatedQuote(String),

    #[error("identifier '{name}' must have {expected} parts, found {found}")]
    PartCount {
        name: String,
        expected: &'static str,
        found: usize,
    },
}

/// Double-quote one identifier part, doubling embedded quotes
pub fn quote_ident(part: &str) -> String {
    format!("\"{}\"", part.replace('"', "\"\""))
}

/// Single-quote a string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Split a dotted name into its unquoted parts
pub fn parse_qualified(name: &str) -> Result<Vec<String>, IdentifierError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted_part = false;
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if current.is_empty() && !quoted_part => {
                quoted_part = true;
                let mut closed = false;
                while let Some(q) = chars.next() {
                    if q == '"' {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            current.push('"');
                        } else {
                            closed = true;
                            break;
                        }
                    } else {
                        current.push(q);
                    }
                }
                if !closed {
                    return Err(IdentifierError::UnterminatedQuote(name.to_string()));
                }
            }
            '.' => {
                if current.is_empty() {
                    return Err(IdentifierError::EmptyPart(name.to_string()));
                }
                parts.push(std::mem::take(&mut current));
                quoted_part = false;
            }
            other => current.push(other),
        }
    }

    if current.is_empty() {
        return Err(IdentifierError::EmptyPart(name.to_string()));
    }
    parts.push(current);
    Ok(parts)
}

fn render(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| quote_ident(p))
        .collect::<Vec<_>>()
        .join(".")
}

/// `"DB"."SCHEMA"`; a one-part schema name is placed in `database`
pub fn qualified_schema(database: &str, schema: &str) -> Result<String, IdentifierError> {
    let parts = parse_qualified(schema)?;
    match parts.len() {
        1 => Ok(format!("{}.{}", quote_ident(database), render(&parts))),
        2 => Ok(render(&parts)),
        found => Err(IdentifierError::PartCount {
            name: schema.to_string(),
            expected: "1 or 2",
            found,
        }),
    }
}

/// `"DB"."SCHEMA"."OBJECT"`; a two-part object name is placed in `database`
pub fn qualified_object(database: &str, object: &str) -> Result<String, IdentifierError> {
    let parts = parse_qualified(object)?;
    match parts.len() {
        2 => Ok(format!("{}.{}", quote_ident(database), render(&parts))),
        3 => Ok(render(&parts)),
        found => Err(IdentifierError::PartCount {
            name: object.to_string(),
            expected: "2 or 3",
            found,
        }),
    }
}

/// Fully qualified database role name
pub fn database_role(database: &str, role: &str) -> String {
    format!("{}.{}", quote_ident(database), quote_ident(role))
}

/// Last part of a possibly qualified name, as SHOW output may render a
/// grantee either way
pub fn unqualified(name: &str) -> String {
    parse_qualified(name)
        .ok()
        .and_then(|mut parts| parts.pop())
        .unwrap_or_else(|| name.to_string())
}
