//! SQL API response bodies and decoded result sets

use super::ApiError;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::HashMap;

/// Body returned by `POST /api/v2/statements` and `GET /api/v2/statements/{handle}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub sql_state: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub statement_handle: Option<String>,
    #[serde(default)]
    pub result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    pub data: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetMetaData {
    /// One entry per result partition; only the count is used
    #[serde(default)]
    pub partition_info: Vec<IgnoredAny>,
    #[serde(default)]
    pub row_type: Vec<ColumnType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnType {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: String,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sql_state: Option<String>,
    #[serde(default)]
    pub statement_handle: Option<String>,
}

/// Decoded result set with rows addressable by column name
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_response(response: &StatementResponse) -> Self {
        let columns = response
            .result_set_meta_data
            .as_ref()
            .map(|meta| meta.row_type.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default();
        let mut result = Self::new(columns);
        result.extend(response.data.clone());
        result
    }

    /// Append raw rows, typically from a later partition
    pub fn extend(&mut self, data: Vec<Vec<Option<String>>>) {
        let index: HashMap<String, usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_ascii_lowercase(), i))
            .collect();
        let index = std::sync::Arc::new(index);
        self.rows.extend(data.into_iter().map(|values| Row {
            index: index.clone(),
            values,
        }));
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Row {
    index: std::sync::Arc<HashMap<String, usize>>,
    values: Vec<Option<String>>,
}

impl Row {
    /// Value of a column, matched case-insensitively. Null and absent
    /// columns both yield None.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.index
            .get(&column.to_ascii_lowercase())
            .and_then(|&i| self.values.get(i))
            .and_then(|v| v.as_deref())
    }

    /// Value of a column, or an empty string when null or absent
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn require(&self, column: &str) -> Result<&str, ApiError> {
        self.get(column)
            .ok_or_else(|| ApiError::ParseError(format!("missing column '{}' in result row", column)))
    }

    /// Snowflake renders booleans as "true"/"false"
    pub fn get_bool(&self, column: &str) -> bool {
        self.get(column)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}
