//! Request DTOs for the dashboard API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::grid::{ColumnDef, DisplayFormat, ExportFormat, ExportOptions, GridConfig, GridState};

/// Longest key accepted by `PUT /cache`.
pub const MAX_KEY_LEN: usize = 256;

/// Request body for `PUT /cache`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value
    pub value: Value,
    /// Optional TTL in milliseconds
    #[serde(default, alias = "ttl_ms")]
    pub ttl_ms: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LEN {
            return Some(format!(
                "Key exceeds maximum length of {MAX_KEY_LEN} characters"
            ));
        }
        if self.ttl_ms == Some(0) {
            return Some("TTL must be greater than zero".to_string());
        }
        None
    }
}

/// Request body for `POST /cache/invalidate`
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Substring, or a regular expression when `regex` is set
    pub pattern: String,
    #[serde(default)]
    pub regex: bool,
}

impl InvalidateRequest {
    pub fn validate(&self) -> Option<String> {
        if self.pattern.is_empty() {
            return Some("Pattern cannot be empty".to_string());
        }
        None
    }
}

// == Column Spec ==
/// Wire form of a column definition over JSON rows.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub id: String,
    /// Defaults to the id
    #[serde(default)]
    pub header: Option<String>,
    /// Dotted field path; defaults to the id
    #[serde(default)]
    pub accessor: Option<String>,
    /// Column without data (selection box, action menu)
    #[serde(default)]
    pub presentational: bool,
    #[serde(default)]
    pub sortable: Option<bool>,
    #[serde(default)]
    pub hideable: Option<bool>,
    #[serde(default)]
    pub hidden_by_default: bool,
    #[serde(default)]
    pub format: Option<DisplayFormat>,
    #[serde(default)]
    pub filter_on_display: bool,
}

impl ColumnSpec {
    pub fn into_column(self) -> ColumnDef<Value> {
        let header = self.header.unwrap_or_else(|| self.id.clone());
        let mut column = if self.presentational {
            ColumnDef::presentational(self.id, header)
        } else {
            let path = self.accessor.unwrap_or_else(|| self.id.clone());
            ColumnDef::field_path(self.id, header, path)
        };

        if let Some(sortable) = self.sortable {
            column = column.sortable(sortable);
        }
        if let Some(hideable) = self.hideable {
            column = column.hideable(hideable);
        }
        if self.hidden_by_default {
            column = column.hidden_by_default();
        }
        if let Some(format) = self.format {
            column = column.format(format);
        }
        if self.filter_on_display {
            column = column.filter_on_display();
        }
        column
    }
}

// == Grid Request ==
/// Request body for `POST /grid/view`
#[derive(Debug, Clone, Deserialize)]
pub struct GridRequest {
    #[serde(default)]
    pub rows: Vec<Value>,
    pub columns: Vec<ColumnSpec>,
    /// Fresh state with the configured page size when absent
    #[serde(default)]
    pub state: Option<GridState>,
    /// Server defaults apply when absent
    #[serde(default)]
    pub config: Option<GridConfig>,
}

impl GridRequest {
    pub fn validate(&self) -> Option<String> {
        if self.columns.is_empty() {
            return Some("At least one column is required".to_string());
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.id.is_empty() {
                return Some("Column id cannot be empty".to_string());
            }
            if !seen.insert(column.id.as_str()) {
                return Some(format!("Duplicate column id '{}'", column.id));
            }
        }
        None
    }
}

/// Request body for `POST /grid/export`
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    #[serde(flatten)]
    pub grid: GridRequest,
    pub format: ExportFormat,
    /// Falls back to the grid config's export options
    #[serde(default)]
    pub options: Option<ExportOptions>,
}
