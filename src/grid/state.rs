//! Grid state and configuration.
//!
//! `GridState` is the mutable half of the view tuple; everything the view
//! shows is derived from it plus the rows and the schema.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::grid::export::ExportOptions;
use crate::grid::CellValue;

/// Stable per-row key used for selection.
pub type RowId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
        }
    }

    pub fn asc(column_id: impl Into<String>) -> Self {
        Self::new(column_id, SortDirection::Asc)
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self::new(column_id, SortDirection::Desc)
    }
}

// == Filter Value ==
/// A per-column filter. All variants compare against the column's
/// stringified cell text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FilterValue {
    /// Case-insensitive substring
    Contains(String),
    /// Exact text equality
    Equals(CellValue),
    /// Exact equality with any of the values (faceted filters)
    OneOf(Vec<CellValue>),
}

impl FilterValue {
    /// An empty filter matches everything and is dropped from the state.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Contains(text) => text.is_empty(),
            FilterValue::Equals(_) => false,
            FilterValue::OneOf(values) => values.is_empty(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            FilterValue::Contains(needle) => contains_ignore_case(text, needle),
            FilterValue::Equals(expected) => expected.to_string() == text,
            FilterValue::OneOf(values) => values.iter().any(|v| v.to_string() == text),
        }
    }
}

/// Case-insensitive substring test shared by column and global filters.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: 10,
        }
    }
}

// == Grid State ==
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridState {
    pub sorting: Vec<SortKey>,
    pub column_filters: BTreeMap<String, FilterValue>,
    pub global_filter: String,
    /// Explicit visibility overrides; absent columns use their default
    pub column_visibility: BTreeMap<String, bool>,
    pub row_selection: BTreeSet<RowId>,
    pub pagination: Pagination,
}

impl GridState {
    pub fn is_filtered(&self) -> bool {
        !self.column_filters.is_empty()
    }
}

// == Grid Config ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    pub enabled: bool,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: 10,
            page_size_options: vec![10, 20, 30, 40, 50],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    pub enable_global_filter: bool,
    /// When set, the search box filters this column instead of all columns
    pub search_key: Option<String>,
    pub search_placeholder: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enable_global_filter: true,
            search_key: None,
            search_placeholder: "Search...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub enable_sorting: bool,
    pub enable_row_selection: bool,
    pub enable_column_visibility: bool,
    pub pagination: PaginationConfig,
    pub enable_export: bool,
    pub export_options: ExportOptions,
    pub filter_config: FilterConfig,
    /// Field holding the row identity; row position is used when unset
    pub row_id_field: Option<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enable_sorting: true,
            enable_row_selection: true,
            enable_column_visibility: true,
            pagination: PaginationConfig::default(),
            enable_export: true,
            export_options: ExportOptions::default(),
            filter_config: FilterConfig::default(),
            row_id_field: Some("id".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_case_insensitive() {
        let filter = FilterValue::Contains("VILLA".to_string());
        assert!(filter.matches("Seaside villa"));
        assert!(!filter.matches("Loft"));
    }

    #[test]
    fn test_equals_compares_stringified() {
        let filter = FilterValue::Equals(CellValue::Int(3));
        assert!(filter.matches("3"));
        assert!(!filter.matches("30"));
    }

    #[test]
    fn test_one_of() {
        let filter = FilterValue::OneOf(vec!["sold".into(), "pending".into()]);
        assert!(filter.matches("sold"));
        assert!(!filter.matches("available"));
    }

    #[test]
    fn test_empty_filters() {
        assert!(FilterValue::Contains(String::new()).is_empty());
        assert!(FilterValue::OneOf(vec![]).is_empty());
        assert!(!FilterValue::Equals(CellValue::Null).is_empty());
    }

    #[test]
    fn test_state_deserializes_from_partial_json() {
        let state: GridState = serde_json::from_str(
            r#"{
                "sorting": [{"columnId": "price", "direction": "desc"}],
                "columnFilters": {"status": {"kind": "oneOf", "value": ["sold"]}},
                "pagination": {"pageIndex": 2, "pageSize": 20}
            }"#,
        )
        .unwrap();

        assert_eq!(state.sorting, vec![SortKey::desc("price")]);
        assert!(state.is_filtered());
        assert_eq!(state.pagination.page_index, 2);
        assert!(state.global_filter.is_empty());
    }

    #[test]
    fn test_config_defaults() {
        let config = GridConfig::default();
        assert!(config.enable_sorting);
        assert_eq!(config.pagination.page_size, 10);
        assert_eq!(config.filter_config.search_placeholder, "Search...");
    }
}
