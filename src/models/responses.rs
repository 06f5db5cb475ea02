//! Response DTOs for the dashboard API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::SweepReport;
use crate::grid::{GridState, GridView, RenderedTable, SortKey};

/// Response body for `GET /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for `PUT /cache`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for `DELETE /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for `POST /cache/invalidate`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub pattern: String,
    /// Number of keys removed
    pub removed: usize,
}

/// Response body for `POST /cache/cleanup`
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub expired: usize,
    pub evicted: usize,
    pub persisted: bool,
}

impl From<SweepReport> for CleanupResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            expired: report.expired,
            evicted: report.evicted,
            persisted: report.persisted,
        }
    }
}

// == Grid View Response ==
/// Response body for `POST /grid/view`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridViewResponse {
    /// Raw records on the current page
    pub rows: Vec<Value>,
    /// Display text for the visible columns
    pub table: RenderedTable,
    pub total_count: usize,
    pub filtered_count: usize,
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub page_size_options: Vec<usize>,
    pub can_previous_page: bool,
    pub can_next_page: bool,
    pub is_filtered: bool,
    pub selected_count: usize,
    pub all_page_selected: bool,
    pub some_page_selected: bool,
    pub sorting: Vec<SortKey>,
    /// State after clamping, for the caller to send back next time
    pub state: GridState,
}

impl GridViewResponse {
    pub fn new(
        view: &GridView<'_, Value>,
        state: &GridState,
        page_size_options: Vec<usize>,
    ) -> Self {
        let mut state = state.clone();
        state.pagination.page_index = view.page_index;

        Self {
            rows: view.rows.iter().map(|r| r.record.clone()).collect(),
            table: view.render(),
            total_count: view.total_count,
            filtered_count: view.filtered_count,
            page_index: view.page_index,
            page_size: view.page_size,
            page_count: view.page_count,
            page_size_options,
            can_previous_page: view.can_previous_page(),
            can_next_page: view.can_next_page(),
            is_filtered: view.is_filtered,
            selected_count: view.selected_count,
            all_page_selected: view.all_page_selected(),
            some_page_selected: view.some_page_selected(),
            sorting: state.sorting.clone(),
            state,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{compute_view, ColumnDef, GridConfig};
    use serde_json::json;

    #[test]
    fn test_set_response_serialize() {
        let json = serde_json::to_string(&SetResponse::new("user:1")).unwrap();
        assert!(json.contains("user:1"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_cleanup_response_from_report() {
        let resp = CleanupResponse::from(SweepReport {
            expired: 2,
            evicted: 1,
            persisted: false,
        });
        assert_eq!(resp.expired, 2);
        assert_eq!(resp.evicted, 1);
    }

    #[test]
    fn test_grid_view_response_reports_clamped_state() {
        let rows: Vec<Value> = (0..12).map(|i| json!({"id": i, "name": format!("n{i}")})).collect();
        let columns = vec![ColumnDef::field("name", "Name")];
        let mut state = GridState::default();
        state.pagination.page_index = 7;

        let view = compute_view(&rows, &columns, &state, &GridConfig::default());
        let resp = GridViewResponse::new(&view, &state, vec![10, 20]);

        assert_eq!(resp.page_index, 1);
        assert_eq!(resp.state.pagination.page_index, 1);
        assert_eq!(resp.rows.len(), 2);
        assert!(!resp.can_next_page);

        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["filteredCount"], 12);
        assert_eq!(value["table"]["body"]["kind"], "rows");
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&ErrorResponse::new("Something went wrong")).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
