//! API Handlers
//!
//! HTTP request handlers for the cache and grid endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheStore, FileSnapshotStorage, KeyPattern, SharedCache};
use crate::config::Config;
use crate::error::{ApiError, CacheError, Result};
use crate::grid::{DataGrid, GridConfig};
use crate::models::{
    CleanupResponse, DeleteResponse, ExportRequest, GetResponse, GridRequest, GridViewResponse,
    HealthResponse, InvalidateRequest, InvalidateResponse, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache of JSON values
    pub cache: SharedCache<Value>,
    /// Grid configuration used when a request carries none
    pub grid_defaults: Arc<GridConfig>,
}

impl AppState {
    pub fn new(cache: SharedCache<Value>) -> Self {
        Self {
            cache,
            grid_defaults: Arc::new(GridConfig::default()),
        }
    }

    pub fn with_grid_defaults(mut self, grid_defaults: GridConfig) -> Self {
        self.grid_defaults = Arc::new(grid_defaults);
        self
    }

    /// Builds the cache from configuration, file-backed when persistence
    /// is enabled.
    pub fn from_config(config: &Config) -> std::result::Result<Self, CacheError> {
        let store = if config.cache.enable_persistence {
            let storage = FileSnapshotStorage::new(&config.snapshot_dir);
            CacheStore::with_storage(config.cache.clone(), Arc::new(storage))?
        } else {
            CacheStore::new(config.cache.clone())?
        };

        let mut grid_defaults = GridConfig::default();
        grid_defaults.pagination.page_size = config.grid_page_size.max(1);

        Ok(Self::new(SharedCache::new(store)).with_grid_defaults(grid_defaults))
    }

    fn build_grid(&self, req: GridRequest) -> Result<DataGrid<Value>> {
        if let Some(error_msg) = req.validate() {
            return Err(ApiError::InvalidRequest(error_msg));
        }
        let config = req
            .config
            .unwrap_or_else(|| self.grid_defaults.as_ref().clone());
        let columns = req.columns.into_iter().map(|c| c.into_column()).collect();

        let grid = DataGrid::new(req.rows, columns, config);
        Ok(match req.state {
            Some(grid_state) => grid.with_state(grid_state),
            None => grid,
        })
    }
}

// == Cache Handlers ==
/// Handler for PUT /cache
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    state.cache.set(req.key.clone(), req.value, req.ttl_ms).await;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(ApiError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.cache.delete(&key).await {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(ApiError::NotFound(key))
    }
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let pattern = if req.regex {
        KeyPattern::regex(&req.pattern)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid pattern: {e}")))?
    } else {
        KeyPattern::from(req.pattern.as_str())
    };

    let removed = state.cache.invalidate_pattern(pattern).await;
    info!("Invalidated {} keys matching '{}'", removed, req.pattern);

    Ok(Json(InvalidateResponse {
        pattern: req.pattern,
        removed,
    }))
}

/// Handler for POST /cache/cleanup
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    Json(state.cache.run_cleanup().await.into())
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats().await)
}

// == Grid Handlers ==
/// Handler for POST /grid/view
pub async fn grid_view_handler(
    State(state): State<AppState>,
    Json(req): Json<GridRequest>,
) -> Result<Json<GridViewResponse>> {
    let grid = state.build_grid(req)?;
    let view = grid.view();
    debug!(
        "Grid view: {} of {} rows, page {}/{}",
        view.filtered_count,
        view.total_count,
        view.page_index + 1,
        view.page_count.max(1)
    );

    Ok(Json(GridViewResponse::new(
        &view,
        grid.state(),
        grid.config().pagination.page_size_options.clone(),
    )))
}

/// Handler for POST /grid/export
///
/// Responds with the encoded file as an attachment.
pub async fn grid_export_handler(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> Result<Response> {
    let grid = state.build_grid(req.grid)?;
    let options = req
        .options
        .unwrap_or_else(|| grid.config().export_options.clone());

    let output = grid.export_rows(req.format, &options)?;
    info!(
        "Exported {} ({} bytes{})",
        output.filename,
        output.bytes.len(),
        if output.fell_back_to_csv { ", as CSV" } else { "" }
    );

    let disposition = format!(
        "attachment; filename=\"{}\"",
        output.filename.replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, output.mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        output.bytes,
    )
        .into_response())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
