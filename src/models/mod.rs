//! Request and Response models for the dashboard API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ColumnSpec, ExportRequest, GridRequest, InvalidateRequest, SetRequest};
pub use responses::{
    CleanupResponse, DeleteResponse, ErrorResponse, GetResponse, GridViewResponse,
    HealthResponse, InvalidateResponse, SetResponse,
};
