//! Dashboard Engine
//!
//! Data grid and TTL cache engines behind an admin dashboard for property
//! listings and site content, plus the REST-backed services that feed
//! them.

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod grid;
pub mod models;
pub mod services;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
