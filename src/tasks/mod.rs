//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache cleanup: TTL sweep, capacity eviction and snapshot at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
