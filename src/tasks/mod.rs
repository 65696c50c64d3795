//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Stale sweep: Drops cache entries older than a maximum age

mod sweep;

pub use sweep::spawn_sweep_task;
