//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: sweeps expired entries from every namespace at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
