//! API Module
//!
//! HTTP handlers and routing for the cache diagnostics API. Cached values
//! are never exposed; only keys, stats and maintenance operations are.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
