//! Hooks Module
//!
//! Lifecycle bindings over a `CacheRegistry`:
//! - derived values memoized in the `ui` cache
//! - async queries with observable `{data, loading, error}` state
//! - optimistic updates with rollback and commit

mod derived;
mod optimistic;
mod query;

pub use derived::{
    cached_filter, cached_group, cached_pagination, cached_search, cached_sort, cached_stats,
    CachedComputation, Page,
};
pub use optimistic::OptimisticQuery;
pub use query::{cached_multiple, CachedQuery, QueryState};
