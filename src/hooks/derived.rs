//! Derived-value bindings
//!
//! Synchronous helpers that memoize values computed from a collection. Keys
//! combine a binding name, a fingerprint of the items and the caller's
//! dependencies, and results live in the registry's `ui` cache so a fresh
//! binding asking for a key that was already computed reuses the result.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::Hash;
use std::time::Duration;

use serde::Serialize;

use crate::cache::{cache_key, fingerprint, KeyPart};
use crate::registry::CacheRegistry;

// == Cached Computation ==
/// A memoized value bound to one consumer.
///
/// Keeps the last `(key, value)` pair locally; when the dependencies change
/// it goes through the registry, which may already hold the value.
#[derive(Debug)]
pub struct CachedComputation<T> {
    registry: CacheRegistry,
    name: String,
    ttl: Option<Duration>,
    memo: Option<(String, T)>,
}

impl<T> CachedComputation<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(registry: &CacheRegistry, name: impl Into<String>) -> Self {
        Self {
            registry: registry.clone(),
            name: name.into(),
            ttl: None,
            memo: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Returns the value for `deps`, running `compute` only on a full miss.
    pub fn get<F>(&mut self, deps: &[KeyPart], compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        let key = cache_key(&self.name, deps);
        if let Some((memo_key, value)) = &self.memo {
            if *memo_key == key {
                return value.clone();
            }
        }

        let value = self.registry.cached_computation(&key, compute, self.ttl);
        self.memo = Some((key, value.clone()));
        value
    }

    /// Key of the memoized value, if any.
    pub fn key(&self) -> Option<&str> {
        self.memo.as_ref().map(|(key, _)| key.as_str())
    }
}

fn derived_key<T: Hash>(kind: &str, name: &str, items: &[T], deps: &[KeyPart]) -> String {
    cache_key(
        &format!("{kind}-{name}"),
        &[fingerprint(items), KeyPart::List(deps.to_vec())],
    )
}

// == Search ==
/// Items whose fields contain `query`, case-insensitively.
///
/// A blank query matches everything.
pub fn cached_search<T, F>(
    registry: &CacheRegistry,
    name: &str,
    items: &[T],
    query: &str,
    fields: F,
) -> Vec<T>
where
    T: Clone + Hash + Send + Sync + 'static,
    F: Fn(&T) -> Vec<String>,
{
    let needle = query.trim().to_lowercase();
    let key = derived_key("search", name, items, &[KeyPart::from(needle.as_str())]);

    registry.cached_computation(
        &key,
        || {
            if needle.is_empty() {
                return items.to_vec();
            }
            items
                .iter()
                .filter(|item| {
                    fields(item)
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
                })
                .cloned()
                .collect()
        },
        None,
    )
}

// == Filter ==
/// Items matching `predicate`. `deps` must describe the predicate.
pub fn cached_filter<T, P>(
    registry: &CacheRegistry,
    name: &str,
    items: &[T],
    deps: &[KeyPart],
    predicate: P,
) -> Vec<T>
where
    T: Clone + Hash + Send + Sync + 'static,
    P: Fn(&T) -> bool,
{
    let key = derived_key("filter", name, items, deps);
    registry.cached_computation(
        &key,
        || items.iter().filter(|item| predicate(item)).cloned().collect(),
        None,
    )
}

// == Sort ==
/// A stably sorted copy of `items`. `deps` must describe the ordering.
pub fn cached_sort<T, C>(
    registry: &CacheRegistry,
    name: &str,
    items: &[T],
    deps: &[KeyPart],
    compare: C,
) -> Vec<T>
where
    T: Clone + Hash + Send + Sync + 'static,
    C: FnMut(&T, &T) -> Ordering,
{
    let key = derived_key("sort", name, items, deps);
    registry.cached_computation(
        &key,
        || {
            let mut sorted = items.to_vec();
            sorted.sort_by(compare);
            sorted
        },
        None,
    )
}

// == Stats ==
/// An aggregate computed over `items`.
pub fn cached_stats<T, S, C>(
    registry: &CacheRegistry,
    name: &str,
    items: &[T],
    deps: &[KeyPart],
    compute: C,
) -> S
where
    T: Hash,
    S: Clone + Send + Sync + 'static,
    C: FnOnce(&[T]) -> S,
{
    let key = derived_key("stats", name, items, deps);
    registry.cached_computation(&key, || compute(items), None)
}

// == Group ==
/// Items bucketed by `group_by`, buckets ordered by key, items in input order.
pub fn cached_group<T, G>(
    registry: &CacheRegistry,
    name: &str,
    items: &[T],
    deps: &[KeyPart],
    group_by: G,
) -> BTreeMap<String, Vec<T>>
where
    T: Clone + Hash + Send + Sync + 'static,
    G: Fn(&T) -> String,
{
    let key = derived_key("group", name, items, deps);
    registry.cached_computation(
        &key,
        || {
            let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
            for item in items {
                groups.entry(group_by(item)).or_default().push(item.clone());
            }
            groups
        },
        None,
    )
}

// == Pagination ==
/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number after clamping
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Slices `items` into pages of `page_size` and returns page `page` (1-based).
///
/// Out-of-range pages are clamped; a zero page size is treated as one.
pub fn cached_pagination<T>(
    registry: &CacheRegistry,
    name: &str,
    items: &[T],
    page: usize,
    page_size: usize,
) -> Page<T>
where
    T: Clone + Hash + Send + Sync + 'static,
{
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);
    let page = page.clamp(1, total_pages.max(1));

    let key = derived_key(
        "page",
        name,
        items,
        &[KeyPart::from(page), KeyPart::from(page_size)],
    );
    registry.cached_computation(
        &key,
        || {
            let start = (page - 1) * page_size;
            let end = (start + page_size).min(total_items);
            Page {
                items: items[start.min(total_items)..end].to_vec(),
                page,
                page_size,
                total_items,
                total_pages,
                has_next: page < total_pages,
                has_previous: page > 1,
            }
        },
        None,
    )
}
