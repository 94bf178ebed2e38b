//! Response DTOs for the diagnostics API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{AllStats, CacheStats};
use crate::registry::{CleanupReport, Namespace};

/// Response body for one namespace's stats (GET /stats/:namespace)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the stats of every namespace (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct AllStatsResponse {
    pub api: StatsResponse,
    pub ui: StatsResponse,
    pub data: StatsResponse,
    pub total_size: usize,
    pub total_access_count: u64,
}

impl AllStatsResponse {
    pub fn new(all: AllStats) -> Self {
        Self {
            total_size: all.total_size(),
            total_access_count: all.total_access_count(),
            api: StatsResponse::new(all.api),
            ui: StatsResponse::new(all.ui),
            data: StatsResponse::new(all.data),
        }
    }
}

/// Response body for key listings (GET /keys/:namespace)
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub namespace: Namespace,
    pub count: usize,
    pub keys: Vec<String>,
}

impl KeysResponse {
    pub fn new(namespace: Namespace, keys: Vec<String>) -> Self {
        Self {
            namespace,
            count: keys.len(),
            keys,
        }
    }
}

/// Response body for the DELETE operation (DELETE /keys/:namespace/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    pub fn new(namespace: Namespace, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted from '{}'", key, namespace),
            key,
        }
    }
}

/// Response body for pattern invalidation (POST /invalidate)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub pattern: String,
    /// Keys removed across all namespaces
    pub removed: usize,
}

/// Response body for a manual sweep (POST /cleanup)
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub removed: usize,
    #[serde(flatten)]
    pub report: CleanupReport,
}

impl CleanupResponse {
    pub fn new(report: CleanupReport) -> Self {
        Self {
            removed: report.total(),
            report,
        }
    }
}

/// Response body for clearing every namespace (DELETE /clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

/// Response body for the health endpoint (GET /health)
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
