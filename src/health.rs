//! Health checks for the storage backend and the machine levels

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::error;
use serde::Serialize;
use serde_json::json;

use crate::machine::CoffeeMachine;
use crate::storage::StateStore;

/// Levels below this percentage degrade the machine check
pub const LOW_LEVEL_PERCENT: f64 = 10.0;

/// Health of one check, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Result of a single check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Aggregated health report
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Worst status among the checks
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: i64,
    pub checks: BTreeMap<&'static str, CheckResult>,
}

/// Runs the health checks
pub struct HealthChecker {
    store: Arc<dyn StateStore>,
    started_at: DateTime<Utc>,
}

impl HealthChecker {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            started_at: Utc::now(),
        }
    }

    pub async fn check(&self, machine: &CoffeeMachine) -> HealthReport {
        let mut checks = BTreeMap::new();
        checks.insert("storage", self.check_storage().await);
        checks.insert("machine", check_machine(machine).await);

        let status = checks
            .values()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        let now = Utc::now();

        HealthReport {
            status,
            timestamp: now,
            uptime_seconds: (now - self.started_at).num_seconds(),
            checks,
        }
    }

    async fn check_storage(&self) -> CheckResult {
        let mut details = serde_json::Map::new();
        details.insert("type".to_string(), json!(self.store.kind()));

        match self.store.load().await {
            Ok(_) => CheckResult {
                status: HealthStatus::Healthy,
                message: Some("Storage accessible".to_string()),
                warnings: Vec::new(),
                details,
            },
            Err(e) => {
                error!("Storage health check failed: {}", e);
                CheckResult {
                    status: HealthStatus::Unhealthy,
                    message: Some(format!("Storage error: {}", e)),
                    warnings: Vec::new(),
                    details,
                }
            }
        }
    }
}

async fn check_machine(machine: &CoffeeMachine) -> CheckResult {
    let status = machine.status().await;
    let mut warnings = Vec::new();

    if status.water.percentage < LOW_LEVEL_PERCENT {
        warnings.push("Water level critically low".to_string());
    }
    if status.coffee.percentage < LOW_LEVEL_PERCENT {
        warnings.push("Coffee level critically low".to_string());
    }

    let mut details = serde_json::Map::new();
    details.insert("water_level_percent".to_string(), json!(status.water.percentage));
    details.insert("coffee_level_percent".to_string(), json!(status.coffee.percentage));
    details.insert("total_coffees_made".to_string(), json!(status.total_coffees_made));

    CheckResult {
        status: if warnings.is_empty() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        message: None,
        warnings,
        details,
    }
}
