//! Health aggregation across registered extensions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use habitloop_core::config::extensions::ExtensionsConfig;

use crate::registry::ExtensionRegistry;

/// Health status of one extension or the whole extension set.
///
/// Variants are ordered from best to worst so the aggregate is simply the
/// maximum observed status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Fully operational.
    #[default]
    Healthy,
    /// Operational with reduced capability.
    Degraded,
    /// Not operational.
    Unhealthy,
}

impl HealthStatus {
    /// Returns the string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Health of one extension at check time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionHealth {
    /// Probe result.
    pub status: HealthStatus,
    /// Probe error, when the extension is unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the probe ran.
    pub checked_at: DateTime<Utc>,
}

/// Aggregated health report across all registered extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Worst status observed across all extensions.
    pub overall: HealthStatus,
    /// Per-extension health, keyed by extension name.
    pub extensions: HashMap<String, ExtensionHealth>,
}

/// Invokes every extension's health probe and aggregates the results.
pub struct HealthAggregator {
    /// Extension registry.
    registry: Arc<ExtensionRegistry>,
    /// Per-probe deadline.
    timeout: Duration,
}

impl std::fmt::Debug for HealthAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthAggregator")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HealthAggregator {
    /// Creates a new health aggregator.
    pub fn new(registry: Arc<ExtensionRegistry>, config: &ExtensionsConfig) -> Self {
        Self {
            registry,
            timeout: config.health_timeout(),
        }
    }

    /// Checks every registered extension.
    ///
    /// Probes run concurrently, each behind the configured deadline and an
    /// isolation boundary: an error, timeout, or panic marks only that
    /// extension unhealthy. Extensions without a probe report healthy. An
    /// empty registry reports an overall healthy status.
    pub async fn check_all(&self) -> HealthReport {
        let descriptors = self.registry.all().await;

        let mut probes = Vec::new();
        for descriptor in &descriptors {
            let name = descriptor.name.clone();
            let handle = descriptor.health_check.clone().map(|probe| {
                let deadline = self.timeout;
                tokio::spawn(async move { tokio::time::timeout(deadline, probe.check()).await })
            });
            probes.push((name, handle));
        }

        let mut extensions = HashMap::new();
        let mut overall = HealthStatus::Healthy;

        for (name, handle) in probes {
            let (status, probe_error) = match handle {
                None => (HealthStatus::Healthy, None),
                Some(handle) => match handle.await {
                    Err(join_error) => {
                        error!(extension = %name, error = %join_error, "Health probe panicked");
                        (HealthStatus::Unhealthy, Some(join_error.to_string()))
                    }
                    Ok(Err(_)) => {
                        error!(
                            extension = %name,
                            timeout_seconds = self.timeout.as_secs(),
                            "Health probe timed out"
                        );
                        (
                            HealthStatus::Unhealthy,
                            Some(format!(
                                "Health probe timed out after {}s",
                                self.timeout.as_secs()
                            )),
                        )
                    }
                    Ok(Ok(Err(e))) => {
                        error!(extension = %name, error = %e, "Health probe failed");
                        (HealthStatus::Unhealthy, Some(e.to_string()))
                    }
                    Ok(Ok(Ok(status))) => (status, None),
                },
            };

            overall = overall.max(status);
            extensions.insert(
                name,
                ExtensionHealth {
                    status,
                    error: probe_error,
                    checked_at: Utc::now(),
                },
            );
        }

        debug!(
            overall = %overall,
            extensions = extensions.len(),
            "Health sweep complete"
        );

        HealthReport {
            overall,
            extensions,
        }
    }
}
