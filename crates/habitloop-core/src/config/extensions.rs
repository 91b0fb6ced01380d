//! Extension runtime configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Extension runtime configuration.
///
/// Timeouts bound how long a single hook invocation or health probe may
/// run before the dispatcher gives up on it. A stalled extension must not
/// stall the operation that triggered the dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    /// Maximum seconds a single lifecycle hook may run per dispatch.
    #[serde(default = "default_hook_timeout")]
    pub hook_timeout_seconds: u64,
    /// Maximum seconds a single health probe may run per sweep.
    #[serde(default = "default_health_timeout")]
    pub health_timeout_seconds: u64,
}

impl ExtensionsConfig {
    /// The per-hook deadline as a [`Duration`].
    pub fn hook_timeout(&self) -> Duration {
        Duration::from_secs(self.hook_timeout_seconds)
    }

    /// The per-probe deadline as a [`Duration`].
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_seconds)
    }
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            hook_timeout_seconds: default_hook_timeout(),
            health_timeout_seconds: default_health_timeout(),
        }
    }
}

fn default_hook_timeout() -> u64 {
    10
}

fn default_health_timeout() -> u64 {
    5
}
