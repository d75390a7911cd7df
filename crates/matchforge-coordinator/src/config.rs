//! Coordinator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a coordinator started by
/// [`spawn_coordinator`](crate::spawn_coordinator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// How long a pending operation may wait for the provider before it
    /// is forced to fail. Applies to every operation kind.
    ///
    /// Default: 10 seconds.
    pub op_timeout: Duration,

    /// When `true`, a successful find with at least one result
    /// automatically issues a join against the first ranked result for
    /// the same player.
    ///
    /// Default: `false` — finds are side-effect free unless asked.
    pub auto_join: bool,

    /// Command channel size for the actor. Controls backpressure —
    /// if the channel fills up, issuers wait (bounded channel).
    pub channel_size: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            op_timeout: Duration::from_secs(10),
            auto_join: false,
            channel_size: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.op_timeout, Duration::from_secs(10));
        assert!(!config.auto_join);
        assert_eq!(config.channel_size, 64);
    }
}
