//! Client Configuration

use std::time::Duration;

/// When to reload the board after a persistence call settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResyncPolicy {
    /// After every call, so late replies never leave stale local state
    #[default]
    Always,
    /// Only after a failed call
    OnFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// How long the last dispatched move is remembered after it settles
    pub guard_cooldown: Duration,
    pub resync: ResyncPolicy,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            guard_cooldown: Duration::from_millis(400),
            resync: ResyncPolicy::Always,
        }
    }
}
