//! Interceptor configuration.

use std::time::Duration;

use parlor_protocol::Variant;
use serde::{Deserialize, Serialize};

/// Settings for one [`Interceptor`](crate::Interceptor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorConfig {
    /// The protocol variant of the session. Packets of the other variant
    /// are rejected.
    pub variant: Variant,

    /// Applied to every task handle: a task still running after this long
    /// is cancelled. `None` waits forever.
    pub task_timeout: Option<Duration>,
}

impl InterceptorConfig {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Modern,
            task_timeout: None,
        }
    }
}
