//! Publisher configuration.

use serde::{Deserialize, Serialize};

/// Which backends receive published events.
///
/// The two flags are independent; with both disabled events are dropped
/// with a warning, which is a legitimate configuration for environments
/// without downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Publish to the message-bus topic
    #[serde(default)]
    pub bus_enabled: bool,

    /// Publish to the event-grid endpoint
    #[serde(default)]
    pub grid_enabled: bool,
}

impl PublisherConfig {
    /// Create a configuration with both backends disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the message-bus backend
    pub fn enable_bus(mut self) -> Self {
        self.bus_enabled = true;
        self
    }

    /// Enable the event-grid backend
    pub fn enable_grid(mut self) -> Self {
        self.grid_enabled = true;
        self
    }

    /// Load configuration from environment variables
    ///
    /// `STRATUM_MESSAGE_BUS_ENABLED` and `STRATUM_EVENT_GRID_ENABLED`
    /// accept `true`/`false` or `1`/`0`.
    pub fn from_env() -> Self {
        Self {
            bus_enabled: env_flag("STRATUM_MESSAGE_BUS_ENABLED"),
            grid_enabled: env_flag("STRATUM_EVENT_GRID_ENABLED"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("True")
    )
}
