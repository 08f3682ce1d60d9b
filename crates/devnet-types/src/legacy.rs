//! Legacy per-model network configuration.

use serde::{Deserialize, Serialize};

/// Uplink description published per manufacturer model.
///
/// This predates [`PortConfig`](crate::PortConfig) and only names the
/// uplink interfaces; the port configuration is derived from it.
/// Field names follow the model files on disk (`Uplink`, `FreeUplinks`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LegacyConfig {
    /// Interfaces used for management traffic.
    pub uplink: Vec<String>,

    /// Subset of uplinks that are free of charge.
    pub free_uplinks: Vec<String>,
}

impl LegacyConfig {
    pub fn new(uplink: Vec<String>, free_uplinks: Vec<String>) -> Self {
        Self {
            uplink,
            free_uplinks,
        }
    }

    /// Returns true if the interface is listed as a free uplink.
    pub fn is_free(&self, if_name: &str) -> bool {
        self.free_uplinks.iter().any(|u| u == if_name)
    }
}
