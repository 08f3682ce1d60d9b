//! Interfaces the reconciliation engine drives.
//!
//! The engine owns one implementation of each trait and calls them in
//! sequence from its single writer path. None of them may block
//! indefinitely; the engine imposes no timeout and never retries, so any
//! retry or backoff policy belongs to the implementation.

use async_trait::async_trait;
use devnet_types::{LegacyConfig, NetworkStatus, PortConfig};

use crate::error::DevNetResult;

/// Builds a port configuration from the legacy per-model description.
pub trait ConfigBuilder: Send + Sync {
    fn build(&self, raw: &LegacyConfig) -> PortConfig;
}

/// Starts and stops per-interface DHCP clients for a configuration delta.
///
/// Failures are logged by the implementation and never reported back; the
/// engine replaces its active configuration regardless, so bookkeeping stays
/// consistent even when actuation partially failed.
#[async_trait]
pub trait DhcpLifecycle: Send + Sync {
    async fn apply(&self, new_config: &PortConfig, old_config: &PortConfig);
}

/// Computes network status for a configuration.
#[async_trait]
pub trait StatusProjector: Send + Sync {
    /// Projects `config` into status, given the previously projected status.
    async fn project(
        &self,
        config: &PortConfig,
        previous: &NetworkStatus,
    ) -> DevNetResult<NetworkStatus>;
}

/// Counts usable (non link-local) addresses in a status.
pub trait AddressCounter: Send + Sync {
    fn count_usable(&self, status: &NetworkStatus) -> usize;
}

/// Connectivity indicator codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorCode {
    /// Lost the last usable address.
    NoUsableAddress,
    /// Gained the first usable address.
    UsableAddress,
}

impl IndicatorCode {
    /// Returns the numeric code understood by the LED manager.
    pub const fn code(&self) -> u32 {
        match self {
            IndicatorCode::NoUsableAddress => 1,
            IndicatorCode::UsableAddress => 2,
        }
    }
}

/// Receives connectivity indicator signals.
pub trait Indicator: Send + Sync {
    fn signal(&self, code: IndicatorCode);
}
