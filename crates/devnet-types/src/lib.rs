//! Device network types shared by the devnet control plane.
//!
//! This crate provides the structural values that flow between
//! configuration sources, the reconciliation engine and status consumers:
//!
//! - [`PortConfig`]: desired per-port network configuration
//! - [`NetworkStatus`]: observed/derived per-port network state
//! - [`LegacyConfig`]: the historical model-keyed uplink description
//! - [`IpAddress`] / [`IpPrefix`]: IP primitives with scope helpers
//!
//! All values derive `PartialEq` and are compared by full structural
//! equality; nothing in the control plane compares them by identity or by
//! individual fields.

mod ip;
mod legacy;
mod port;
mod status;

pub use ip::{IpAddress, IpPrefix};
pub use legacy::LegacyConfig;
pub use port::{DhcpConfig, DhcpType, NetworkPortConfig, PortConfig};
pub use status::{count_usable_addresses, AddrInfo, NetworkPortStatus, NetworkStatus};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("invalid DHCP type: {0}")]
    InvalidDhcpType(String),
}
