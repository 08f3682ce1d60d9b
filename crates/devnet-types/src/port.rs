//! Desired port configuration.

use crate::{IpAddress, IpPrefix, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How addresses are obtained on a port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DhcpType {
    /// Leave the port alone.
    #[default]
    Noop,
    /// Static addressing from [`DhcpConfig::addr_subnet`].
    Static,
    /// Port is up but carries no address.
    None,
    /// Acquire addresses with a DHCP client.
    Client,
}

impl DhcpType {
    /// Returns true if a DHCP client process is run for ports in this mode.
    ///
    /// Static ports also run the client, in static mode.
    pub const fn runs_client(&self) -> bool {
        matches!(self, DhcpType::Static | DhcpType::Client)
    }
}

impl fmt::Display for DhcpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DhcpType::Noop => "noop",
            DhcpType::Static => "static",
            DhcpType::None => "none",
            DhcpType::Client => "client",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DhcpType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "noop" => Ok(DhcpType::Noop),
            "static" => Ok(DhcpType::Static),
            "none" => Ok(DhcpType::None),
            "client" => Ok(DhcpType::Client),
            _ => Err(ParseError::InvalidDhcpType(s.to_string())),
        }
    }
}

/// Addressing parameters for a single port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DhcpConfig {
    pub dhcp: DhcpType,

    /// Static address and prefix length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr_subnet: Option<IpPrefix>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<IpAddress>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub domain_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntp_server: Option<IpAddress>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_servers: Vec<IpAddress>,
}

/// Desired configuration of one network port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPortConfig {
    /// Kernel interface name (e.g., "eth0").
    pub if_name: String,

    /// Logical name assigned by the controller or the device model.
    pub name: String,

    /// Port is used for management traffic.
    pub is_mgmt: bool,

    /// Port is free of charge (no metered uplink).
    pub free: bool,

    pub dhcp_config: DhcpConfig,
}

impl NetworkPortConfig {
    /// Creates a management port running a DHCP client.
    pub fn dhcp_client(if_name: impl Into<String>) -> Self {
        let if_name = if_name.into();
        Self {
            name: if_name.clone(),
            if_name,
            is_mgmt: true,
            free: false,
            dhcp_config: DhcpConfig {
                dhcp: DhcpType::Client,
                ..DhcpConfig::default()
            },
        }
    }

    /// Marks the port as free.
    pub fn with_free(mut self, free: bool) -> Self {
        self.free = free;
        self
    }
}

/// Desired configuration for all device ports.
///
/// The default value (no ports) is what the reconciliation engine falls
/// back to when the owning source is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    pub version: u32,
    pub ports: Vec<NetworkPortConfig>,
}

impl PortConfig {
    pub fn new(ports: Vec<NetworkPortConfig>) -> Self {
        Self { version: 0, ports }
    }

    /// Returns true if no ports are configured.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Finds the port with the given interface name.
    pub fn lookup(&self, if_name: &str) -> Option<&NetworkPortConfig> {
        self.ports.iter().find(|p| p.if_name == if_name)
    }

    /// Iterates over management ports.
    pub fn mgmt_ports(&self) -> impl Iterator<Item = &NetworkPortConfig> {
        self.ports.iter().filter(|p| p.is_mgmt)
    }
}
