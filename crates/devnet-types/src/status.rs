//! Observed/derived network status.

use crate::{DhcpType, IpAddress, IpPrefix};
use serde::{Deserialize, Serialize};

/// One address assigned to a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddrInfo {
    pub addr: IpAddress,
}

impl AddrInfo {
    pub fn new(addr: IpAddress) -> Self {
        Self { addr }
    }
}

/// Status of one network port, projected from its configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPortStatus {
    pub if_name: String,
    pub name: String,
    pub is_mgmt: bool,
    pub free: bool,
    pub dhcp: DhcpType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<IpPrefix>,

    pub addr_info_list: Vec<AddrInfo>,

    /// Last error seen while probing the port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Status of all device ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkStatus {
    pub ports: Vec<NetworkPortStatus>,
}

impl NetworkStatus {
    /// Returns true if no ports are present.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Finds the status of the given interface.
    pub fn lookup(&self, if_name: &str) -> Option<&NetworkPortStatus> {
        self.ports.iter().find(|p| p.if_name == if_name)
    }
}

/// Counts assigned addresses across all ports, skipping link-local scope.
pub fn count_usable_addresses(status: &NetworkStatus) -> usize {
    status
        .ports
        .iter()
        .flat_map(|port| port.addr_info_list.iter())
        .filter(|info| !info.addr.is_link_local())
        .count()
}
