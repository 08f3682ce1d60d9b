//! Projection of port configuration into live network status.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, instrument};

use devnet_common::{DevNetError, DevNetResult, StatusProjector};
use devnet_types::{AddrInfo, IpPrefix, NetworkPortConfig, NetworkPortStatus, NetworkStatus, PortConfig};

/// Addresses currently assigned to interfaces, keyed by interface name.
pub type InterfaceAddresses = BTreeMap<String, Vec<IpPrefix>>;

/// Source of interface addresses.
pub trait AddressSource: Send + Sync {
    /// Returns the addresses of every interface present on the system.
    ///
    /// Interfaces that are up without an address map to an empty list.
    fn interface_addresses(&self) -> DevNetResult<InterfaceAddresses>;
}

/// Reads interface addresses from the kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAddressSource;

#[cfg(target_os = "linux")]
impl AddressSource for SystemAddressSource {
    fn interface_addresses(&self) -> DevNetResult<InterfaceAddresses> {
        use devnet_types::IpAddress;
        use std::net::{SocketAddrV4, SocketAddrV6};

        let ifaddrs = nix::ifaddrs::getifaddrs()
            .map_err(|e| DevNetError::projection(format!("getifaddrs failed: {}", e)))?;

        let mut result = InterfaceAddresses::new();
        for ifaddr in ifaddrs {
            let entry = result.entry(ifaddr.interface_name.clone()).or_default();

            let Some(storage) = ifaddr.address else {
                continue;
            };
            let netmask = ifaddr.netmask;

            let prefix = if let Some(sin) = storage.as_sockaddr_in() {
                let ip = *SocketAddrV4::from(*sin).ip();
                let len = netmask
                    .as_ref()
                    .and_then(|m| m.as_sockaddr_in())
                    .map(|m| u32::from(*SocketAddrV4::from(*m).ip()).count_ones())
                    .unwrap_or(32);
                IpPrefix::new(IpAddress::from(ip), len as u8)
            } else if let Some(sin6) = storage.as_sockaddr_in6() {
                let ip = *SocketAddrV6::from(*sin6).ip();
                let len = netmask
                    .as_ref()
                    .and_then(|m| m.as_sockaddr_in6())
                    .map(|m| u128::from(*SocketAddrV6::from(*m).ip()).count_ones())
                    .unwrap_or(128);
                IpPrefix::new(IpAddress::from(ip), len as u8)
            } else {
                continue;
            };

            match prefix {
                Ok(prefix) => entry.push(prefix),
                Err(e) => debug!("Skipping address on {}: {}", ifaddr.interface_name, e),
            }
        }

        Ok(result)
    }
}

#[cfg(not(target_os = "linux"))]
impl AddressSource for SystemAddressSource {
    fn interface_addresses(&self) -> DevNetResult<InterfaceAddresses> {
        Err(DevNetError::projection(
            "interface address lookup is only supported on Linux",
        ))
    }
}

/// Builds one status entry per configured port from interface addresses.
pub struct PortStatusProjector<A: AddressSource> {
    source: A,
}

impl<A: AddressSource> PortStatusProjector<A> {
    pub fn new(source: A) -> Self {
        Self { source }
    }

    fn port_status(port: &NetworkPortConfig, addresses: &InterfaceAddresses) -> NetworkPortStatus {
        let mut status = NetworkPortStatus {
            if_name: port.if_name.clone(),
            name: port.name.clone(),
            is_mgmt: port.is_mgmt,
            free: port.free,
            dhcp: port.dhcp_config.dhcp,
            subnet: port.dhcp_config.addr_subnet,
            ..NetworkPortStatus::default()
        };

        match addresses.get(&port.if_name) {
            Some(prefixes) => {
                status.addr_info_list = prefixes.iter().map(|p| AddrInfo::new(*p.address())).collect();
                if status.subnet.is_none() {
                    status.subnet = prefixes.iter().find(|p| !p.address().is_link_local()).copied();
                }
            }
            None => {
                status.error =
                    Some(DevNetError::address_lookup(&port.if_name, "interface not present").to_string())
            }
        }

        status
    }
}

impl Default for PortStatusProjector<SystemAddressSource> {
    fn default() -> Self {
        Self::new(SystemAddressSource)
    }
}

#[async_trait]
impl<A: AddressSource> StatusProjector for PortStatusProjector<A> {
    #[instrument(skip_all)]
    async fn project(
        &self,
        config: &PortConfig,
        previous: &NetworkStatus,
    ) -> DevNetResult<NetworkStatus> {
        let addresses = self.source.interface_addresses()?;

        let ports: Vec<NetworkPortStatus> = config
            .ports
            .iter()
            .map(|port| Self::port_status(port, &addresses))
            .collect();

        debug!(
            "Projected {} ports (previously {})",
            ports.len(),
            previous.ports.len()
        );
        Ok(NetworkStatus { ports })
    }
}
