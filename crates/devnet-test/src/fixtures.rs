//! Test fixtures for common device network configurations
//!
//! Addresses are given as text and parsed eagerly; a malformed fixture
//! panics, which is what a test wants.

use devnet_types::{
    AddrInfo, DhcpConfig, DhcpType, LegacyConfig, NetworkPortConfig, NetworkPortStatus,
    NetworkStatus, PortConfig,
};

/// Port configuration with one DHCP client management port per interface
pub fn dhcp_ports(if_names: &[&str]) -> PortConfig {
    PortConfig::new(
        if_names
            .iter()
            .map(|name| NetworkPortConfig::dhcp_client(*name))
            .collect(),
    )
}

/// Statically addressed management port
pub fn static_port(if_name: &str, addr_subnet: &str, gateway: &str) -> NetworkPortConfig {
    NetworkPortConfig {
        if_name: if_name.to_string(),
        name: if_name.to_string(),
        is_mgmt: true,
        free: false,
        dhcp_config: DhcpConfig {
            dhcp: DhcpType::Static,
            addr_subnet: Some(addr_subnet.parse().expect("fixture subnet")),
            gateway: Some(gateway.parse().expect("fixture gateway")),
            ..DhcpConfig::default()
        },
    }
}

/// Legacy model configuration
pub fn legacy(uplinks: &[&str], free_uplinks: &[&str]) -> LegacyConfig {
    LegacyConfig::new(
        uplinks.iter().map(|s| s.to_string()).collect(),
        free_uplinks.iter().map(|s| s.to_string()).collect(),
    )
}

/// Port status carrying the given addresses
pub fn port_status(if_name: &str, addrs: &[&str]) -> NetworkPortStatus {
    NetworkPortStatus {
        if_name: if_name.to_string(),
        name: if_name.to_string(),
        is_mgmt: true,
        dhcp: DhcpType::Client,
        addr_info_list: addrs
            .iter()
            .map(|a| AddrInfo::new(a.parse().expect("fixture address")))
            .collect(),
        ..NetworkPortStatus::default()
    }
}

/// Network status from port statuses
pub fn status(ports: Vec<NetworkPortStatus>) -> NetworkStatus {
    NetworkStatus { ports }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devnet_types::count_usable_addresses;

    #[test]
    fn test_dhcp_ports() {
        let config = dhcp_ports(&["eth0", "eth1"]);
        assert_eq!(config.ports.len(), 2);
        assert_eq!(config.ports[1].dhcp_config.dhcp, DhcpType::Client);
    }

    #[test]
    fn test_static_port() {
        let port = static_port("eth0", "10.0.0.5/24", "10.0.0.1");
        assert_eq!(port.dhcp_config.dhcp, DhcpType::Static);
        assert_eq!(port.dhcp_config.gateway.unwrap().to_string(), "10.0.0.1");
    }

    #[test]
    fn test_status_fixture() {
        let s = status(vec![port_status("eth0", &["10.0.0.5", "fe80::1"])]);
        assert_eq!(count_usable_addresses(&s), 1);
    }
}
