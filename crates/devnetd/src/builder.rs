//! Port configuration derived from legacy uplink lists.

use devnet_common::ConfigBuilder;
use devnet_types::{LegacyConfig, NetworkPortConfig, PortConfig};

/// Builds one DHCP client management port per uplink.
///
/// Duplicate uplinks collapse onto their first occurrence; an uplink also
/// listed in `FreeUplinks` is marked free.
#[derive(Debug, Clone, Copy, Default)]
pub struct UplinkPortConfigBuilder;

impl ConfigBuilder for UplinkPortConfigBuilder {
    fn build(&self, raw: &LegacyConfig) -> PortConfig {
        let mut ports: Vec<NetworkPortConfig> = Vec::with_capacity(raw.uplink.len());

        for uplink in &raw.uplink {
            if uplink.is_empty() || ports.iter().any(|p| &p.if_name == uplink) {
                continue;
            }
            ports.push(NetworkPortConfig::dhcp_client(uplink.as_str()).with_free(raw.is_free(uplink)));
        }

        PortConfig::new(ports)
    }
}
