//! DHCP client lifecycle driven through `dhcpcd`.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use devnet_common::shell::{self, shellquote, DHCPCD_CMD};
use devnet_common::DhcpLifecycle;
use devnet_types::{DhcpType, NetworkPortConfig, PortConfig};

/// Ports whose DHCP client must be stopped or started for a config change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DhcpDelta {
    /// Ports from the old config whose client must be released.
    pub stop: Vec<NetworkPortConfig>,
    /// Ports from the new config whose client must be started.
    pub start: Vec<NetworkPortConfig>,
}

impl DhcpDelta {
    /// Computes the delta between two configurations.
    ///
    /// A port is restarted when its addressing parameters change; other
    /// port attributes (name, mgmt, free) do not touch the client.
    pub fn compute(new_config: &PortConfig, old_config: &PortConfig) -> Self {
        let stop = old_config
            .ports
            .iter()
            .filter(|old| old.dhcp_config.dhcp.runs_client())
            .filter(|old| match new_config.lookup(&old.if_name) {
                Some(new) => new.dhcp_config != old.dhcp_config,
                None => true,
            })
            .cloned()
            .collect();

        let start = new_config
            .ports
            .iter()
            .filter(|new| new.dhcp_config.dhcp.runs_client())
            .filter(|new| match old_config.lookup(&new.if_name) {
                Some(old) => old.dhcp_config != new.dhcp_config,
                None => true,
            })
            .cloned()
            .collect();

        Self { stop, start }
    }

    pub fn is_empty(&self) -> bool {
        self.stop.is_empty() && self.start.is_empty()
    }
}

/// Runs one `dhcpcd` instance per client or static port.
pub struct DhcpcdLifecycle {
    command: String,
    config_file: String,
    dry_run: bool,

    /// Captured commands in test mode.
    #[cfg(test)]
    captured_commands: parking_lot::Mutex<Vec<String>>,
}

impl DhcpcdLifecycle {
    pub fn new(command: impl Into<String>, config_file: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            config_file: config_file.into(),
            dry_run: false,
            #[cfg(test)]
            captured_commands: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Only log the commands instead of running them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Command releasing the lease and stopping the client on a port.
    pub fn stop_command(&self, port: &NetworkPortConfig) -> String {
        format!("{} --release {}", self.command, shellquote(&port.if_name))
    }

    /// Command starting the client on a port, if the port needs one.
    ///
    /// Static ports without an address cannot be started.
    pub fn start_command(&self, port: &NetworkPortConfig) -> Option<String> {
        let dhcp = &port.dhcp_config;
        let mut args: Vec<String> = Vec::new();

        match dhcp.dhcp {
            DhcpType::Client => {
                args.push(format!("-f {}", shellquote(&self.config_file)));
                args.push("--noipv4ll".to_string());
            }
            DhcpType::Static => {
                let subnet = dhcp.addr_subnet?;
                args.push(static_arg("ip_address", &subnet.to_string()));
                if let Some(gateway) = dhcp.gateway {
                    args.push(static_arg("routers", &gateway.to_string()));
                }
                if !dhcp.dns_servers.is_empty() {
                    let servers: Vec<String> =
                        dhcp.dns_servers.iter().map(|s| s.to_string()).collect();
                    args.push(static_arg("domain_name_servers", &servers.join(" ")));
                }
                if !dhcp.domain_name.is_empty() {
                    args.push(static_arg("domain_name", &dhcp.domain_name));
                }
                if let Some(ntp) = dhcp.ntp_server {
                    args.push(static_arg("ntp_servers", &ntp.to_string()));
                }
            }
            DhcpType::Noop | DhcpType::None => return None,
        }

        Some(format!(
            "{} {} -b -t 0 {}",
            self.command,
            args.join(" "),
            shellquote(&port.if_name)
        ))
    }

    async fn run(&self, cmd: &str) {
        #[cfg(test)]
        self.captured_commands.lock().push(cmd.to_string());

        if self.dry_run {
            info!("Dry run, not executing: {}", cmd);
            return;
        }

        if let Err(e) = shell::exec_or_throw(cmd).await {
            warn!("DHCP client command failed: {}", e);
        }
    }
}

impl Default for DhcpcdLifecycle {
    fn default() -> Self {
        Self::new(DHCPCD_CMD, "/dhcpcd.conf")
    }
}

fn static_arg(option: &str, value: &str) -> String {
    format!("--static {}", shellquote(&format!("{}={}", option, value)))
}

#[async_trait]
impl DhcpLifecycle for DhcpcdLifecycle {
    #[instrument(skip_all)]
    async fn apply(&self, new_config: &PortConfig, old_config: &PortConfig) {
        let delta = DhcpDelta::compute(new_config, old_config);
        if delta.is_empty() {
            debug!("No DHCP client changes");
            return;
        }

        for port in &delta.stop {
            info!("Stopping DHCP client on {}", port.if_name);
            self.run(&self.stop_command(port)).await;
        }

        for port in &delta.start {
            match self.start_command(port) {
                Some(cmd) => {
                    info!("Starting DHCP client on {} ({})", port.if_name, port.dhcp_config.dhcp);
                    self.run(&cmd).await;
                }
                None => warn!(
                    "Not starting DHCP client on {}: static port without address",
                    port.if_name
                ),
            }
        }
    }
}
