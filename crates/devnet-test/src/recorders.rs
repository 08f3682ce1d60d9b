//! Recording collaborators for engine tests
//!
//! Every recorder is a cheap `Clone` over shared state: hand one clone to
//! the engine and keep another to inspect what the engine did.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use devnet_common::{
    DevNetError, DevNetResult, DhcpLifecycle, Indicator, IndicatorCode, PublishedItem, Publisher,
    StatusProjector,
};
use devnet_types::{AddrInfo, IpAddress, NetworkPortStatus, NetworkStatus, PortConfig};

/// Records every DHCP lifecycle call as `(new, old)`
#[derive(Clone, Default)]
pub struct RecordingDhcp {
    calls: Arc<Mutex<Vec<(PortConfig, PortConfig)>>>,
}

impl RecordingDhcp {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far
    pub fn calls(&self) -> Vec<(PortConfig, PortConfig)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl DhcpLifecycle for RecordingDhcp {
    async fn apply(&self, new_config: &PortConfig, old_config: &PortConfig) {
        self.calls
            .lock()
            .push((new_config.clone(), old_config.clone()));
    }
}

#[derive(Default)]
struct ProjectorScript {
    addresses: BTreeMap<String, Vec<IpAddress>>,
    fail_remaining: usize,
    calls: usize,
}

/// Status projector driven by a test script
///
/// Each configured port becomes a port status carrying whatever addresses
/// the test assigned to its interface.
#[derive(Clone, Default)]
pub struct ScriptedProjector {
    script: Arc<Mutex<ProjectorScript>>,
}

impl ScriptedProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns addresses to an interface for subsequent projections
    pub fn set_addresses(&self, if_name: &str, addrs: &[&str]) {
        let parsed = addrs
            .iter()
            .map(|a| a.parse().expect("scripted address"))
            .collect();
        self.script
            .lock()
            .addresses
            .insert(if_name.to_string(), parsed);
    }

    /// Makes the next `count` projections fail
    pub fn fail_next(&self, count: usize) {
        self.script.lock().fail_remaining = count;
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().calls
    }
}

#[async_trait]
impl StatusProjector for ScriptedProjector {
    async fn project(
        &self,
        config: &PortConfig,
        _previous: &NetworkStatus,
    ) -> DevNetResult<NetworkStatus> {
        let mut script = self.script.lock();
        script.calls += 1;

        if script.fail_remaining > 0 {
            script.fail_remaining -= 1;
            return Err(DevNetError::projection("scripted failure"));
        }

        let ports = config
            .ports
            .iter()
            .map(|port| NetworkPortStatus {
                if_name: port.if_name.clone(),
                name: port.name.clone(),
                is_mgmt: port.is_mgmt,
                free: port.free,
                dhcp: port.dhcp_config.dhcp,
                subnet: port.dhcp_config.addr_subnet,
                addr_info_list: script
                    .addresses
                    .get(&port.if_name)
                    .map(|addrs| addrs.iter().copied().map(AddrInfo::new).collect())
                    .unwrap_or_default(),
                error: None,
            })
            .collect();

        Ok(NetworkStatus { ports })
    }
}

/// Records indicator signals in order
#[derive(Clone, Default)]
pub struct RecordingIndicator {
    signals: Arc<Mutex<Vec<IndicatorCode>>>,
}

impl RecordingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> Vec<IndicatorCode> {
        self.signals.lock().clone()
    }
}

impl Indicator for RecordingIndicator {
    fn signal(&self, code: IndicatorCode) {
        self.signals.lock().push(code);
    }
}

/// Records every publication in order
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    items: Arc<Mutex<Vec<PublishedItem>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Vec<PublishedItem> {
        self.items.lock().clone()
    }

    /// Publications under `topic`
    pub fn items_for(&self, topic: &str) -> Vec<PublishedItem> {
        self.items
            .lock()
            .iter()
            .filter(|item| item.topic == topic)
            .cloned()
            .collect()
    }

    /// Number of publications under `topic`
    pub fn count_for(&self, topic: &str) -> usize {
        self.items_for(topic).len()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, topic: &str, key: &str, value: Value) {
        self.items.lock().push(PublishedItem {
            topic: topic.to_string(),
            key: key.to_string(),
            value,
        });
    }
}
