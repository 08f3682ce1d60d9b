//! Event dispatch for the reconciliation engine.

use async_trait::async_trait;
use tracing::{debug, instrument};

use devnet_common::{Consumer, ConsumerConfig, Orch, SourceEvent};
use devnet_types::{LegacyConfig, PortConfig};

use crate::engine::DeviceNetworkEngine;
use crate::topics::{LEGACY_CONFIG_TOPIC, PORT_CONFIG_TOPIC};

/// Owns the engine and the queues feeding it.
///
/// Transports enqueue events; [`do_task`](Orch::do_task) is the single
/// point where they reach the engine.
pub struct DevNetMgr {
    engine: DeviceNetworkEngine,
    port_configs: Consumer<PortConfig>,
    legacy_configs: Consumer<LegacyConfig>,
}

impl DevNetMgr {
    pub fn new(engine: DeviceNetworkEngine) -> Self {
        Self {
            engine,
            port_configs: Consumer::new(ConsumerConfig::new(PORT_CONFIG_TOPIC)),
            legacy_configs: Consumer::new(ConsumerConfig::new(LEGACY_CONFIG_TOPIC)),
        }
    }

    pub fn engine(&self) -> &DeviceNetworkEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DeviceNetworkEngine {
        &mut self.engine
    }

    pub fn enqueue_port_configs(&mut self, events: Vec<SourceEvent<PortConfig>>) {
        self.port_configs.add_to_sync(events);
    }

    pub fn enqueue_legacy_configs(&mut self, events: Vec<SourceEvent<LegacyConfig>>) {
        self.legacy_configs.add_to_sync(events);
    }
}

#[async_trait]
impl Orch for DevNetMgr {
    fn name(&self) -> &str {
        "DevNetMgr"
    }

    /// Drains the legacy queue first, since a legacy event produces a port
    /// configuration of its own.
    #[instrument(skip(self))]
    async fn do_task(&mut self) {
        for event in self.legacy_configs.drain() {
            match event {
                SourceEvent::Set { key, value } => {
                    self.engine.on_legacy_model_config_modify(&key, value).await
                }
                SourceEvent::Del { key } => self.engine.on_legacy_model_config_delete(&key).await,
            }
        }

        for event in self.port_configs.drain() {
            match event {
                SourceEvent::Set { key, value } => {
                    self.engine.on_port_config_modify(&key, value).await
                }
                SourceEvent::Del { key } => self.engine.on_port_config_delete(&key).await,
            }
        }

        debug!("DevNetMgr::do_task done");
    }

    fn has_pending_tasks(&self) -> bool {
        self.port_configs.has_pending() || self.legacy_configs.has_pending()
    }

    fn dump_pending_tasks(&self) -> Vec<String> {
        let mut tasks = self.legacy_configs.dump();
        tasks.extend(self.port_configs.dump());
        tasks
    }
}
