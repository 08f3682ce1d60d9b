//! Legacy single-source path for per-model network configuration.
//!
//! The legacy source is keyed by manufacturer model. Events for any other
//! model are ignored. Accepted events rebuild a port configuration and feed
//! it to the engine under the model key, which is not a reserved key and so
//! competes at controller precedence.

use tracing::{debug, info, instrument, warn};

use devnet_types::{LegacyConfig, PortConfig};

use crate::engine::DeviceNetworkEngine;
use crate::topics::{keys, PORT_CONFIG_TOPIC};

/// State of the legacy model source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacySource {
    model_key: String,
    raw: LegacyConfig,
    derived: PortConfig,
}

impl LegacySource {
    pub fn new(model_key: impl Into<String>) -> Self {
        Self {
            model_key: model_key.into(),
            raw: LegacyConfig::default(),
            derived: PortConfig::default(),
        }
    }

    /// The registered manufacturer model key.
    pub fn model_key(&self) -> &str {
        &self.model_key
    }

    /// The last accepted raw configuration.
    pub fn raw(&self) -> &LegacyConfig {
        &self.raw
    }

    /// The port configuration last derived from the raw configuration.
    pub fn derived(&self) -> &PortConfig {
        &self.derived
    }

    pub fn matches(&self, model_key: &str) -> bool {
        self.model_key == model_key
    }
}

impl DeviceNetworkEngine {
    /// Returns the legacy source state.
    pub fn legacy(&self) -> &LegacySource {
        &self.legacy
    }

    /// Handles an update of the legacy model configuration.
    #[instrument(skip(self, raw))]
    pub async fn on_legacy_model_config_modify(&mut self, model_key: &str, raw: LegacyConfig) {
        if !self.legacy.matches(model_key) {
            debug!(
                "Ignoring legacy config for {} - expecting {}",
                model_key,
                self.legacy.model_key()
            );
            return;
        }
        info!("Legacy config modify for {}", model_key);

        self.legacy.raw = raw;
        self.apply_legacy(model_key).await;
        info!("Legacy config modify done for {}", model_key);
    }

    /// Handles removal of the legacy model configuration.
    ///
    /// The raw configuration falls back to empty, which derives an empty
    /// port configuration.
    #[instrument(skip(self))]
    pub async fn on_legacy_model_config_delete(&mut self, model_key: &str) {
        if !self.legacy.matches(model_key) {
            debug!("Ignoring legacy config delete for {}", model_key);
            return;
        }
        info!("Legacy config delete for {}", model_key);

        self.legacy.raw = LegacyConfig::default();
        self.apply_legacy(model_key).await;
        info!("Legacy config delete done for {}", model_key);
    }

    async fn apply_legacy(&mut self, model_key: &str) {
        let port_config = self.builder.build(&self.legacy.raw);

        if port_config != self.legacy.derived {
            info!(
                "Derived DevicePortConfig change from {:?} to {:?}",
                self.legacy.derived, port_config
            );
            match serde_json::to_value(&port_config) {
                Ok(value) => self.publisher.publish(PORT_CONFIG_TOPIC, keys::GLOBAL, value),
                Err(e) => warn!("Failed to encode derived port config: {}", e),
            }
            self.legacy.derived = port_config.clone();
        }

        self.on_port_config_modify(model_key, port_config).await;
    }
}
