//! Reconciliation engine - arbitrates port configuration sources.
//!
//! Handles three kinds of sources in this priority order:
//! 1. controller (zedagent) configuration under any non-reserved key
//! 2. "override" from the build or a USB stick
//! 3. "global" derived from the per-platform configuration
//!
//! Side effects run strictly on observed change: the DHCP lifecycle only
//! when the active config changes, notification only when the projected
//! status changes.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, trace, warn};

use devnet_common::{
    AddressCounter, ConfigBuilder, DhcpLifecycle, Indicator, Publisher, StatusProjector,
};
use devnet_types::PortConfig;

use crate::availability::AvailabilityNotifier;
use crate::legacy::LegacySource;
use crate::precedence::{precedence_of, Precedence};
use crate::state::EffectiveState;

/// The collaborators an engine drives.
pub struct Collaborators {
    pub builder: Box<dyn ConfigBuilder>,
    pub dhcp: Box<dyn DhcpLifecycle>,
    pub projector: Box<dyn StatusProjector>,
    pub counter: Box<dyn AddressCounter>,
    pub indicator: Box<dyn Indicator>,
    pub publisher: Arc<dyn Publisher>,
}

/// Device port configuration reconciliation engine.
///
/// Single writer: every entry point takes `&mut self` and runs to
/// completion. The caller serializes event delivery.
pub struct DeviceNetworkEngine {
    state: EffectiveState,
    pub(crate) legacy: LegacySource,
    pub(crate) builder: Box<dyn ConfigBuilder>,
    dhcp: Box<dyn DhcpLifecycle>,
    projector: Box<dyn StatusProjector>,
    notifier: AvailabilityNotifier,
    pub(crate) publisher: Arc<dyn Publisher>,
}

impl DeviceNetworkEngine {
    /// Creates an engine accepting legacy configuration for `model_key`.
    pub fn new(collaborators: Collaborators, model_key: impl Into<String>) -> Self {
        let Collaborators {
            builder,
            dhcp,
            projector,
            counter,
            indicator,
            publisher,
        } = collaborators;

        Self {
            state: EffectiveState::new(),
            legacy: LegacySource::new(model_key),
            builder,
            dhcp,
            projector,
            notifier: AvailabilityNotifier::new(counter, indicator, publisher.clone()),
            publisher,
        }
    }

    /// Returns the effective state.
    pub fn state(&self) -> &EffectiveState {
        &self.state
    }

    /// Clears the dirty flag, returning whether status changed since the
    /// last call.
    pub fn take_dirty(&mut self) -> bool {
        self.state.take_dirty()
    }

    /// Handles an update from a port configuration source.
    #[instrument(skip(self, candidate))]
    pub async fn on_port_config_modify(&mut self, source_key: &str, candidate: PortConfig) {
        let precedence = precedence_of(source_key);
        let current = self.state.active_precedence();
        debug!(
            "Port config modify for {} at precedence {}, current {}",
            source_key, precedence, current
        );

        if !self.state.accepts_modify(precedence) {
            trace!("Ignoring lower precedence {} for {}", precedence, source_key);
            return;
        }
        self.state.active_precedence = precedence;

        self.reconcile(candidate).await;
        debug!("Port config modify done for {}", source_key);
    }

    /// Handles a withdrawal from a port configuration source.
    ///
    /// Only the owning source can clear the state. The next lower source is
    /// not restored; precedence goes back to unset and the config to empty.
    #[instrument(skip(self))]
    pub async fn on_port_config_delete(&mut self, source_key: &str) {
        let precedence = precedence_of(source_key);
        let current = self.state.active_precedence();

        if !self.state.accepts_delete(precedence) {
            trace!(
                "Not removing current precedence {} for {} at {}",
                current,
                source_key,
                precedence
            );
            return;
        }
        info!("Port config delete for {} at precedence {}", source_key, precedence);
        self.state.active_precedence = Precedence::UNSET;

        self.reconcile(PortConfig::default()).await;
    }

    /// Diffs `candidate` against the active config and drives collaborators.
    ///
    /// Status is re-projected on every call, so addresses acquired since
    /// the last projection show up even when the config is unchanged.
    async fn reconcile(&mut self, candidate: PortConfig) {
        if candidate != self.state.active_config {
            info!(
                "DevicePortConfig change from {:?} to {:?}",
                self.state.active_config, candidate
            );
            self.dhcp.apply(&candidate, &self.state.active_config).await;
            self.state.active_config = candidate;
        }

        let new_status = match self
            .projector
            .project(&self.state.active_config, &self.state.active_status)
            .await
        {
            Ok(status) => status,
            Err(e) if e.is_retryable() => {
                warn!("Failed to project network status, keeping previous: {}", e);
                return;
            }
            Err(e) => {
                error!("Network status projection failed, keeping previous: {}", e);
                return;
            }
        };

        if new_status != self.state.active_status {
            info!(
                "DeviceNetworkStatus change from {:?} to {:?}",
                self.state.active_status, new_status
            );
            self.state.active_status = new_status;
            self.notifier.notify(&mut self.state);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::availability::UsableAddressCounter;
    use crate::builder::UplinkPortConfigBuilder;
    use crate::topics::NETWORK_STATUS_TOPIC;
    use devnet_common::IndicatorCode;
    use devnet_test::{
        dhcp_ports, static_port, RecordingDhcp, RecordingIndicator, RecordingPublisher,
        ScriptedProjector,
    };
    use pretty_assertions::assert_eq;

    pub(crate) struct Harness {
        pub engine: DeviceNetworkEngine,
        pub dhcp: RecordingDhcp,
        pub projector: ScriptedProjector,
        pub indicator: RecordingIndicator,
        pub publisher: RecordingPublisher,
    }

    pub(crate) fn harness(model_key: &str) -> Harness {
        let dhcp = RecordingDhcp::new();
        let projector = ScriptedProjector::new();
        let indicator = RecordingIndicator::new();
        let publisher = RecordingPublisher::new();

        let engine = DeviceNetworkEngine::new(
            Collaborators {
                builder: Box::new(UplinkPortConfigBuilder),
                dhcp: Box::new(dhcp.clone()),
                projector: Box::new(projector.clone()),
                counter: Box::new(UsableAddressCounter),
                indicator: Box::new(indicator.clone()),
                publisher: Arc::new(publisher.clone()),
            },
            model_key,
        );

        Harness {
            engine,
            dhcp,
            projector,
            indicator,
            publisher,
        }
    }

    #[tokio::test]
    async fn test_first_modify_accepted() {
        let mut h = harness("model");
        let config = dhcp_ports(&["eth0"]);

        h.engine.on_port_config_modify("global", config.clone()).await;

        assert_eq!(h.engine.state().active_config(), &config);
        assert_eq!(h.engine.state().active_precedence(), Precedence::GLOBAL);
        assert_eq!(h.dhcp.calls(), vec![(config, PortConfig::default())]);
        assert_eq!(h.projector.call_count(), 1);
    }

    #[tokio::test]
    async fn test_takeover_sequence() {
        let mut h = harness("model");
        let config_a = dhcp_ports(&["eth0"]);
        let config_b = dhcp_ports(&["eth1"]);
        let config_c = dhcp_ports(&["eth0", "eth1"]);
        let config_d = dhcp_ports(&["wlan0"]);

        h.engine.on_port_config_modify("global", config_a.clone()).await;
        assert_eq!(h.engine.state().active_config(), &config_a);
        assert_eq!(h.engine.state().active_precedence(), Precedence::GLOBAL);

        h.engine.on_port_config_modify("override", config_b.clone()).await;
        assert_eq!(h.engine.state().active_config(), &config_b);
        assert_eq!(h.engine.state().active_precedence(), Precedence::OVERRIDE);

        h.engine.on_port_config_modify("zedagent", config_c.clone()).await;
        assert_eq!(h.engine.state().active_config(), &config_c);
        assert_eq!(h.engine.state().active_precedence(), Precedence::ZEDAGENT);

        h.engine.on_port_config_modify("global", config_d).await;
        assert_eq!(h.engine.state().active_config(), &config_c);
        assert_eq!(h.engine.state().active_precedence(), Precedence::ZEDAGENT);
        assert_eq!(h.dhcp.call_count(), 3);
    }

    #[tokio::test]
    async fn test_rejected_modify_has_no_effect() {
        let mut h = harness("model");
        h.projector.set_addresses("eth0", &["10.0.0.5"]);
        h.engine
            .on_port_config_modify("zedagent", dhcp_ports(&["eth0"]))
            .await;

        let before = h.engine.state().clone();
        let published = h.publisher.items().len();

        h.engine
            .on_port_config_modify("override", dhcp_ports(&["eth1"]))
            .await;

        assert_eq!(h.engine.state(), &before);
        assert_eq!(h.dhcp.call_count(), 1);
        assert_eq!(h.projector.call_count(), 1);
        assert_eq!(h.publisher.items().len(), published);
    }

    #[tokio::test]
    async fn test_same_tier_takes_over() {
        let mut h = harness("model");
        h.engine
            .on_port_config_modify("controller-a", dhcp_ports(&["eth0"]))
            .await;
        h.engine
            .on_port_config_modify("controller-b", dhcp_ports(&["eth1"]))
            .await;

        assert_eq!(h.engine.state().active_config(), &dhcp_ports(&["eth1"]));
        assert_eq!(h.engine.state().active_precedence(), Precedence::ZEDAGENT);
    }

    #[tokio::test]
    async fn test_identical_modify_is_idempotent() {
        let mut h = harness("model");
        let config = dhcp_ports(&["eth0"]);

        h.engine.on_port_config_modify("global", config.clone()).await;
        h.engine.on_port_config_modify("global", config.clone()).await;

        // Status is still re-projected, but nothing changed so nothing
        // is published twice
        assert_eq!(h.dhcp.call_count(), 1);
        assert_eq!(h.projector.call_count(), 2);
        assert_eq!(h.publisher.count_for(NETWORK_STATUS_TOPIC), 1);
        assert!(h.indicator.signals().is_empty());
    }

    #[tokio::test]
    async fn test_resubmitted_config_picks_up_lease() {
        let mut h = harness("model");
        let config = dhcp_ports(&["eth0"]);

        // Client just started, no lease yet
        h.engine.on_port_config_modify("zedagent", config.clone()).await;
        assert_eq!(h.engine.state().usable_address_count(), 0);
        assert_eq!(h.publisher.count_for(NETWORK_STATUS_TOPIC), 1);

        h.projector.set_addresses("eth0", &["10.0.0.5"]);
        h.engine.on_port_config_modify("zedagent", config).await;

        assert_eq!(h.dhcp.call_count(), 1);
        assert_eq!(h.projector.call_count(), 2);
        assert_eq!(h.engine.state().usable_address_count(), 1);
        assert_eq!(h.indicator.signals(), vec![IndicatorCode::UsableAddress]);

        let items = h.publisher.items_for(NETWORK_STATUS_TOPIC);
        assert_eq!(items.len(), 2);
        let published: devnet_types::NetworkStatus =
            serde_json::from_value(items[1].value.clone()).unwrap();
        assert_eq!(&published, h.engine.state().active_status());
    }

    #[tokio::test]
    async fn test_identical_config_still_updates_precedence() {
        let mut h = harness("model");
        let config = dhcp_ports(&["eth0"]);

        h.engine.on_port_config_modify("global", config.clone()).await;
        h.engine.on_port_config_modify("zedagent", config).await;

        assert_eq!(h.engine.state().active_precedence(), Precedence::ZEDAGENT);
        assert_eq!(h.dhcp.call_count(), 1);
        assert_eq!(h.projector.call_count(), 2);

        // The zedagent source now owns the state, global can no longer delete
        h.engine.on_port_config_delete("global").await;
        assert_eq!(h.engine.state().active_precedence(), Precedence::ZEDAGENT);
    }

    #[tokio::test]
    async fn test_delete_at_non_owning_precedence() {
        let mut h = harness("model");
        h.projector.set_addresses("eth0", &["10.0.0.5"]);
        h.engine
            .on_port_config_modify("override", dhcp_ports(&["eth0"]))
            .await;
        let before = h.engine.state().clone();

        h.engine.on_port_config_delete("global").await;
        h.engine.on_port_config_delete("zedagent").await;

        assert_eq!(h.engine.state(), &before);
        assert_eq!(h.dhcp.call_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_when_unset_is_noop() {
        let mut h = harness("model");
        h.engine.on_port_config_delete("global").await;

        assert_eq!(h.engine.state(), &EffectiveState::new());
        assert_eq!(h.dhcp.call_count(), 0);
        assert_eq!(h.projector.call_count(), 0);
    }

    #[tokio::test]
    async fn test_owning_delete_resets() {
        let mut h = harness("model");
        let config = dhcp_ports(&["eth0"]);
        h.projector.set_addresses("eth0", &["10.0.0.5"]);

        h.engine.on_port_config_modify("zedagent", config.clone()).await;
        assert_eq!(h.engine.state().usable_address_count(), 1);

        h.engine.on_port_config_delete("zedagent").await;

        let state = h.engine.state();
        assert!(state.active_precedence().is_unset());
        assert_eq!(state.active_config(), &PortConfig::default());
        assert!(state.active_status().is_empty());
        assert_eq!(state.usable_address_count(), 0);
        assert_eq!(
            h.dhcp.calls().last().cloned(),
            Some((PortConfig::default(), config))
        );
        assert_eq!(
            h.indicator.signals(),
            vec![IndicatorCode::UsableAddress, IndicatorCode::NoUsableAddress]
        );
        assert_eq!(h.publisher.count_for(NETWORK_STATUS_TOPIC), 2);

        // Unset precedence accepts anything again
        h.engine
            .on_port_config_modify("global", dhcp_ports(&["eth1"]))
            .await;
        assert_eq!(h.engine.state().active_precedence(), Precedence::GLOBAL);
        assert_eq!(h.engine.state().active_config(), &dhcp_ports(&["eth1"]));
    }

    #[tokio::test]
    async fn test_projection_failure_keeps_status() {
        let mut h = harness("model");
        h.projector.set_addresses("eth0", &["10.0.0.5"]);
        h.projector.fail_next(1);

        let config = dhcp_ports(&["eth0"]);
        h.engine.on_port_config_modify("global", config.clone()).await;

        // Config is replaced even though status could not be projected
        assert_eq!(h.engine.state().active_config(), &config);
        assert!(h.engine.state().active_status().is_empty());
        assert_eq!(h.publisher.count_for(NETWORK_STATUS_TOPIC), 0);

        // The next accepted event retries the projection
        h.engine.on_port_config_modify("global", config).await;
        assert_eq!(h.dhcp.call_count(), 1);
        assert_eq!(h.projector.call_count(), 2);
        assert_eq!(h.engine.state().usable_address_count(), 1);
        assert_eq!(h.publisher.count_for(NETWORK_STATUS_TOPIC), 1);
    }

    #[tokio::test]
    async fn test_unchanged_status_not_published() {
        let mut h = harness("model");

        // Two configs that differ only in static gateway project to the
        // same status with the scripted projector
        let mut first = PortConfig::new(vec![static_port("eth0", "10.0.0.5/24", "10.0.0.1")]);
        h.engine.on_port_config_modify("global", first.clone()).await;
        assert_eq!(h.publisher.count_for(NETWORK_STATUS_TOPIC), 1);

        first.ports[0].dhcp_config.gateway = Some("10.0.0.254".parse().unwrap());
        h.engine.on_port_config_modify("global", first).await;

        assert_eq!(h.dhcp.call_count(), 2);
        assert_eq!(h.projector.call_count(), 2);
        assert_eq!(h.publisher.count_for(NETWORK_STATUS_TOPIC), 1);
    }

    #[tokio::test]
    async fn test_take_dirty() {
        let mut h = harness("model");
        assert!(!h.engine.take_dirty());

        h.engine
            .on_port_config_modify("global", dhcp_ports(&["eth0"]))
            .await;
        assert!(h.engine.take_dirty());
        assert!(!h.engine.take_dirty());
    }
}
