//! Connectivity availability signaling and status publication.

use std::sync::Arc;

use tracing::{info, warn};

use devnet_common::{AddressCounter, Indicator, IndicatorCode, Publisher};
use devnet_types::{count_usable_addresses, NetworkStatus};

use crate::state::EffectiveState;
use crate::topics::{keys, NETWORK_STATUS_TOPIC};

/// Counts assigned addresses across all ports, ignoring link-local scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsableAddressCounter;

impl AddressCounter for UsableAddressCounter {
    fn count_usable(&self, status: &NetworkStatus) -> usize {
        count_usable_addresses(status)
    }
}

/// Returns the indicator code for a usable address count transition.
///
/// Only crossing the zero boundary produces a signal.
pub fn availability_transition(previous: usize, current: usize) -> Option<IndicatorCode> {
    match (previous, current) {
        (p, 0) if p != 0 => Some(IndicatorCode::NoUsableAddress),
        (0, c) if c != 0 => Some(IndicatorCode::UsableAddress),
        _ => None,
    }
}

/// Signals connectivity transitions and publishes status.
///
/// Run by the engine every time the active status object changes.
pub struct AvailabilityNotifier {
    counter: Box<dyn AddressCounter>,
    indicator: Box<dyn Indicator>,
    publisher: Arc<dyn Publisher>,
}

impl AvailabilityNotifier {
    pub fn new(
        counter: Box<dyn AddressCounter>,
        indicator: Box<dyn Indicator>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            counter,
            indicator,
            publisher,
        }
    }

    /// Updates the cached address count, signals boundary crossings and
    /// publishes the active status unconditionally.
    pub(crate) fn notify(&self, state: &mut EffectiveState) {
        let count = self.counter.count_usable(&state.active_status);
        let previous = state.usable_address_count;

        if let Some(code) = availability_transition(previous, count) {
            info!(
                "DeviceNetworkStatus from {} to {} addresses, signaling {:?}",
                previous, count, code
            );
            self.indicator.signal(code);
        }
        state.usable_address_count = count;

        match serde_json::to_value(&state.active_status) {
            Ok(value) => self
                .publisher
                .publish(NETWORK_STATUS_TOPIC, keys::GLOBAL, value),
            Err(e) => warn!("Failed to encode network status for publication: {}", e),
        }

        state.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devnet_test::{port_status, status, RecordingIndicator, RecordingPublisher};
    use pretty_assertions::assert_eq;

    fn notifier() -> (AvailabilityNotifier, RecordingIndicator, RecordingPublisher) {
        let indicator = RecordingIndicator::new();
        let publisher = RecordingPublisher::new();
        let notifier = AvailabilityNotifier::new(
            Box::new(UsableAddressCounter),
            Box::new(indicator.clone()),
            Arc::new(publisher.clone()),
        );
        (notifier, indicator, publisher)
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(availability_transition(0, 0), None);
        assert_eq!(
            availability_transition(0, 2),
            Some(IndicatorCode::UsableAddress)
        );
        assert_eq!(availability_transition(2, 3), None);
        assert_eq!(availability_transition(3, 1), None);
        assert_eq!(
            availability_transition(2, 0),
            Some(IndicatorCode::NoUsableAddress)
        );
    }

    #[test]
    fn test_gain_and_lose_addresses() {
        let (notifier, indicator, publisher) = notifier();
        let mut state = EffectiveState::new();

        state.active_status = status(vec![port_status("eth0", &["10.0.0.5", "2001:db8::5"])]);
        notifier.notify(&mut state);
        assert_eq!(state.usable_address_count(), 2);
        assert_eq!(indicator.signals(), vec![IndicatorCode::UsableAddress]);

        state.active_status = status(vec![port_status("eth0", &["fe80::1"])]);
        notifier.notify(&mut state);
        assert_eq!(state.usable_address_count(), 0);
        assert_eq!(
            indicator.signals(),
            vec![IndicatorCode::UsableAddress, IndicatorCode::NoUsableAddress]
        );

        assert_eq!(publisher.count_for(NETWORK_STATUS_TOPIC), 2);
    }

    #[test]
    fn test_publishes_without_boundary_crossing() {
        let (notifier, indicator, publisher) = notifier();
        let mut state = EffectiveState::new();
        state.usable_address_count = 1;
        state.active_status = status(vec![port_status("eth0", &["10.0.0.5", "10.0.0.6"])]);

        notifier.notify(&mut state);

        assert!(indicator.signals().is_empty());
        assert_eq!(state.usable_address_count(), 2);
        assert!(state.is_dirty());

        let items = publisher.items_for(NETWORK_STATUS_TOPIC);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, "global");
        let published: NetworkStatus = serde_json::from_value(items[0].value.clone()).unwrap();
        assert_eq!(published, state.active_status);
    }
}
