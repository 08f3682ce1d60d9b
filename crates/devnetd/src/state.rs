//! Effective configuration state owned by the reconciliation engine.

use devnet_types::{NetworkStatus, PortConfig};

use crate::precedence::Precedence;

/// The single authoritative record of configuration and status.
///
/// Only [`DeviceNetworkEngine`](crate::DeviceNetworkEngine) mutates this;
/// everyone else gets a shared reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveState {
    pub(crate) active_config: PortConfig,
    pub(crate) active_precedence: Precedence,
    pub(crate) active_status: NetworkStatus,
    pub(crate) usable_address_count: usize,
    pub(crate) dirty: bool,
}

impl EffectiveState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_config(&self) -> &PortConfig {
        &self.active_config
    }

    pub fn active_precedence(&self) -> Precedence {
        self.active_precedence
    }

    pub fn active_status(&self) -> &NetworkStatus {
        &self.active_status
    }

    /// Usable address count as of the last availability notification.
    pub fn usable_address_count(&self) -> usize {
        self.usable_address_count
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns true if a Modify at `precedence` is accepted.
    pub fn accepts_modify(&self, precedence: Precedence) -> bool {
        precedence.may_take_over(self.active_precedence)
    }

    /// Returns true if a Delete at `precedence` is accepted.
    ///
    /// Only the owning source can clear the active state.
    pub fn accepts_delete(&self, precedence: Precedence) -> bool {
        precedence == self.active_precedence
    }

    /// Clears the dirty flag, returning its previous value.
    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
