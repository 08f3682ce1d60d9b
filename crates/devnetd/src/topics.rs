//! Topic and source key constants for devnetd.

/// Topic for derived port configuration (legacy path output).
pub const PORT_CONFIG_TOPIC: &str = "DevicePortConfig";

/// Topic for network status.
pub const NETWORK_STATUS_TOPIC: &str = "DeviceNetworkStatus";

/// Topic name used for legacy model configuration sources.
pub const LEGACY_CONFIG_TOPIC: &str = "DeviceNetworkConfig";

/// Reserved source keys.
pub mod keys {
    /// Platform default configuration; lowest precedence.
    pub const GLOBAL: &str = "global";

    /// Build-time or USB stick override.
    pub const OVERRIDE: &str = "override";
}
