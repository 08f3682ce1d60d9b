//! Device port configuration reconciliation daemon.
//!
//! This crate implements `devnetd`, which decides which of several competing
//! port configuration sources is in effect, drives DHCP clients to match it
//! and publishes the resulting network status.
//!
//! # Responsibilities
//!
//! - Arbitrate port configuration sources by precedence
//! - Start and stop per-interface DHCP clients on configuration change
//! - Project the active configuration into network status
//! - Signal connectivity changes on the LED blink counter
//! - Derive port configuration from the per-model legacy description
//!
//! # Sources
//!
//! A lower precedence value wins; an equal value takes over.
//!
//! | Key | Precedence | Origin |
//! |-----|------------|--------|
//! | `global` | 3 | per-platform configuration |
//! | `override` | 2 | build or USB stick |
//! | any other | 1 | controller, or the legacy model path |
//!
//! # Topics
//!
//! | Topic | Key | Content |
//! |-------|-----|---------|
//! | DevicePortConfig | global | port config derived from the legacy path |
//! | DeviceNetworkStatus | global | active network status |
//!
//! # Example
//!
//! ```ignore
//! use devnetd::{Collaborators, DeviceNetworkEngine, DevNetMgr};
//!
//! let engine = DeviceNetworkEngine::new(collaborators, "Supermicro.SYS-E100-9APP");
//! let mut mgr = DevNetMgr::new(engine);
//! mgr.enqueue_port_configs(source.poll());
//! mgr.do_task().await;
//! ```

mod availability;
mod builder;
pub mod config;
mod dhcp;
mod engine;
mod led;
mod legacy;
mod mgr;
mod precedence;
mod projector;
mod source;
mod state;
pub mod topics;

pub use availability::{availability_transition, AvailabilityNotifier, UsableAddressCounter};
pub use builder::UplinkPortConfigBuilder;
pub use config::DaemonConfig;
pub use dhcp::{DhcpDelta, DhcpcdLifecycle};
pub use engine::{Collaborators, DeviceNetworkEngine};
pub use led::{LedIndicator, DEFAULT_LED_CONFIG_PATH};
pub use legacy::LegacySource;
pub use mgr::DevNetMgr;
pub use precedence::{precedence_of, Precedence};
pub use projector::{AddressSource, InterfaceAddresses, PortStatusProjector, SystemAddressSource};
pub use source::DirectorySource;
pub use state::EffectiveState;
