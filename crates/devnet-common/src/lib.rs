//! Common infrastructure for devnet daemons.
//!
//! This crate provides the pieces shared by the device network daemons:
//!
//! - [`Orch`]: Base trait for event-driven managers
//! - [`Consumer`]: Ordered queue of typed source events
//! - [`Publication`]: Keyed publication store implementing [`Publisher`]
//! - [`collaborators`]: Interfaces the reconciliation engine drives
//! - [`shell`]: Shell command execution with proper quoting
//! - [`error`]: Error types shared by collaborators
//!
//! # Architecture
//!
//! Managers follow this pattern:
//!
//! 1. A transport adapter decodes source payloads into typed values
//! 2. Events are queued on a [`Consumer`] per source group
//! 3. The daemon loop calls [`Orch::do_task`], which drains consumers in
//!    arrival order and dispatches to the manager's typed entry points
//! 4. Results are published through a [`Publisher`]
//!
//! # Example
//!
//! ```ignore
//! use devnet_common::{Consumer, ConsumerConfig, Orch, SourceEvent};
//!
//! let mut consumer = Consumer::new(ConsumerConfig::new("DevicePortConfig"));
//! consumer.push(SourceEvent::set("override", config));
//!
//! for event in consumer.drain() {
//!     match event {
//!         SourceEvent::Set { key, value } => engine.on_port_config_modify(&key, value).await,
//!         SourceEvent::Del { key } => engine.on_port_config_delete(&key).await,
//!     }
//! }
//! ```

pub mod collaborators;
pub mod error;
pub mod shell;

mod consumer;
mod orch;
mod publication;

pub use collaborators::{
    AddressCounter, ConfigBuilder, DhcpLifecycle, Indicator, IndicatorCode, StatusProjector,
};
pub use consumer::{Consumer, ConsumerConfig, Operation, SourceEvent};
pub use error::{DevNetError, DevNetResult};
pub use orch::Orch;
pub use publication::{Publication, PublishedItem, Publisher};
