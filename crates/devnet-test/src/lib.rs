//! Test infrastructure for devnet daemons
//!
//! Provides:
//! - Fixtures for port configurations, legacy configs and network status
//! - Recording collaborators that capture every engine side effect
//! - A scripted status projector with injectable addresses and failures

pub mod fixtures;
mod recorders;

pub use fixtures::*;
pub use recorders::*;
