//! Source precedence policy.

use std::fmt;

use crate::topics::keys;

/// Priority of a configuration source; smaller wins.
///
/// [`Precedence::UNSET`] means no source is currently authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precedence(u8);

impl Precedence {
    /// No source has been accepted (or the owner was deleted).
    pub const UNSET: Self = Precedence(0);

    /// Controller-provided configuration under any non-reserved key.
    pub const ZEDAGENT: Self = Precedence(1);

    /// Override configuration.
    pub const OVERRIDE: Self = Precedence(2);

    /// Platform default configuration.
    pub const GLOBAL: Self = Precedence(3);

    pub const fn value(&self) -> u8 {
        self.0
    }

    pub const fn is_unset(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if an update at `self` may take over from `active`.
    ///
    /// Equal precedence takes over, so the latest update from the same tier
    /// always wins.
    pub fn may_take_over(&self, active: Precedence) -> bool {
        active.is_unset() || *self <= active
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps a source key to its precedence.
pub fn precedence_of(source_key: &str) -> Precedence {
    match source_key {
        keys::GLOBAL => Precedence::GLOBAL,
        keys::OVERRIDE => Precedence::OVERRIDE,
        _ => Precedence::ZEDAGENT,
    }
}
