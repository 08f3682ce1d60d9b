//! Error types for devnet operations.
//!
//! None of these errors ever reach the callers of the reconciliation entry
//! points; collaborators return them and the engine logs them.

use std::io;
use thiserror::Error;

/// Result type alias for devnet operations.
pub type DevNetResult<T> = Result<T, DevNetError>;

/// Errors that can occur in devnet collaborators and daemons.
#[derive(Debug, Error)]
pub enum DevNetError {
    /// Failed to execute a shell command (spawn error).
    #[error("Failed to execute shell command '{command}': {source}")]
    ShellExec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Shell command returned non-zero exit code.
    #[error("Shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Network status could not be projected from the configuration.
    #[error("Status projection failed: {message}")]
    Projection {
        /// Error message.
        message: String,
    },

    /// Interface addresses could not be read.
    #[error("Address lookup failed for '{if_name}': {message}")]
    AddressLookup {
        /// The interface being probed.
        if_name: String,
        /// Error message.
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// File system operation failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The path being accessed.
        path: String,
        #[source]
        source: io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error in {context}: {source}")]
    Json {
        /// What was being encoded or decoded.
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DevNetError {
    /// Creates a projection error.
    pub fn projection(message: impl Into<String>) -> Self {
        Self::Projection {
            message: message.into(),
        }
    }

    /// Creates an address lookup error.
    pub fn address_lookup(if_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AddressLookup {
            if_name: if_name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an IO error for a path.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a JSON error.
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DevNetError::Projection { .. }
                | DevNetError::AddressLookup { .. }
                | DevNetError::ShellCommandFailed { .. }
        )
    }
}
