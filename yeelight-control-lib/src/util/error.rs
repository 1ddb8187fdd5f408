//! Error types for discovery and device control.
use std::time::Duration;

use thiserror::Error;

/// Errors raised while discovering or commanding a device.
///
/// Every variant aborts the operation that produced it. Nothing in this crate
/// retries; the caller decides whether to try again, exit, or report.
#[derive(Error, Debug)]
pub enum YeelightError {
    /// No local interface carries a private (RFC1918) IPv4 address.
    #[error("no private IPv4 address found on any local interface")]
    NoLocalAddress,

    /// The local interfaces could not be listed.
    #[error("failed to enumerate network interfaces: {0}")]
    InterfaceEnumeration(String),

    /// A socket operation failed.
    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// No discovery reply arrived in time.
    #[error("no discovery reply received within {0:?}")]
    Timeout(Duration),

    /// The descriptor address is not a `host:port` pair.
    #[error("invalid device address `{0}`, expected host:port")]
    InvalidAddress(String),

    /// The command could not be serialized.
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
}

impl YeelightError {
    pub(crate) fn transport(operation: &'static str, source: std::io::Error) -> Self {
        YeelightError::Transport { operation, source }
    }

    /// True for socket level failures (bind, send, receive, connect, write).
    pub fn is_transport(&self) -> bool {
        matches!(self, YeelightError::Transport { .. })
    }
}

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, YeelightError>;
