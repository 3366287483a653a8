//! Error types for the gateway crate

use thiserror::Error;

/// Errors returned synchronously when handing a call to the session
///
/// Failures the gateway reports later arrive as `GatewayMessage::Error`
/// on the inbound channel instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Not connected to gateway")]
    NotConnected,

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Request rejected by session: {0}")]
    Rejected(String),
}
