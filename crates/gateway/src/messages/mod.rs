//! Inbound message types
//!
//! Everything the gateway sends back, already decoded by the session.

pub mod codes;
pub mod inbound;

pub use codes::ErrorCode;
pub use inbound::{ExchangeCandidate, GatewayMessage};
