//! Tempo Gateway
//!
//! Port to the external market-data gateway. Provides:
//! - The [`GatewaySession`] trait the scheduler submits wire calls through
//! - Inbound callback messages, posted on an unbounded channel by the session
//! - Typed numeric error codes
//! - An in-process simulated gateway for demos and tests
//!
//! ## Architecture
//!
//! ```text
//!         Scheduler
//!            │ submit_* (id, instrument, ...)
//!       ┌────▼────┐
//!       │ Gateway │  one persistent session
//!       │ Session │
//!       └────┬────┘
//!            │ GatewayMessage (ExchangeResolved, Bar, Error, ...)
//!            ▼
//!   inbound channel ──► scheduling loop
//! ```
//!
//! Framing and encoding of the real protocol are left to the vendor SDK that
//! implements [`GatewaySession`]; this crate only fixes the shapes.

pub mod adapters;
pub mod error;
pub mod messages;
pub mod transport;

// Re-export commonly used types
pub use adapters::simulator::{SimulatedGateway, SimulatedListing};
pub use error::GatewayError;
pub use messages::{ErrorCode, ExchangeCandidate, GatewayMessage};
pub use transport::{
    GatewaySession,
    channel::{InboundReceiver, InboundSender, inbound_channel},
};
