//! Simulated gateway
//!
//! Deterministic in-process stand-in for the real gateway, answering every
//! wire call immediately on the inbound channel.

mod gateway;
mod listing;

pub use gateway::SimulatedGateway;
pub use listing::SimulatedListing;
