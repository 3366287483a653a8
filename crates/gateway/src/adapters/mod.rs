//! Gateway adapters
//!
//! Implementations of [`GatewaySession`](crate::GatewaySession). A production
//! adapter wraps the vendor SDK; the simulator answers in-process.

pub mod simulator;

pub use simulator::{SimulatedGateway, SimulatedListing};
