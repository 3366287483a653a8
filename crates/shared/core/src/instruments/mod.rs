//! Instrument handles shared between the scheduler and its callers
//!
//! A [`Security`] is the place the scheduler writes resolved contract details
//! and received bars into. Instrument persistence belongs to the caller.

mod security;

pub use security::{InstrumentRef, Security, UNKNOWN_EXCHANGE};
