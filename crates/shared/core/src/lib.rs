//! Tempo Core Domain
//!
//! Pure domain types shared by the gateway port and the request scheduler.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod instruments;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::Bar;
pub use instruments::{InstrumentRef, Security, UNKNOWN_EXCHANGE};
pub use values::{
    BarSize, DateRange, DurationSpec, Price, RequestId, RequestKey, StartDate, Timestamp,
};
