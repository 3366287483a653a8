use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

mod dates;
mod ids;

pub use dates::{BarSize, DateRange, DurationSpec, StartDate};
pub use ids::{RequestId, RequestKey};

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;
