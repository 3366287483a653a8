//! Session port
//!
//! The single persistent connection to the gateway. Calls are fire-and-forget:
//! each `submit_*` hands one wire call to the session and returns immediately,
//! the reply shows up later on the inbound channel keyed by the same id.

pub mod channel;

use crate::error::GatewayError;
use chrono::{NaiveDate, TimeDelta};
use tempo_core::{BarSize, DurationSpec, InstrumentRef, RequestId};

/// Connection to the external market-data gateway
pub trait GatewaySession: Send + Sync {
    /// Open the session, `ConnectAck` follows on the inbound channel
    fn connect(&self) -> Result<(), GatewayError>;

    /// Close the session, `ConnectionClosed` follows on the inbound channel
    fn disconnect(&self);

    fn is_connected(&self) -> bool;

    /// Gateway clock minus local clock
    fn server_time_offset(&self) -> TimeDelta;

    /// Look up the listing exchange of an instrument
    fn submit_resolve_exchange(
        &self,
        id: RequestId,
        instrument: &InstrumentRef,
    ) -> Result<(), GatewayError>;

    /// Ask for the first date the gateway holds data for
    fn submit_resolve_first_available_date(
        &self,
        id: RequestId,
        instrument: &InstrumentRef,
    ) -> Result<(), GatewayError>;

    /// Fetch bars covering `duration` back from `end`
    fn submit_fetch_historical_bars(
        &self,
        id: RequestId,
        instrument: &InstrumentRef,
        end: NaiveDate,
        duration: DurationSpec,
        bar_size: BarSize,
    ) -> Result<(), GatewayError>;
}
