//! Simulated gateway session
//!
//! Answers each wire call synchronously by posting the reply on the inbound
//! channel, so from the consumer's point of view replies are still
//! asynchronous: they are only seen on the next turn of its loop.

use crate::error::GatewayError;
use crate::messages::{ErrorCode, ExchangeCandidate, GatewayMessage};
use crate::transport::GatewaySession;
use crate::transport::channel::InboundSender;
use chrono::{Days, Months, NaiveDate, TimeDelta};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tempo_core::{BarSize, DurationSpec, InstrumentRef, RequestId};

use super::listing::SimulatedListing;

const NO_DATA_MESSAGE: &str = "Historical Market Data Service error message:HMDS query returned no data";
const NO_DEFINITION_MESSAGE: &str = "No security definition has been found for the request";

/// In-process gateway backed by a fixed set of listings
pub struct SimulatedGateway {
    /// Listings keyed by upper-cased ticker
    listings: HashMap<String, SimulatedListing>,
    inbound: InboundSender,
    connected: AtomicBool,
    submissions: AtomicU64,
    /// Errors to answer the next calls with, oldest first
    scripted_errors: Mutex<VecDeque<(ErrorCode, String)>>,
    server_time_offset: TimeDelta,
}

impl SimulatedGateway {
    /// Create a disconnected gateway; call `connect` before submitting
    pub fn new(
        listings: impl IntoIterator<Item = SimulatedListing>,
        inbound: InboundSender,
    ) -> Self {
        let listings = listings
            .into_iter()
            .map(|listing| (listing.ticker.to_ascii_uppercase(), listing))
            .collect();

        Self {
            listings,
            inbound,
            connected: AtomicBool::new(false),
            submissions: AtomicU64::new(0),
            scripted_errors: Mutex::new(VecDeque::new()),
            server_time_offset: TimeDelta::zero(),
        }
    }

    /// Report a fixed clock offset from `server_time_offset`
    pub fn with_server_time_offset(mut self, offset: TimeDelta) -> Self {
        self.server_time_offset = offset;
        self
    }

    /// Number of wire calls accepted so far
    pub fn submissions(&self) -> u64 {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Answer the next accepted call with this error instead of data
    pub fn fail_next_with(&self, code: ErrorCode, message: impl Into<String>) {
        self.scripted_errors.lock().push_back((code, message.into()));
    }

    /// Simulate a connectivity loss reported by the gateway
    pub fn drop_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.post(GatewayMessage::error(
            None,
            ErrorCode::ConnectivityLost,
            "Connectivity between IB and Trader Workstation has been lost.",
        ));
    }

    /// Simulate connectivity coming back
    pub fn restore_connection(&self) {
        self.connected.store(true, Ordering::SeqCst);
        self.post(GatewayMessage::error(
            None,
            ErrorCode::ConnectivityRestored,
            "Connectivity between IB and Trader Workstation has been restored - data maintained.",
        ));
    }

    fn post(&self, msg: GatewayMessage) {
        if self.inbound.send(msg).is_err() {
            warn!("Simulated gateway inbound channel closed, dropping message");
        }
    }

    fn listing(&self, ticker: &str) -> Option<&SimulatedListing> {
        self.listings.get(&ticker.to_ascii_uppercase())
    }

    /// Count the call and return a scripted error if one is queued
    fn accept(&self, id: RequestId) -> Result<Option<GatewayMessage>, GatewayError> {
        if !self.is_connected() {
            return Err(GatewayError::NotConnected);
        }
        self.submissions.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .scripted_errors
            .lock()
            .pop_front()
            .map(|(code, message)| GatewayMessage::error(Some(id), code, message)))
    }

    /// First date covered by a fetch of `duration` ending at `end`
    fn window_start(end: NaiveDate, duration: DurationSpec) -> NaiveDate {
        let start = match duration {
            DurationSpec::Days(days) => {
                end.checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
            }
            DurationSpec::Years(years) => end.checked_sub_months(Months::new(12 * years)),
        };
        start.unwrap_or(NaiveDate::MIN)
    }
}

impl GatewaySession for SimulatedGateway {
    fn connect(&self) -> Result<(), GatewayError> {
        self.connected.store(true, Ordering::SeqCst);
        info!("Simulated gateway connected");
        self.post(GatewayMessage::ConnectAck);
        self.post(GatewayMessage::error(
            None,
            ErrorCode::MarketDataFarmStatus,
            "Market data farm connection is OK:usfarm",
        ));
        Ok(())
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        info!("Simulated gateway disconnected");
        self.post(GatewayMessage::ConnectionClosed);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn server_time_offset(&self) -> TimeDelta {
        self.server_time_offset
    }

    fn submit_resolve_exchange(
        &self,
        id: RequestId,
        instrument: &InstrumentRef,
    ) -> Result<(), GatewayError> {
        if let Some(error) = self.accept(id)? {
            self.post(error);
            return Ok(());
        }
        debug!("[sim] resolve exchange {} for {}", id, instrument.ticker);

        let reply = match self.listing(&instrument.ticker) {
            Some(listing) => GatewayMessage::ExchangeResolved {
                id,
                candidates: vec![ExchangeCandidate::new("SMART", &listing.exchange, "USD")],
            },
            None => GatewayMessage::error(
                Some(id),
                ErrorCode::NoSecurityDefinition,
                NO_DEFINITION_MESSAGE,
            ),
        };
        self.post(reply);
        Ok(())
    }

    fn submit_resolve_first_available_date(
        &self,
        id: RequestId,
        instrument: &InstrumentRef,
    ) -> Result<(), GatewayError> {
        if let Some(error) = self.accept(id)? {
            self.post(error);
            return Ok(());
        }
        debug!("[sim] first available date {} for {}", id, instrument.ticker);

        let reply = match self.listing(&instrument.ticker) {
            Some(listing) => GatewayMessage::FirstAvailableDate {
                id,
                date: listing.first_date,
            },
            None => {
                GatewayMessage::error(Some(id), ErrorCode::HistoricalDataService, NO_DATA_MESSAGE)
            }
        };
        self.post(reply);
        Ok(())
    }

    fn submit_fetch_historical_bars(
        &self,
        id: RequestId,
        instrument: &InstrumentRef,
        end: NaiveDate,
        duration: DurationSpec,
        bar_size: BarSize,
    ) -> Result<(), GatewayError> {
        if let Some(error) = self.accept(id)? {
            self.post(error);
            return Ok(());
        }
        debug!(
            "[sim] fetch {} for {} ending {} over {} ({})",
            id, instrument.ticker, end, duration, bar_size
        );

        let Some(listing) = self.listing(&instrument.ticker) else {
            self.post(GatewayMessage::error(
                Some(id),
                ErrorCode::HistoricalDataService,
                NO_DATA_MESSAGE,
            ));
            return Ok(());
        };

        let start = Self::window_start(end, duration);
        for bar in listing.daily_bars(start, end) {
            self.post(GatewayMessage::Bar { id, bar });
        }
        self.post(GatewayMessage::HistoricalDataEnd {
            id,
            start: start.max(listing.first_date),
            end,
        });
        Ok(())
    }
}
