//! Callback messages posted by the session

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempo_core::{Bar, RequestId};

use super::codes::ErrorCode;

/// One contract match returned by an exchange lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeCandidate {
    /// Routing exchange (often a smart router)
    pub exchange: String,
    /// Venue the instrument is actually listed on
    pub primary_exchange: String,
    pub currency: String,
}

impl ExchangeCandidate {
    pub fn new(
        exchange: impl Into<String>,
        primary_exchange: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            primary_exchange: primary_exchange.into(),
            currency: currency.into(),
        }
    }

    /// Listing venue, falling back to the routing exchange when no primary is given
    pub fn listing_exchange(&self) -> Option<&str> {
        [self.primary_exchange.as_str(), self.exchange.as_str()]
            .into_iter()
            .find(|exchange| !exchange.is_empty())
    }
}

/// Decoded inbound callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GatewayMessage {
    /// Reply to an exchange lookup
    ExchangeResolved {
        id: RequestId,
        candidates: Vec<ExchangeCandidate>,
    },
    /// Reply to a first-available-date lookup
    FirstAvailableDate { id: RequestId, date: NaiveDate },
    /// One bar of a historical fetch
    Bar { id: RequestId, bar: Bar },
    /// Historical fetch finished, covering `[start, end]`
    HistoricalDataEnd {
        id: RequestId,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Error or notice; `id` is `None` for session-wide messages
    Error {
        id: Option<RequestId>,
        code: i32,
        message: String,
    },
    /// Session handshake completed
    ConnectAck,
    /// Session closed
    ConnectionClosed,
}

impl GatewayMessage {
    /// Build an error message from a typed code
    pub fn error(id: Option<RequestId>, code: ErrorCode, message: impl Into<String>) -> Self {
        GatewayMessage::Error {
            id,
            code: code.code(),
            message: message.into(),
        }
    }

    /// Request the message belongs to, if any
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            GatewayMessage::ExchangeResolved { id, .. }
            | GatewayMessage::FirstAvailableDate { id, .. }
            | GatewayMessage::Bar { id, .. }
            | GatewayMessage::HistoricalDataEnd { id, .. } => Some(*id),
            GatewayMessage::Error { id, .. } => *id,
            GatewayMessage::ConnectAck | GatewayMessage::ConnectionClosed => None,
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayMessage::ExchangeResolved { .. } => "ExchangeResolved",
            GatewayMessage::FirstAvailableDate { .. } => "FirstAvailableDate",
            GatewayMessage::Bar { .. } => "Bar",
            GatewayMessage::HistoricalDataEnd { .. } => "HistoricalDataEnd",
            GatewayMessage::Error { .. } => "Error",
            GatewayMessage::ConnectAck => "ConnectAck",
            GatewayMessage::ConnectionClosed => "ConnectionClosed",
        }
    }
}
