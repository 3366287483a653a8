//! Mapping gateway error codes onto scheduler reactions

use tempo_gateway::ErrorCode;

use crate::events::Outcome;

/// How the scheduler reacts to a gateway error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Request failed for a reason other than the symbol
    RequestError,
    /// Instrument unknown or has no data
    BadSymbol,
    /// Session can no longer carry requests
    ConnectionLost,
    ConnectionRestored,
    /// Informational or unknown; logged only
    Unrecognized,
}

impl ErrorClass {
    /// Outcome delivered to the caller when this class finalises a request
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            ErrorClass::RequestError => Some(Outcome::RequestError),
            ErrorClass::BadSymbol => Some(Outcome::BadSymbol),
            _ => None,
        }
    }
}

pub fn classify(code: i32, message: &str) -> ErrorClass {
    match ErrorCode::from(code) {
        // 162 covers both "no data for this symbol" and pacing or timeout failures
        ErrorCode::HistoricalDataService => {
            if is_no_data(message) {
                ErrorClass::BadSymbol
            } else {
                ErrorClass::RequestError
            }
        }
        ErrorCode::NoSecurityDefinition => ErrorClass::BadSymbol,
        ErrorCode::RequestValidation
        | ErrorCode::RequestProcessing
        | ErrorCode::NoHistoricalQuery => ErrorClass::RequestError,
        ErrorCode::NotConnected
        | ErrorCode::ConnectivityLost
        | ErrorCode::ServerConnectivityBroken => ErrorClass::ConnectionLost,
        ErrorCode::ConnectivityRestored | ErrorCode::ConnectivityRestoredDataLost => {
            ErrorClass::ConnectionRestored
        }
        _ => ErrorClass::Unrecognized,
    }
}

fn is_no_data(message: &str) -> bool {
    message.to_ascii_lowercase().contains("no data")
}
