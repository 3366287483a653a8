//! Numeric gateway error codes
//!
//! The gateway reports request failures, connectivity changes and plain
//! status notices through the same error callback. Only the codes the
//! scheduler reacts to get their own variant.

/// Typed view over the gateway's numeric error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// 162: historical data service error (timeouts, empty queries, cancellations)
    HistoricalDataService,
    /// 165: historical data service notice
    HistoricalDataNotice,
    /// 200: no security definition found
    NoSecurityDefinition,
    /// 321: request validation failed
    RequestValidation,
    /// 322: request processing failed
    RequestProcessing,
    /// 366: no historical data query found for the id
    NoHistoricalQuery,
    /// 504: not connected
    NotConnected,
    /// 1100: connectivity between client and gateway lost
    ConnectivityLost,
    /// 1101: connectivity restored, subscriptions lost
    ConnectivityRestoredDataLost,
    /// 1102: connectivity restored, subscriptions kept
    ConnectivityRestored,
    /// 2104: market data farm status
    MarketDataFarmStatus,
    /// 2106: historical data farm status
    HistoricalFarmStatus,
    /// 2110: gateway to server connectivity broken
    ServerConnectivityBroken,
    /// 2158: security definition farm status
    SecDefFarmStatus,
    Other(i32),
}

impl ErrorCode {
    /// Numeric code as sent on the wire
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::HistoricalDataService => 162,
            ErrorCode::HistoricalDataNotice => 165,
            ErrorCode::NoSecurityDefinition => 200,
            ErrorCode::RequestValidation => 321,
            ErrorCode::RequestProcessing => 322,
            ErrorCode::NoHistoricalQuery => 366,
            ErrorCode::NotConnected => 504,
            ErrorCode::ConnectivityLost => 1100,
            ErrorCode::ConnectivityRestoredDataLost => 1101,
            ErrorCode::ConnectivityRestored => 1102,
            ErrorCode::MarketDataFarmStatus => 2104,
            ErrorCode::HistoricalFarmStatus => 2106,
            ErrorCode::ServerConnectivityBroken => 2110,
            ErrorCode::SecDefFarmStatus => 2158,
            ErrorCode::Other(code) => code,
        }
    }

    /// Status notices that carry no failure
    pub fn is_informational(self) -> bool {
        matches!(
            self,
            ErrorCode::HistoricalDataNotice
                | ErrorCode::MarketDataFarmStatus
                | ErrorCode::HistoricalFarmStatus
                | ErrorCode::SecDefFarmStatus
        )
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            162 => ErrorCode::HistoricalDataService,
            165 => ErrorCode::HistoricalDataNotice,
            200 => ErrorCode::NoSecurityDefinition,
            321 => ErrorCode::RequestValidation,
            322 => ErrorCode::RequestProcessing,
            366 => ErrorCode::NoHistoricalQuery,
            504 => ErrorCode::NotConnected,
            1100 => ErrorCode::ConnectivityLost,
            1101 => ErrorCode::ConnectivityRestoredDataLost,
            1102 => ErrorCode::ConnectivityRestored,
            2104 => ErrorCode::MarketDataFarmStatus,
            2106 => ErrorCode::HistoricalFarmStatus,
            2110 => ErrorCode::ServerConnectivityBroken,
            2158 => ErrorCode::SecDefFarmStatus,
            other => ErrorCode::Other(other),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_map_back() {
        for code in [162, 165, 200, 321, 322, 366, 504, 1100, 1101, 1102, 2104, 2106, 2110, 2158] {
            let typed = ErrorCode::from(code);
            assert!(!matches!(typed, ErrorCode::Other(_)), "code {} not mapped", code);
            assert_eq!(typed.code(), code);
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        assert_eq!(ErrorCode::from(10_167), ErrorCode::Other(10_167));
        assert_eq!(ErrorCode::Other(10_167).code(), 10_167);
    }

    #[test]
    fn test_informational() {
        assert!(ErrorCode::MarketDataFarmStatus.is_informational());
        assert!(!ErrorCode::HistoricalDataService.is_informational());
        assert!(!ErrorCode::ConnectivityLost.is_informational());
    }
}
