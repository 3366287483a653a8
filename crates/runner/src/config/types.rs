use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tempo_core::{DateRange, Security};
use tempo_gateway::SimulatedListing;
use tempo_scheduler::SchedulerConfig;

/// Runner configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Give up if no outcome arrives for this long
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Instruments known to the simulated gateway
    pub listings: Vec<SimulatedListing>,
    pub requests: Vec<RequestSpec>,
}

fn default_timeout_secs() -> u64 {
    120
}

/// One caller-level request in the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestSpec {
    /// Daily prices; the exchange is resolved when omitted and the start
    /// defaults to the first date with data
    Prices {
        ticker: String,
        #[serde(default)]
        exchange: Option<String>,
        #[serde(default)]
        start: Option<NaiveDate>,
        end: NaiveDate,
    },
    /// Listing exchange only
    Contract { ticker: String },
}

impl RequestSpec {
    pub fn ticker(&self) -> &str {
        match self {
            RequestSpec::Prices { ticker, .. } | RequestSpec::Contract { ticker } => ticker,
        }
    }

    /// Security handle the request will fill in
    pub fn security(&self) -> Security {
        match self {
            RequestSpec::Prices {
                ticker,
                exchange: Some(exchange),
                ..
            } => Security::new(ticker.as_str(), exchange.as_str()),
            _ => Security::unresolved(self.ticker()),
        }
    }

    /// Requested range, `None` for contract requests
    pub fn range(&self) -> Option<DateRange> {
        match self {
            RequestSpec::Prices {
                start: Some(start),
                end,
                ..
            } => Some(DateRange::new(*start, *end)),
            RequestSpec::Prices {
                start: None, end, ..
            } => Some(DateRange::until(*end)),
            RequestSpec::Contract { .. } => None,
        }
    }
}

impl RunnerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
