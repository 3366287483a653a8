use tempo_core::{DateRange, RequestId};
use tempo_gateway::GatewayError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::request::Step;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid date range for {ticker}: {range}")]
    InvalidRange { ticker: String, range: DateRange },

    #[error("Scheduler service has stopped")]
    ServiceStopped,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Gateway traffic that does not fit the request table's state
///
/// These are logged and the offending message is dropped; they never abort the
/// scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("{callback} for unknown request id {id}")]
    UnmatchedId { id: RequestId, callback: &'static str },

    #[error("{callback} for request {id} does not match its in-flight step {expected:?}")]
    UnexpectedCallback {
        id: RequestId,
        callback: &'static str,
        expected: Option<Step>,
    },

    #[error("request {id} was selected but has no step left to submit")]
    NothingToSubmit { id: RequestId },

    #[error("request {id} reached {step} before its start date was resolved")]
    UnresolvedStart { id: RequestId, step: Step },
}
