use serde::{Deserialize, Serialize};
use tempo_core::{InstrumentRef, RequestKey};
use tokio::sync::mpsc;

/// Final result of a logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    BadSymbol,
    RequestError,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::BadSymbol => write!(f, "bad symbol"),
            Outcome::RequestError => write!(f, "request error"),
        }
    }
}

/// Notifications emitted by the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchedulerEvent {
    /// Exactly one per logical request that was not cancelled
    DataResponse {
        key: RequestKey,
        instrument: InstrumentRef,
        outcome: Outcome,
    },
    /// Session readiness flipped
    ConnectionStatusChanged { ready: bool },
}

pub type EventSender = mpsc::UnboundedSender<SchedulerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SchedulerEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
