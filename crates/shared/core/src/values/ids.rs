use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire-level request identifier
///
/// Every call sent to the gateway carries one of these. Ids are handed out by a
/// single increasing counter owned by the scheduler, so ordering ids also orders
/// requests by the time they entered the request table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Raw numeric value as sent on the wire
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one caller-level request
///
/// A single price request may be split into several wire calls and partition
/// chunks, each with its own [`RequestId`]. The key stays the same across all of
/// them and is what the caller receives back with the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey(pub Uuid);

impl RequestKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
