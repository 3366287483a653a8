//! Submission pacing
//!
//! The gateway tolerates at most one outstanding historical call and throttles
//! bursts, so submissions are driven by a periodic tick. The pacer decides on
//! each tick whether anything may go out and which request it should be; the
//! service loop only polls the tick while the pacer is armed.
//!
//! A request queued while the pacer is idle waits for the next tick rather
//! than being submitted inline, so it can see up to one interval of latency.

use log::trace;
use std::time::Duration;
use tempo_core::RequestId;

use crate::table::RequestTable;

#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    armed: bool,
    /// Request that continues a chain and goes ahead of the FIFO order
    priority: Option<RequestId>,
    /// Request whose step is on the wire
    in_flight: Option<RequestId>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            armed: false,
            priority: None,
            in_flight: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn priority(&self) -> Option<RequestId> {
        self.priority
    }

    pub fn set_priority(&mut self, id: RequestId) {
        self.priority = Some(id);
    }

    pub fn clear_priority(&mut self) {
        self.priority = None;
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// Record a successful submission and stop ticking until it is answered
    pub fn submitted(&mut self, id: RequestId) {
        self.in_flight = Some(id);
        self.armed = false;
    }

    /// Forget the in-flight request if it is `id`, returns true if it was
    pub fn clear_in_flight_if(&mut self, id: RequestId) -> bool {
        if self.in_flight == Some(id) {
            self.in_flight = None;
            return true;
        }
        false
    }

    pub fn clear_in_flight(&mut self) -> Option<RequestId> {
        self.in_flight.take()
    }

    /// Pick the request to submit on this tick
    ///
    /// Nothing is picked while the session is not ready, while a step is in
    /// flight or when no entry is submittable; in each case the pacer disarms
    /// until something re-arms it. A priority request wins over FIFO order as
    /// long as it is still submittable.
    pub fn select(&mut self, table: &RequestTable, ready: bool) -> Option<RequestId> {
        if !ready {
            trace!("Pacer idle: session not ready");
            self.disarm();
            return None;
        }
        if let Some(id) = self.in_flight {
            trace!("Pacer idle: request {} in flight", id);
            self.disarm();
            return None;
        }

        if let Some(id) = self.priority {
            if table.is_submittable(id) {
                return Some(id);
            }
            trace!("Dropping stale priority {}", id);
            self.priority = None;
        }

        let next = table.first_submittable();
        if next.is_none() {
            trace!("Pacer idle: nothing submittable");
            self.disarm();
        }
        next
    }
}
