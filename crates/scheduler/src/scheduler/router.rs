//! Routing gateway callbacks back to the request they answer

use chrono::NaiveDate;
use log::{debug, info, trace, warn};
use tempo_core::{Bar, RequestId, StartDate};
use tempo_gateway::{ErrorCode, ExchangeCandidate, GatewayMessage};

use super::RequestScheduler;
use crate::classify::{ErrorClass, classify};
use crate::error::ProtocolViolation;
use crate::events::{Outcome, SchedulerEvent};
use crate::partition;
use crate::request::{LogicalRequest, Step};

impl RequestScheduler {
    /// Apply one inbound gateway message
    pub fn handle_message(&mut self, message: GatewayMessage) {
        match message {
            GatewayMessage::ConnectAck => self.set_ready(true),
            GatewayMessage::ConnectionClosed => {
                warn!("Gateway connection closed");
                self.connection_lost();
            }
            GatewayMessage::Error { id, code, message } => self.on_error(id, code, &message),
            GatewayMessage::ExchangeResolved { id, candidates } => {
                self.on_exchange_resolved(id, &candidates)
            }
            GatewayMessage::FirstAvailableDate { id, date } => {
                self.on_first_available_date(id, date)
            }
            GatewayMessage::Bar { id, bar } => self.on_bar(id, bar),
            GatewayMessage::HistoricalDataEnd { id, start, end } => {
                debug!("Request {} delivered bars for [{}, {}]", id, start, end);
                if self.accept_callback(id, "HistoricalDataEnd", Step::FetchHistoricalBars) {
                    self.advance(id);
                }
            }
        }
    }

    /// True if `id` is live and its in-flight step is `expected`
    ///
    /// Callbacks for cancelled requests retire the request here.
    fn accept_callback(&mut self, id: RequestId, callback: &'static str, expected: Step) -> bool {
        match self.table.inspect(id, |request| (request.done, request.in_flight)) {
            None => {
                trace!("{}", ProtocolViolation::UnmatchedId { id, callback });
                false
            }
            Some((true, _)) => {
                self.drop_cancelled(id);
                false
            }
            Some((false, in_flight)) if in_flight == Some(expected) => true,
            Some((false, in_flight)) => {
                warn!(
                    "{}",
                    ProtocolViolation::UnexpectedCallback {
                        id,
                        callback,
                        expected: in_flight,
                    }
                );
                false
            }
        }
    }

    fn drop_cancelled(&mut self, id: RequestId) {
        debug!("Discarding callback for cancelled request {}", id);
        self.table.remove(id);
        self.pacer.clear_in_flight_if(id);
        self.pacer.arm();
    }

    fn on_error(&mut self, id: Option<RequestId>, code: i32, message: &str) {
        let class = classify(code, message);
        match class {
            ErrorClass::ConnectionLost => {
                warn!("Gateway connectivity lost ({}): {}", code, message);
                self.connection_lost();
            }
            ErrorClass::ConnectionRestored => {
                info!("Gateway connectivity restored ({}): {}", code, message);
                self.set_ready(true);
            }
            ErrorClass::Unrecognized => {
                if ErrorCode::from(code).is_informational() {
                    debug!("Gateway notice {}: {}", code, message);
                } else {
                    info!("Unhandled gateway error {} for {:?}: {}", code, id, message);
                }
            }
            ErrorClass::BadSymbol | ErrorClass::RequestError => {
                let Some(id) = id else {
                    warn!("Gateway error {} without a request id: {}", code, message);
                    return;
                };
                match self.table.inspect(id, |request| request.done) {
                    None => trace!("{}", ProtocolViolation::UnmatchedId { id, callback: "Error" }),
                    Some(true) => self.drop_cancelled(id),
                    Some(false) => {
                        warn!("Request {} failed with {}: {}", id, code, message);
                        if let Some(outcome) = class.outcome() {
                            self.finalize(id, outcome);
                        }
                    }
                }
            }
        }
    }

    fn on_exchange_resolved(&mut self, id: RequestId, candidates: &[ExchangeCandidate]) {
        if !self.accept_callback(id, "ExchangeResolved", Step::ResolveExchange) {
            return;
        }

        let Some(exchange) = candidates
            .iter()
            .find_map(ExchangeCandidate::listing_exchange)
        else {
            info!("No listing found for request {}", id);
            self.finalize(id, Outcome::BadSymbol);
            return;
        };
        if candidates.len() > 1 {
            debug!(
                "{} listings for request {}, using {}",
                candidates.len(),
                id,
                exchange
            );
        }

        let exchange = exchange.to_string();
        let partition = self.partition;
        self.table.update(id, |request| {
            request.security.set_exchange(exchange);
            partition::maybe_partition(request, &partition);
        });
        self.advance(id);
    }

    fn on_first_available_date(&mut self, id: RequestId, date: NaiveDate) {
        if !self.accept_callback(id, "FirstAvailableDate", Step::ResolveFirstAvailableDate) {
            return;
        }

        let floor = self.config.early_date_floor;
        let start = date.max(floor);
        if start != date {
            debug!("Clamping first available date {} to {}", date, floor);
        }

        let partition = self.partition;
        let past_end = self
            .table
            .update(id, |request| {
                let Some(range) = request.range.as_mut() else {
                    return false;
                };
                range.start = StartDate::On(start);
                if range.is_inverted() {
                    return true;
                }
                partition::maybe_partition(request, &partition);
                false
            })
            .unwrap_or(false);

        if past_end {
            info!("Request {} has no data before its end date", id);
            self.finalize(id, Outcome::BadSymbol);
            return;
        }
        self.advance(id);
    }

    fn on_bar(&mut self, id: RequestId, bar: Bar) {
        let security = self
            .table
            .inspect(id, |request| {
                (!request.done && request.in_flight == Some(Step::FetchHistoricalBars))
                    .then(|| request.security.clone())
            })
            .flatten();

        match security {
            Some(security) => {
                security.deposit_bar(bar);
            }
            None => trace!("Ignoring bar for request {}", id),
        }
    }

    /// Move a request past the step that just completed
    ///
    /// Remaining steps go out next under a fresh id. An exhausted plan hands
    /// over to its continuation, and without one the request has succeeded.
    pub(super) fn advance(&mut self, id: RequestId) {
        self.pacer.clear_in_flight_if(id);
        let Some(mut request) = self.table.remove(id) else {
            self.pacer.arm();
            return;
        };
        request.in_flight = None;

        if !request.plan.is_exhausted() {
            request.submittable = true;
            let next_id = self.ids.allocate();
            debug!(
                "Request {} continues with {:?} as {}",
                id,
                request.next_step(),
                next_id
            );
            self.requeue(next_id, request);
        } else if let Some(mut continuation) = request.continuation.take() {
            // Long continuations are split again before they run
            partition::maybe_partition(&mut continuation, &self.partition);
            continuation.submittable = true;
            let next_id = self.ids.allocate();
            debug!(
                "Request {} done, continuing {} over {:?} as {}",
                id,
                continuation.security.ticker(),
                continuation.range,
                next_id
            );
            self.requeue(next_id, *continuation);
        } else {
            self.conclude(request, Outcome::Success);
        }
    }

    fn requeue(&mut self, id: RequestId, request: LogicalRequest) {
        self.table.insert(id, request);
        self.pacer.set_priority(id);
        self.pacer.arm();
    }

    /// Remove `id` from the table and deliver `outcome` for it
    pub(super) fn finalize(&mut self, id: RequestId, outcome: Outcome) {
        self.pacer.clear_in_flight_if(id);
        match self.table.remove(id) {
            Some(request) => self.conclude(request, outcome),
            None => self.pacer.arm(),
        }
    }

    fn conclude(&mut self, mut request: LogicalRequest, outcome: Outcome) {
        let cancelled = request.done;
        request.mark_done();

        if cancelled {
            debug!("Request {} was cancelled, no outcome delivered", request.id);
        } else {
            let instrument = request.security.snapshot();
            info!(
                "Request {} for {} finished: {}",
                request.key, instrument, outcome
            );
            self.emit(SchedulerEvent::DataResponse {
                key: request.key,
                instrument,
                outcome,
            });
        }

        if self.pacer.priority() == Some(request.id) {
            self.pacer.clear_priority();
        }
        self.pacer.arm();
    }
}
