//! Request scheduler state machine
//!
//! [`RequestScheduler`] owns the request table, the pacer and the id counter
//! and is driven from one task: commands and gateway messages are applied in
//! arrival order and `tick` is called whenever the pacer's timer fires. It
//! never blocks and never awaits, which keeps it usable without a runtime.

mod cancel;
mod router;

use log::{debug, error, info, trace, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempo_core::{DateRange, DurationSpec, RequestId, RequestKey, Security};
use tempo_gateway::{GatewayError, GatewaySession};

use crate::config::SchedulerConfig;
use crate::error::{ProtocolViolation, Result, SchedulerError};
use crate::events::{EventSender, Outcome, SchedulerEvent};
use crate::pacer::Pacer;
use crate::partition::{self, PartitionConfig};
use crate::request::{LogicalRequest, Step};
use crate::table::{IdAllocator, RequestTable};

pub struct RequestScheduler {
    config: SchedulerConfig,
    partition: PartitionConfig,
    session: Arc<dyn GatewaySession>,
    table: RequestTable,
    ids: IdAllocator,
    /// Queue position handed to the next caller request
    next_seq: u64,
    pacer: Pacer,
    ready: Arc<AtomicBool>,
    events: EventSender,
}

impl RequestScheduler {
    pub fn new(
        config: SchedulerConfig,
        session: Arc<dyn GatewaySession>,
        events: EventSender,
    ) -> Self {
        let ready = Arc::new(AtomicBool::new(session.is_connected()));
        Self {
            partition: config.partition(),
            pacer: Pacer::new(config.pacer_interval()),
            config,
            session,
            table: RequestTable::new(),
            ids: IdAllocator::new(),
            next_seq: 1,
            ready,
            events,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn table(&self) -> &RequestTable {
        &self.table
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    pub fn session(&self) -> &Arc<dyn GatewaySession> {
        &self.session
    }

    /// Shared readiness flag, readable from other tasks
    pub fn ready_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.ready)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn last_issued_id(&self) -> Option<RequestId> {
        self.ids.last_issued()
    }

    /// Queue a price request; fails if the range starts after it ends
    pub fn enqueue_price_data(
        &mut self,
        key: RequestKey,
        security: Security,
        range: DateRange,
    ) -> Result<RequestId> {
        if range.is_inverted() {
            return Err(SchedulerError::InvalidRange {
                ticker: security.ticker().to_string(),
                range,
            });
        }
        Ok(self.enqueue(LogicalRequest::price_data(key, security, range)))
    }

    pub fn enqueue_contract_data(&mut self, key: RequestKey, security: Security) -> RequestId {
        self.enqueue(LogicalRequest::contract_data(key, security))
    }

    fn enqueue(&mut self, mut request: LogicalRequest) -> RequestId {
        request.seq = self.next_seq;
        self.next_seq += 1;
        partition::maybe_partition(&mut request, &self.partition);

        let id = self.ids.allocate();
        debug!(
            "Queued {:?} request {} for {} with steps {:?}",
            request.kind,
            id,
            request.security.ticker(),
            request.plan.remaining()
        );
        self.table.insert(id, request);
        self.pacer.arm();
        id
    }

    /// One pacer tick: submit at most one step, returns the id it went out under
    pub fn tick(&mut self) -> Option<RequestId> {
        let id = self.pacer.select(&self.table, self.is_ready())?;
        self.submit(id)
    }

    fn submit(&mut self, queued: RequestId) -> Option<RequestId> {
        let id = self.assign_wire_id(queued);
        let prepared = self
            .table
            .update(id, |request| {
                let step = request.plan.advance()?;
                request.submittable = false;
                request.in_flight = Some(step);
                Some((step, request.security.snapshot(), request.range))
            })
            .flatten();

        let Some((step, instrument, range)) = prepared else {
            warn!("{}", ProtocolViolation::NothingToSubmit { id });
            self.advance(id);
            return None;
        };

        let result = match step {
            Step::ResolveExchange => self.session.submit_resolve_exchange(id, &instrument),
            Step::ResolveFirstAvailableDate => self
                .session
                .submit_resolve_first_available_date(id, &instrument),
            Step::FetchHistoricalBars => {
                let Some((start, end)) =
                    range.and_then(|range| range.start.date().map(|start| (start, range.end)))
                else {
                    warn!("{}", ProtocolViolation::UnresolvedStart { id, step });
                    self.finalize(id, Outcome::RequestError);
                    return None;
                };
                self.session.submit_fetch_historical_bars(
                    id,
                    &instrument,
                    end,
                    DurationSpec::for_range(start, end),
                    self.config.bar_size,
                )
            }
        };

        match result {
            Ok(()) => {
                self.pacer.submitted(id);
                debug!("Submitted {} for {} as request {}", step, instrument, id);
                Some(id)
            }
            Err(GatewayError::NotConnected) => {
                warn!("Gateway not connected, holding {} for {}", step, instrument);
                self.set_ready(false);
                self.rewind(id);
                None
            }
            Err(err) => {
                error!("Failed to submit {} for {}: {}", step, instrument, err);
                self.finalize(id, Outcome::RequestError);
                None
            }
        }
    }

    /// Id the request stored under `queued` goes out under
    ///
    /// The request keeps its id if nothing was issued after it. Otherwise it
    /// moves to a fresh one, so ids on the wire only ever increase.
    fn assign_wire_id(&mut self, queued: RequestId) -> RequestId {
        if self.ids.last_issued() == Some(queued) {
            return queued;
        }
        let Some(request) = self.table.remove(queued) else {
            return queued;
        };

        let id = self.ids.allocate();
        trace!("Request {} goes out as {}", queued, id);
        self.table.insert(id, request);
        if self.pacer.priority() == Some(queued) {
            self.pacer.set_priority(id);
        }
        id
    }

    /// Put an interrupted step back and requeue its request under a fresh id
    ///
    /// The request becomes the priority so it goes out first once the session
    /// is ready again. Cancelled requests are dropped instead.
    fn rewind(&mut self, id: RequestId) {
        self.pacer.clear_in_flight_if(id);
        let Some(mut request) = self.table.remove(id) else {
            return;
        };
        if request.done {
            debug!("Dropping cancelled request {} instead of retrying it", id);
            return;
        }

        request.plan.rewind();
        request.in_flight = None;
        request.submittable = true;

        let retry_id = self.ids.allocate();
        info!(
            "Request {} for {} will retry {:?} as {}",
            id,
            request.security.ticker(),
            request.next_step(),
            retry_id
        );
        self.table.insert(retry_id, request);
        self.pacer.set_priority(retry_id);
    }

    /// Open the gateway session; readiness follows from its acknowledgement
    pub fn connect(&mut self) -> std::result::Result<(), GatewayError> {
        info!("Connecting to gateway");
        self.session.connect()
    }

    pub fn disconnect(&mut self) {
        info!("Disconnecting from gateway");
        self.session.disconnect();
        self.connection_lost();
    }

    fn set_ready(&mut self, ready: bool) {
        let was_ready = self.ready.swap(ready, Ordering::SeqCst);
        if was_ready != ready {
            if ready {
                info!("Gateway session ready");
            } else {
                warn!("Gateway session not ready, pausing submissions");
            }
            self.emit(SchedulerEvent::ConnectionStatusChanged { ready });
        }
        if ready {
            self.pacer.arm();
        }
    }

    fn connection_lost(&mut self) {
        self.set_ready(false);
        if let Some(id) = self.pacer.in_flight() {
            self.rewind(id);
        }
    }

    fn emit(&self, event: SchedulerEvent) {
        if self.events.send(event).is_err() {
            debug!("No event listener, dropping scheduler event");
        }
    }
}

impl std::fmt::Debug for RequestScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestScheduler")
            .field("config", &self.config)
            .field("table", &self.table)
            .field("pacer", &self.pacer)
            .field("ready", &self.is_ready())
            .finish()
    }
}
