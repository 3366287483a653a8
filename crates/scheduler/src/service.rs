//! Async driver for the scheduler
//!
//! [`SchedulerService`] runs the [`RequestScheduler`] on a single task and
//! multiplexes three sources: commands from [`SchedulerHandle`]s, inbound
//! gateway messages, and the pacer's interval timer. The timer is only polled
//! while the pacer is armed.

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tempo_core::{DateRange, RequestKey, Security};
use tempo_gateway::{GatewaySession, InboundReceiver};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::events::{EventReceiver, event_channel};
use crate::scheduler::RequestScheduler;
use crate::table::{PendingRequest, RequestTable};

#[derive(Debug)]
pub enum SchedulerCommand {
    PriceData {
        key: RequestKey,
        security: Security,
        range: DateRange,
    },
    ContractData {
        key: RequestKey,
        security: Security,
    },
    Cancel {
        ticker: String,
    },
    CancelAll,
    Connect,
    Disconnect,
    Shutdown,
}

/// Cloneable front end to a running [`SchedulerService`]
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: mpsc::UnboundedSender<SchedulerCommand>,
    table: RequestTable,
    ready: Arc<AtomicBool>,
}

impl SchedulerHandle {
    /// Request daily prices for `security` over `[start, end]`
    ///
    /// The returned key comes back with the request's outcome.
    pub fn request_price_data(
        &self,
        security: &Security,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RequestKey> {
        self.request_range(security, DateRange::new(start, end))
    }

    /// Request prices from the first date the gateway has data for
    pub fn request_price_data_until(&self, security: &Security, end: NaiveDate) -> Result<RequestKey> {
        self.request_range(security, DateRange::until(end))
    }

    fn request_range(&self, security: &Security, range: DateRange) -> Result<RequestKey> {
        if range.is_inverted() {
            return Err(SchedulerError::InvalidRange {
                ticker: security.ticker().to_string(),
                range,
            });
        }
        let key = RequestKey::new();
        self.send(SchedulerCommand::PriceData {
            key,
            security: security.clone(),
            range,
        })?;
        Ok(key)
    }

    /// Resolve the listing exchange of `security` without fetching prices
    pub fn request_contract_data(&self, security: &Security) -> Result<RequestKey> {
        let key = RequestKey::new();
        self.send(SchedulerCommand::ContractData {
            key,
            security: security.clone(),
        })?;
        Ok(key)
    }

    pub fn cancel_request(&self, security: &Security) -> Result<()> {
        self.send(SchedulerCommand::Cancel {
            ticker: security.ticker().to_string(),
        })
    }

    pub fn cancel_all_requests(&self) -> Result<()> {
        self.send(SchedulerCommand::CancelAll)
    }

    pub fn connect(&self) -> Result<()> {
        self.send(SchedulerCommand::Connect)
    }

    pub fn disconnect(&self) -> Result<()> {
        self.send(SchedulerCommand::Disconnect)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(SchedulerCommand::Shutdown)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Requests that have neither finished nor been cancelled
    pub fn pending_requests(&self) -> usize {
        self.table.pending_count()
    }

    pub fn is_pending(&self, key: RequestKey) -> bool {
        self.table.is_pending(key)
    }

    pub fn snapshot(&self) -> Vec<PendingRequest> {
        self.table.snapshot()
    }

    fn send(&self, command: SchedulerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| SchedulerError::ServiceStopped)
    }
}

pub struct SchedulerService {
    scheduler: RequestScheduler,
    commands: mpsc::UnboundedReceiver<SchedulerCommand>,
    inbound: InboundReceiver,
}

impl SchedulerService {
    pub fn new(
        config: SchedulerConfig,
        session: Arc<dyn GatewaySession>,
        inbound: InboundReceiver,
    ) -> (Self, SchedulerHandle, EventReceiver) {
        let (events_tx, events_rx) = event_channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let scheduler = RequestScheduler::new(config, session, events_tx);

        let handle = SchedulerHandle {
            commands: commands_tx,
            table: scheduler.table().clone(),
            ready: scheduler.ready_flag(),
        };
        let service = Self {
            scheduler,
            commands: commands_rx,
            inbound,
        };
        (service, handle, events_rx)
    }

    /// Start the service on the current runtime
    pub fn spawn(
        config: SchedulerConfig,
        session: Arc<dyn GatewaySession>,
        inbound: InboundReceiver,
    ) -> (SchedulerHandle, EventReceiver, JoinHandle<()>) {
        let (service, handle, events) = Self::new(config, session, inbound);
        let task = tokio::spawn(service.run());
        (handle, events, task)
    }

    /// Run until shut down or until every handle has been dropped
    pub async fn run(self) {
        let SchedulerService {
            mut scheduler,
            mut commands,
            mut inbound,
        } = self;

        // Delay keeps consecutive submissions a full interval apart after a stall.
        // tokio rejects a zero period.
        let period = scheduler.pacer().interval().max(Duration::from_millis(1));
        let mut pacer_timer = time::interval(period);
        pacer_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Scheduler service started (pacer interval {:?})",
            scheduler.pacer().interval()
        );

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SchedulerCommand::Shutdown) | None => break,
                    Some(command) => apply(&mut scheduler, command),
                },
                message = inbound.recv() => match message {
                    Some(message) => scheduler.handle_message(message),
                    None => {
                        warn!("Gateway inbound channel closed");
                        break;
                    }
                },
                _ = pacer_timer.tick(), if scheduler.pacer().is_armed() => {
                    scheduler.tick();
                }
            }
        }

        let abandoned = scheduler.table().pending_count();
        if abandoned > 0 {
            warn!("Scheduler stopping with {} request(s) pending", abandoned);
        }
        info!("Scheduler service stopped");
    }
}

fn apply(scheduler: &mut RequestScheduler, command: SchedulerCommand) {
    match command {
        SchedulerCommand::PriceData {
            key,
            security,
            range,
        } => {
            if let Err(e) = scheduler.enqueue_price_data(key, security, range) {
                error!("Rejected price request {}: {}", key, e);
            }
        }
        SchedulerCommand::ContractData { key, security } => {
            scheduler.enqueue_contract_data(key, security);
        }
        SchedulerCommand::Cancel { ticker } => {
            scheduler.cancel(&ticker);
        }
        SchedulerCommand::CancelAll => {
            scheduler.cancel_all();
        }
        SchedulerCommand::Connect => {
            if let Err(e) = scheduler.connect() {
                error!("Failed to connect to gateway: {}", e);
            }
        }
        SchedulerCommand::Disconnect => scheduler.disconnect(),
        SchedulerCommand::Shutdown => debug!("Shutdown handled by the service loop"),
    }
}
