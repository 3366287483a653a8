//! One batch run against the simulated gateway

use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tempo_core::{RequestKey, Security};
use tempo_gateway::{GatewaySession, SimulatedGateway, inbound_channel};
use tempo_scheduler::{Outcome, SchedulerEvent, SchedulerHandle, SchedulerService};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::config::{RequestSpec, RunnerConfig};
use crate::error::{Result, RunnerError};

/// Result of one request in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestReport {
    pub ticker: String,
    pub exchange: String,
    pub outcome: Outcome,
    pub bars: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl RequestReport {
    fn new(security: &Security, exchange: String, outcome: Outcome) -> Self {
        Self {
            ticker: security.ticker().to_string(),
            exchange,
            outcome,
            bars: security.bar_count(),
            first_date: security.first_bar().map(|bar| bar.date()),
            last_date: security.last_bar().map(|bar| bar.date()),
        }
    }
}

impl std::fmt::Display for RequestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}: {}", self.ticker, self.exchange, self.outcome)?;
        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            write!(f, ", {} bars [{}, {}]", self.bars, first, last)?;
        }
        Ok(())
    }
}

/// Reports in the order the requests were configured
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<RequestReport>,
}

impl RunSummary {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.reports
            .iter()
            .filter(|report| report.outcome == outcome)
            .count()
    }

    pub fn report(&self, ticker: &str) -> Option<&RequestReport> {
        self.reports
            .iter()
            .find(|report| report.ticker.eq_ignore_ascii_case(ticker))
    }
}

/// Drive every configured request to an outcome
pub async fn run(config: RunnerConfig) -> Result<RunSummary> {
    let (inbound_tx, inbound_rx) = inbound_channel();
    let gateway = Arc::new(SimulatedGateway::new(config.listings.clone(), inbound_tx));
    let (handle, mut events, task) =
        SchedulerService::spawn(config.scheduler.clone(), gateway.clone(), inbound_rx);

    handle.connect()?;
    info!(
        "Gateway server time offset: {} ms",
        gateway.server_time_offset().num_milliseconds()
    );

    let mut pending: HashMap<RequestKey, (usize, Security)> = HashMap::new();
    for (index, spec) in config.requests.iter().enumerate() {
        let security = spec.security();
        let key = submit(&handle, spec, &security)?;
        debug!("Request {} for {} submitted as {}", index, spec.ticker(), key);
        pending.insert(key, (index, security));
    }
    info!("Submitted {} request(s)", pending.len());

    let mut reports: Vec<Option<RequestReport>> = vec![None; config.requests.len()];
    while !pending.is_empty() {
        let event = match timeout(config.timeout(), events.recv()).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                stop(&handle, task).await;
                return Err(RunnerError::EventsClosed {
                    pending: pending.len(),
                });
            }
            Err(_) => {
                warn!("No outcome within {:?}, cancelling", config.timeout());
                if let Err(e) = handle.cancel_all_requests() {
                    warn!("Failed to cancel pending requests: {}", e);
                }
                stop(&handle, task).await;
                return Err(RunnerError::Timeout {
                    pending: pending.len(),
                });
            }
        };

        match event {
            SchedulerEvent::DataResponse {
                key,
                instrument,
                outcome,
            } => {
                let Some((index, security)) = pending.remove(&key) else {
                    debug!("Outcome for unknown request {}", key);
                    continue;
                };
                let report = RequestReport::new(&security, instrument.exchange, outcome);
                info!("{}", report);
                reports[index] = Some(report);
            }
            SchedulerEvent::ConnectionStatusChanged { ready } => {
                debug!("Gateway session ready: {}", ready);
            }
        }
    }

    stop(&handle, task).await;

    Ok(RunSummary {
        reports: reports.into_iter().flatten().collect(),
    })
}

fn submit(handle: &SchedulerHandle, spec: &RequestSpec, security: &Security) -> Result<RequestKey> {
    let key = match spec.range() {
        Some(range) => match range.start.date() {
            Some(start) => handle.request_price_data(security, start, range.end)?,
            None => handle.request_price_data_until(security, range.end)?,
        },
        None => handle.request_contract_data(security)?,
    };
    Ok(key)
}

/// Shut the scheduler service down and wait for its task to finish
async fn stop(handle: &SchedulerHandle, task: JoinHandle<()>) {
    if handle.shutdown().is_err() {
        debug!("Scheduler service already stopped");
    }
    if let Err(e) = task.await {
        warn!("Scheduler task ended abnormally: {}", e);
    }
}
