#![allow(dead_code)]

use chrono::{NaiveDate, TimeDelta};
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempo_core::{Bar, BarSize, DurationSpec, InstrumentRef, RequestId, RequestKey};
use tempo_gateway::{ExchangeCandidate, GatewayError, GatewayMessage, GatewaySession};
use tempo_scheduler::{
    EventReceiver, Outcome, RequestScheduler, SchedulerConfig, SchedulerEvent, Step,
    event_channel,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One wire call as seen by the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: RequestId,
    pub step: Step,
    pub ticker: String,
    pub exchange: String,
    pub end: Option<NaiveDate>,
    pub duration: Option<DurationSpec>,
}

/// Gateway that records calls and never answers on its own
pub struct RecordingGateway {
    connected: AtomicBool,
    submissions: Mutex<Vec<Submission>>,
}

impl RecordingGateway {
    pub fn connected() -> Self {
        Self {
            connected: AtomicBool::new(true),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().clone()
    }

    fn record(
        &self,
        id: RequestId,
        step: Step,
        instrument: &InstrumentRef,
        end: Option<NaiveDate>,
        duration: Option<DurationSpec>,
    ) -> Result<(), GatewayError> {
        if !self.is_connected() {
            return Err(GatewayError::NotConnected);
        }
        self.submissions.lock().push(Submission {
            id,
            step,
            ticker: instrument.ticker.clone(),
            exchange: instrument.exchange.clone(),
            end,
            duration,
        });
        Ok(())
    }
}

impl GatewaySession for RecordingGateway {
    fn connect(&self) -> Result<(), GatewayError> {
        self.set_connected(true);
        Ok(())
    }

    fn disconnect(&self) {
        self.set_connected(false);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn server_time_offset(&self) -> TimeDelta {
        TimeDelta::zero()
    }

    fn submit_resolve_exchange(
        &self,
        id: RequestId,
        instrument: &InstrumentRef,
    ) -> Result<(), GatewayError> {
        self.record(id, Step::ResolveExchange, instrument, None, None)
    }

    fn submit_resolve_first_available_date(
        &self,
        id: RequestId,
        instrument: &InstrumentRef,
    ) -> Result<(), GatewayError> {
        self.record(id, Step::ResolveFirstAvailableDate, instrument, None, None)
    }

    fn submit_fetch_historical_bars(
        &self,
        id: RequestId,
        instrument: &InstrumentRef,
        end: NaiveDate,
        duration: DurationSpec,
        _bar_size: BarSize,
    ) -> Result<(), GatewayError> {
        self.record(
            id,
            Step::FetchHistoricalBars,
            instrument,
            Some(end),
            Some(duration),
        )
    }
}

/// Scheduler wired to a [`RecordingGateway`], driven by hand
pub struct Driver {
    pub scheduler: RequestScheduler,
    pub gateway: Arc<RecordingGateway>,
    events: EventReceiver,
    /// Date reported for first-available-date lookups
    pub first_available: NaiveDate,
}

impl Driver {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let gateway = Arc::new(RecordingGateway::connected());
        let (events_tx, events) = event_channel();
        let scheduler = RequestScheduler::new(config, gateway.clone(), events_tx);
        assert!(scheduler.is_ready());

        Self {
            scheduler,
            gateway,
            events,
            first_available: date(2005, 3, 1),
        }
    }

    pub fn tick(&mut self) -> Option<RequestId> {
        self.scheduler.tick()
    }

    pub fn send(&mut self, message: GatewayMessage) {
        self.scheduler.handle_message(message);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.gateway.submissions()
    }

    pub fn last_submission(&self) -> Submission {
        self.submissions().pop().expect("nothing submitted")
    }

    pub fn events(&mut self) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn outcomes(&mut self) -> Vec<(RequestKey, Outcome)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SchedulerEvent::DataResponse { key, outcome, .. } => Some((key, outcome)),
                SchedulerEvent::ConnectionStatusChanged { .. } => None,
            })
            .collect()
    }

    /// Successful reply to `submission`
    pub fn reply_to(&self, submission: &Submission) -> Vec<GatewayMessage> {
        let id = submission.id;
        match submission.step {
            Step::ResolveExchange => vec![GatewayMessage::ExchangeResolved {
                id,
                candidates: vec![ExchangeCandidate::new("SMART", "NASDAQ", "USD")],
            }],
            Step::ResolveFirstAvailableDate => vec![GatewayMessage::FirstAvailableDate {
                id,
                date: self.first_available,
            }],
            Step::FetchHistoricalBars => {
                let end = submission.end.expect("fetch without end date");
                let bar = Bar::daily(end, dec!(10), dec!(11), dec!(9), dec!(10.5), dec!(1000));
                vec![
                    GatewayMessage::Bar { id, bar },
                    GatewayMessage::HistoricalDataEnd {
                        id,
                        start: end,
                        end,
                    },
                ]
            }
        }
    }

    /// Answer the most recent submission successfully
    pub fn complete_last(&mut self) {
        let submission = self.last_submission();
        for message in self.reply_to(&submission) {
            self.send(message);
        }
    }

    /// Tick and answer until nothing is left to submit
    ///
    /// Checks on every round that a second tick submits nothing while a step
    /// is outstanding. Returns the number of steps submitted.
    pub fn run_to_completion(&mut self) -> usize {
        let mut submitted = 0;
        for _ in 0..1_000 {
            if self.tick().is_none() {
                return submitted;
            }
            submitted += 1;
            assert_eq!(self.tick(), None, "second step submitted while one is in flight");
            self.complete_last();
        }
        panic!("scheduler did not drain");
    }
}
