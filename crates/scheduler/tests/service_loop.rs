use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tempo_core::{RequestKey, Security};
use tempo_gateway::{SimulatedGateway, SimulatedListing, inbound_channel};
use tempo_scheduler::{
    EventReceiver, Outcome, SchedulerConfig, SchedulerError, SchedulerEvent, SchedulerHandle,
    SchedulerService,
};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn start_service() -> (
    Arc<SimulatedGateway>,
    SchedulerHandle,
    EventReceiver,
    JoinHandle<()>,
) {
    let _ = env_logger::try_init();
    let (tx, rx) = inbound_channel();
    let gateway = Arc::new(SimulatedGateway::new(
        vec![
            SimulatedListing::new("AAPL", "NASDAQ", date(1995, 1, 3), dec!(150)),
            SimulatedListing::new("MSFT", "NASDAQ", date(1995, 1, 3), dec!(250)),
        ],
        tx,
    ));
    let (handle, events, task) =
        SchedulerService::spawn(SchedulerConfig::default(), gateway.clone(), rx);
    (gateway, handle, events, task)
}

async fn next_outcome(events: &mut EventReceiver) -> (RequestKey, Outcome) {
    loop {
        let event = timeout(Duration::from_secs(600), events.recv())
            .await
            .expect("no outcome before timeout")
            .expect("event channel closed");
        if let SchedulerEvent::DataResponse { key, outcome, .. } = event {
            return (key, outcome);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_request_through_simulator() {
    let (gateway, handle, mut events, task) = start_service();
    handle.connect().unwrap();

    let aapl = Security::unresolved("AAPL");
    let key = handle
        .request_price_data_until(&aapl, date(2021, 6, 11))
        .unwrap();

    assert_eq!(next_outcome(&mut events).await, (key, Outcome::Success));
    assert_eq!(aapl.exchange(), "NASDAQ");
    assert_eq!(aapl.first_bar().unwrap().date(), date(2000, 1, 3));
    assert_eq!(aapl.last_bar().unwrap().date(), date(2021, 6, 11));
    // Exchange, first date, years chunk, days chunk
    assert_eq!(gateway.submissions(), 4);
    assert_eq!(handle.pending_requests(), 0);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_submissions_are_paced() {
    let (gateway, handle, mut events, task) = start_service();
    handle.connect().unwrap();
    let started = Instant::now();

    let key = handle
        .request_price_data_until(&Security::unresolved("AAPL"), date(2021, 6, 11))
        .unwrap();
    assert_eq!(next_outcome(&mut events).await.0, key);

    // Four submissions, at least one pacer interval apart
    assert_eq!(gateway.submissions(), 4);
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert!(started.elapsed() < Duration::from_secs(5));

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_request_gets_no_outcome() {
    let (_gateway, handle, mut events, task) = start_service();
    handle.connect().unwrap();

    let aapl = Security::new("AAPL", "NASDAQ");
    let msft = Security::new("MSFT", "NASDAQ");
    handle
        .request_price_data(&aapl, date(2021, 1, 4), date(2021, 6, 1))
        .unwrap();
    let msft_key = handle
        .request_price_data(&msft, date(2021, 1, 4), date(2021, 6, 1))
        .unwrap();
    handle.cancel_request(&aapl).unwrap();
    handle.cancel_request(&aapl).unwrap();

    assert_eq!(next_outcome(&mut events).await, (msft_key, Outcome::Success));
    assert!(msft.bar_count() > 0);
    assert_eq!(handle.pending_requests(), 0);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_requests_wait_out_connectivity_loss() {
    let (gateway, handle, mut events, task) = start_service();
    handle.connect().unwrap();
    sleep(Duration::from_millis(10)).await;
    assert!(handle.is_ready());

    gateway.drop_connection();
    sleep(Duration::from_millis(10)).await;
    assert!(!handle.is_ready());

    let key = handle
        .request_contract_data(&Security::unresolved("MSFT"))
        .unwrap();
    sleep(Duration::from_secs(5)).await;
    assert_eq!(gateway.submissions(), 0);
    assert_eq!(handle.pending_requests(), 1);
    assert!(handle.is_pending(key));

    gateway.restore_connection();
    assert_eq!(next_outcome(&mut events).await, (key, Outcome::Success));

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unknown_symbol_through_simulator() {
    let (_gateway, handle, mut events, task) = start_service();
    handle.connect().unwrap();

    let key = handle
        .request_price_data_until(&Security::unresolved("NOPE"), date(2021, 6, 1))
        .unwrap();

    assert_eq!(next_outcome(&mut events).await, (key, Outcome::BadSymbol));

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_handle_rejects_inverted_range_and_stopped_service() {
    let (_gateway, handle, _events, task) = start_service();
    let security = Security::new("AAPL", "NASDAQ");

    let inverted = handle.request_price_data(&security, date(2021, 6, 2), date(2021, 6, 1));
    assert!(matches!(inverted, Err(SchedulerError::InvalidRange { .. })));
    assert_eq!(handle.pending_requests(), 0);

    handle.shutdown().unwrap();
    task.await.unwrap();

    let after = handle.request_contract_data(&security);
    assert!(matches!(after, Err(SchedulerError::ServiceStopped)));
}
