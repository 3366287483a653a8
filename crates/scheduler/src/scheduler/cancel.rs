use log::{debug, info};
use tempo_core::RequestId;

use super::RequestScheduler;

impl RequestScheduler {
    /// Cancel every request for `ticker`, returns how many were newly cancelled
    ///
    /// Queued entries are removed outright. The entry whose step is on the
    /// wire stays in the table, retired, until its callback arrives so the
    /// reply is recognised and dropped. Cancelled requests never produce an
    /// outcome, and cancelling twice is a no-op.
    pub fn cancel(&mut self, ticker: &str) -> usize {
        let ids = self.table.ids_for_ticker(ticker);
        let cancelled = self.cancel_ids(&ids);
        info!("Cancelled {} request(s) for {}", cancelled, ticker);
        cancelled
    }

    pub fn cancel_all(&mut self) -> usize {
        let ids = self.table.ids();
        let cancelled = self.cancel_ids(&ids);
        info!("Cancelled all requests ({})", cancelled);
        cancelled
    }

    fn cancel_ids(&mut self, ids: &[RequestId]) -> usize {
        let in_flight = self.pacer.in_flight();
        let mut cancelled = 0;

        for &id in ids {
            let newly_cancelled = if in_flight == Some(id) {
                debug!("Request {} is in flight, retiring it until its callback lands", id);
                self.table
                    .update(id, |request| {
                        let was_done = request.done;
                        request.mark_done();
                        !was_done
                    })
                    .unwrap_or(false)
            } else {
                self.table.remove(id).is_some_and(|request| !request.done)
            };

            if newly_cancelled {
                cancelled += 1;
            }
            if self.pacer.priority() == Some(id) {
                self.pacer.clear_priority();
            }
        }

        self.pacer.arm();
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SchedulerConfig;
    use crate::events::{SchedulerEvent, event_channel};
    use crate::scheduler::RequestScheduler;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tempo_core::{DateRange, RequestKey, Security};
    use tempo_gateway::{SimulatedGateway, SimulatedListing, inbound_channel};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(date(2021, 3, 1), date(2021, 6, 1))
    }

    #[test]
    fn test_cancel_in_flight_and_queued() {
        let (tx, mut inbound) = inbound_channel();
        let gateway = Arc::new(SimulatedGateway::new(
            vec![
                SimulatedListing::new("AAPL", "NASDAQ", date(1995, 1, 3), dec!(100)),
                SimulatedListing::new("MSFT", "NASDAQ", date(1995, 1, 3), dec!(200)),
            ],
            tx,
        ));
        let (events_tx, mut events) = event_channel();
        let mut scheduler = RequestScheduler::new(SchedulerConfig::default(), gateway, events_tx);
        scheduler.connect().unwrap();
        while let Ok(message) = inbound.try_recv() {
            scheduler.handle_message(message);
        }

        let aapl = Security::new("AAPL", "NASDAQ");
        let first = scheduler
            .enqueue_price_data(RequestKey::new(), aapl.clone(), range())
            .unwrap();
        let second = scheduler
            .enqueue_price_data(RequestKey::new(), aapl.clone(), range())
            .unwrap();
        let msft_key = RequestKey::new();
        scheduler
            .enqueue_price_data(msft_key, Security::new("MSFT", "NASDAQ"), range())
            .unwrap();

        // Newer ids were issued while it waited, so it goes out under a fresh one
        let in_flight = scheduler.tick().unwrap();
        assert!(in_flight > first);
        assert!(!scheduler.table().contains(first));

        assert_eq!(scheduler.cancel("aapl"), 2);
        assert_eq!(scheduler.cancel("AAPL"), 0);

        // In-flight entry is retired but kept for its callback, queued one is gone
        assert!(scheduler.table().contains(in_flight));
        assert!(!scheduler.table().contains(second));
        assert_eq!(scheduler.table().pending_count(), 1);

        for _ in 0..10 {
            while let Ok(message) = inbound.try_recv() {
                scheduler.handle_message(message);
            }
            scheduler.tick();
        }

        let mut outcomes = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let SchedulerEvent::DataResponse { key, .. } = event {
                outcomes.push(key);
            }
        }
        assert_eq!(outcomes, vec![msft_key]);
        assert!(scheduler.table().is_empty());
        // Bars for the cancelled fetch were discarded
        assert_eq!(aapl.bar_count(), 0);
    }

    #[test]
    fn test_cancel_all_is_idempotent() {
        let (tx, _inbound) = inbound_channel();
        let gateway = Arc::new(SimulatedGateway::new(Vec::new(), tx));
        let (events_tx, _events) = event_channel();
        let mut scheduler = RequestScheduler::new(SchedulerConfig::default(), gateway, events_tx);

        scheduler
            .enqueue_price_data(RequestKey::new(), Security::new("AAPL", "NASDAQ"), range())
            .unwrap();
        scheduler.enqueue_contract_data(RequestKey::new(), Security::unresolved("IBM"));

        assert_eq!(scheduler.cancel_all(), 2);
        assert_eq!(scheduler.cancel_all(), 0);
        assert!(scheduler.table().is_empty());
    }
}
