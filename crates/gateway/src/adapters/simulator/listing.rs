use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tempo_core::Bar;

/// An instrument the simulated gateway knows about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedListing {
    pub ticker: String,
    /// Primary listing exchange reported on lookup
    pub exchange: String,
    /// First date with data
    pub first_date: NaiveDate,
    /// Price level the generated series oscillates around
    pub base_price: Decimal,
}

impl SimulatedListing {
    pub fn new(
        ticker: impl Into<String>,
        exchange: impl Into<String>,
        first_date: NaiveDate,
        base_price: Decimal,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            exchange: exchange.into(),
            first_date,
            base_price,
        }
    }

    /// Daily bars for every weekday in `[start, end]` on or after the first date
    pub fn daily_bars(&self, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
        let start = start.max(self.first_date);
        if start > end {
            return Vec::new();
        }

        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|date| self.bar_on(date))
            .collect()
    }

    /// Deterministic bar for a date, derived from its distance to the first date
    fn bar_on(&self, date: NaiveDate) -> Bar {
        let index = (date - self.first_date).num_days();
        let step = Decimal::from(index % 20) / Decimal::from(4);
        let close = self.base_price + step;
        let open = close - Decimal::new(25, 2);
        let high = close + Decimal::new(50, 2);
        let low = open - Decimal::new(50, 2);
        let volume = Decimal::from(1_000 + (index % 10) * 100);

        Bar::daily(date, open, high, low, close, volume)
    }
}
