use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Price, Timestamp};

/// One OHLCV bar as delivered by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time
    pub time: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Decimal,
}

impl Bar {
    pub fn new(
        time: Timestamp,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Decimal,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Daily bar stamped at midnight UTC of `date`
    pub fn daily(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Decimal,
    ) -> Self {
        let time = date.and_time(NaiveTime::MIN).and_utc();
        Self::new(time, open, high, low, close, volume)
    }

    /// Calendar date of the bar
    pub fn date(&self) -> NaiveDate {
        self.time.date_naive()
    }

    /// High/low bracket open and close, volume non-negative
    pub fn is_consistent(&self) -> bool {
        self.low <= self.high
            && self.low <= self.open.min(self.close)
            && self.high >= self.open.max(self.close)
            && !self.volume.is_sign_negative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_daily_bar_date() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        let bar = Bar::daily(date, dec!(10), dec!(12), dec!(9), dec!(11), dec!(1000));
        assert_eq!(bar.date(), date);
        assert!(bar.is_consistent());
    }

    #[test]
    fn test_inconsistent_bar() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        let bar = Bar::daily(date, dec!(10), dec!(9), dec!(8), dec!(11), dec!(1000));
        assert!(!bar.is_consistent());
    }
}
