//! Splitting long fetches into a years chunk and a days chunk
//!
//! The gateway only accepts day-granular durations up to one year. Longer
//! spans are fetched as a whole number of calendar years ending at the
//! requested end date, followed by a day-granular continuation that covers
//! what is left at the front, overlapping the years chunk by a small cushion.

use chrono::{Days, Months, NaiveDate};
use log::debug;
use tempo_core::DateRange;

use crate::request::{LogicalRequest, RequestKind};

pub const DAYS_PER_YEAR: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionConfig {
    pub threshold_days: i64,
    pub cushion_days: i64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            threshold_days: DAYS_PER_YEAR,
            cushion_days: 14,
        }
    }
}

/// Split `[start, end]` into `(years_chunk, days_chunk)`
///
/// Returns `None` when the span is below the threshold or shorter than a year.
pub fn split_range(
    start: NaiveDate,
    end: NaiveDate,
    config: &PartitionConfig,
) -> Option<(DateRange, DateRange)> {
    let span = (end - start).num_days();
    if span < config.threshold_days {
        return None;
    }

    let years = u32::try_from(span / DAYS_PER_YEAR).ok()?;
    if years < 1 {
        return None;
    }

    let years_start = end.checked_sub_months(Months::new(12 * years))?;
    let cushion = u64::try_from(config.cushion_days).ok()?;
    // Leap days can push years_start before start on very long spans
    let days_end = years_start
        .checked_add_days(Days::new(cushion))?
        .max(start)
        .min(end);

    Some((
        DateRange::new(years_start, end),
        DateRange::new(start, days_end),
    ))
}

/// Partition a price request whose only remaining step is a long fetch
///
/// The request keeps the years chunk and gains a continuation for the days
/// chunk. Requests that already carry a continuation, still have resolution
/// steps pending or have an unresolved start are left alone. Returns true if
/// the request was split.
pub fn maybe_partition(request: &mut LogicalRequest, config: &PartitionConfig) -> bool {
    if request.kind != RequestKind::PriceData
        || request.continuation.is_some()
        || !request.only_fetch_remaining()
    {
        return false;
    }

    let Some(range) = request.range else {
        return false;
    };
    let Some(start) = range.start.date() else {
        return false;
    };
    let Some((years_chunk, days_chunk)) = split_range(start, range.end, config) else {
        return false;
    };

    debug!(
        "Partitioning {} {} into {} and continuation {}",
        request.security.ticker(),
        range,
        years_chunk,
        days_chunk
    );

    let continuation = request.continuation_chunk(days_chunk);
    request.range = Some(years_chunk);
    request.continuation = Some(Box::new(continuation));
    request.submittable = true;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Step;
    use tempo_core::{RequestKey, Security};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fetch_request(start: NaiveDate, end: NaiveDate) -> LogicalRequest {
        LogicalRequest::price_data(
            RequestKey::new(),
            Security::new("AAPL", "NASDAQ"),
            DateRange::new(start, end),
        )
    }

    #[test]
    fn test_split_two_and_a_half_years() {
        let (years, days) =
            split_range(date(2019, 1, 1), date(2021, 6, 1), &PartitionConfig::default()).unwrap();

        assert_eq!(years, DateRange::new(date(2019, 6, 1), date(2021, 6, 1)));
        assert_eq!(days, DateRange::new(date(2019, 1, 1), date(2019, 6, 15)));
    }

    #[test]
    fn test_short_span_is_not_split() {
        let config = PartitionConfig::default();
        assert!(split_range(date(2021, 1, 1), date(2021, 12, 30), &config).is_none());
        // 365 days exactly reaches the threshold
        assert!(split_range(date(2021, 1, 1), date(2022, 1, 1), &config).is_some());
    }

    #[test]
    fn test_chunks_cover_the_whole_range() {
        let config = PartitionConfig::default();
        let start = date(2003, 3, 17);
        let end = date(2021, 11, 30);

        let (years, days) = split_range(start, end, &config).unwrap();

        assert_eq!(days.start.date(), Some(start));
        assert_eq!(years.end, end);
        // Days chunk reaches into the years chunk, no gap between them
        assert!(days.end >= years.start.date().unwrap());
    }

    #[test]
    fn test_days_chunk_never_starts_after_its_end() {
        let config = PartitionConfig {
            threshold_days: DAYS_PER_YEAR,
            cushion_days: 1,
        };
        // 36500 days, but 100 calendar years back from end is 1900-01-01
        let start = date(1900, 1, 25);
        let end = date(2000, 1, 1);

        let (years, days) = split_range(start, end, &config).unwrap();

        assert_eq!(years.start.date(), Some(date(1900, 1, 1)));
        assert!(!days.is_inverted());
    }

    #[test]
    fn test_days_chunk_never_passes_the_end() {
        let config = PartitionConfig {
            threshold_days: DAYS_PER_YEAR,
            cushion_days: 1_000,
        };
        let end = date(2021, 1, 1);

        let (_, days) = split_range(date(2020, 1, 1), end, &config).unwrap();

        assert_eq!(days.end, end);
    }

    #[test]
    fn test_maybe_partition_attaches_continuation() {
        let mut request = fetch_request(date(2019, 1, 1), date(2021, 6, 1));

        assert!(maybe_partition(&mut request, &PartitionConfig::default()));

        assert_eq!(
            request.range,
            Some(DateRange::new(date(2019, 6, 1), date(2021, 6, 1)))
        );
        let continuation = request.continuation.as_ref().unwrap();
        assert_eq!(
            continuation.range,
            Some(DateRange::new(date(2019, 1, 1), date(2019, 6, 15)))
        );
        assert_eq!(continuation.plan.remaining(), [Step::FetchHistoricalBars]);
        assert!(!continuation.submittable);
    }

    #[test]
    fn test_partitions_at_most_once() {
        let mut request = fetch_request(date(2015, 1, 1), date(2021, 6, 1));
        let config = PartitionConfig::default();

        assert!(maybe_partition(&mut request, &config));
        assert!(!maybe_partition(&mut request, &config));
    }

    #[test]
    fn test_waits_for_resolution_steps() {
        let mut request = LogicalRequest::price_data(
            RequestKey::new(),
            Security::unresolved("AAPL"),
            DateRange::new(date(2015, 1, 1), date(2021, 6, 1)),
        );
        assert!(!maybe_partition(&mut request, &PartitionConfig::default()));
        assert!(request.continuation.is_none());
    }

    #[test]
    fn test_contract_requests_are_never_split() {
        let mut request = LogicalRequest::contract_data(RequestKey::new(), Security::unresolved("AAPL"));
        assert!(!maybe_partition(&mut request, &PartitionConfig::default()));
    }
}
