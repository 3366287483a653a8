use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Start of a requested date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartDate {
    /// Resolve the first date the provider has data for before fetching
    Earliest,
    /// Fixed calendar date
    On(NaiveDate),
}

impl StartDate {
    /// The concrete date, if already known
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            StartDate::Earliest => None,
            StartDate::On(date) => Some(*date),
        }
    }

    pub fn is_earliest(&self) -> bool {
        matches!(self, StartDate::Earliest)
    }
}

impl From<NaiveDate> for StartDate {
    fn from(date: NaiveDate) -> Self {
        StartDate::On(date)
    }
}

/// Inclusive calendar range of a price request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: StartDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Range with a fixed start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: StartDate::On(start),
            end,
        }
    }

    /// Range starting at whatever the provider's first available date turns out to be
    pub fn until(end: NaiveDate) -> Self {
        Self {
            start: StartDate::Earliest,
            end,
        }
    }

    /// Number of days between start and end, `None` while the start is unresolved
    pub fn span_days(&self) -> Option<i64> {
        self.start
            .date()
            .map(|start| (self.end - start).num_days())
    }

    /// Both ends are concrete dates
    pub fn is_resolved(&self) -> bool {
        !self.start.is_earliest()
    }

    /// Start falls after end
    pub fn is_inverted(&self) -> bool {
        self.start.date().is_some_and(|start| start > self.end)
    }

    /// Check whether a date lies inside the range (unresolved starts cover everything up to end)
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.start {
            StartDate::Earliest => date <= self.end,
            StartDate::On(start) => start <= date && date <= self.end,
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.start {
            StartDate::Earliest => write!(f, "[earliest, {}]", self.end),
            StartDate::On(start) => write!(f, "[{}, {}]", start, self.end),
        }
    }
}

/// How far back a single historical-data call reaches from its end date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationSpec {
    Days(u32),
    Years(u32),
}

impl DurationSpec {
    /// Duration covering `[start, end]`
    ///
    /// Ranges that are a whole number of calendar years map to `Years`, anything
    /// else is expressed as an inclusive day count.
    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        let days = (end - start).num_days().max(0);
        let years = u32::try_from(days / 365).unwrap_or(u32::MAX);

        if years >= 1 && end.checked_sub_months(Months::new(12 * years)) == Some(start) {
            return DurationSpec::Years(years);
        }

        DurationSpec::Days(u32::try_from(days + 1).unwrap_or(u32::MAX))
    }
}

impl std::fmt::Display for DurationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DurationSpec::Days(n) => write!(f, "{} D", n),
            DurationSpec::Years(n) => write!(f, "{} Y", n),
        }
    }
}

/// Bar granularity requested from the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BarSize {
    #[serde(rename = "30 mins")]
    ThirtyMins,
    #[serde(rename = "1 hour")]
    OneHour,
    #[default]
    #[serde(rename = "1 day")]
    OneDay,
    #[serde(rename = "1 week")]
    OneWeek,
}

impl BarSize {
    /// Textual form understood by the gateway
    pub fn as_str(&self) -> &'static str {
        match self {
            BarSize::ThirtyMins => "30 mins",
            BarSize::OneHour => "1 hour",
            BarSize::OneDay => "1 day",
            BarSize::OneWeek => "1 week",
        }
    }
}

impl std::fmt::Display for BarSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_span_days() {
        let range = DateRange::new(date(2019, 1, 1), date(2021, 6, 1));
        assert_eq!(range.span_days(), Some(882));
        assert!(range.is_resolved());

        let open = DateRange::until(date(2021, 6, 1));
        assert_eq!(open.span_days(), None);
        assert!(!open.is_resolved());
    }

    #[test]
    fn test_inverted_range() {
        assert!(DateRange::new(date(2021, 1, 2), date(2021, 1, 1)).is_inverted());
        assert!(!DateRange::new(date(2021, 1, 1), date(2021, 1, 1)).is_inverted());
        assert!(!DateRange::until(date(2021, 1, 1)).is_inverted());
    }

    #[test]
    fn test_contains() {
        let range = DateRange::new(date(2020, 1, 1), date(2020, 12, 31));
        assert!(range.contains(date(2020, 1, 1)));
        assert!(range.contains(date(2020, 12, 31)));
        assert!(!range.contains(date(2021, 1, 1)));
        assert!(DateRange::until(date(2020, 1, 1)).contains(date(1990, 5, 5)));
    }

    #[test]
    fn test_duration_whole_years() {
        assert_eq!(
            DurationSpec::for_range(date(2019, 6, 1), date(2021, 6, 1)),
            DurationSpec::Years(2)
        );
        // Leap year span is still one calendar year
        assert_eq!(
            DurationSpec::for_range(date(2020, 1, 1), date(2021, 1, 1)),
            DurationSpec::Years(1)
        );
    }

    #[test]
    fn test_duration_days_is_inclusive() {
        assert_eq!(
            DurationSpec::for_range(date(2019, 1, 1), date(2019, 6, 15)),
            DurationSpec::Days(166)
        );
        assert_eq!(
            DurationSpec::for_range(date(2021, 3, 3), date(2021, 3, 3)),
            DurationSpec::Days(1)
        );
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(DurationSpec::Years(2).to_string(), "2 Y");
        assert_eq!(DurationSpec::Days(30).to_string(), "30 D");
        assert_eq!(BarSize::default().to_string(), "1 day");
    }

    #[test]
    fn test_bar_size_deserializes_wire_form() {
        let size: BarSize = serde_json::from_str("\"1 hour\"").unwrap();
        assert_eq!(size, BarSize::OneHour);
    }
}
