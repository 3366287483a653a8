use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tempo_core::BarSize;

use crate::partition::PartitionConfig;

/// Scheduler tuning
///
/// Every field has a default, so a partial JSON document only overrides what
/// it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minimum spacing between two wire submissions
    pub pacer_interval_ms: u64,
    /// Resolved first-available dates are never earlier than this
    pub early_date_floor: NaiveDate,
    /// Fetch spans of at least this many days are split into a years chunk and a days chunk.
    /// Only 365 is accepted.
    pub partition_threshold_days: i64,
    /// Overlap between the days chunk and the years chunk, shorter than the threshold
    pub partition_cushion_days: i64,
    pub bar_size: BarSize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pacer_interval_ms: 1000,
            early_date_floor: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN),
            partition_threshold_days: 365,
            partition_cushion_days: 14,
            bar_size: BarSize::OneDay,
        }
    }
}

impl SchedulerConfig {
    pub fn pacer_interval(&self) -> Duration {
        Duration::from_millis(self.pacer_interval_ms)
    }

    pub fn partition(&self) -> PartitionConfig {
        PartitionConfig {
            threshold_days: self.partition_threshold_days,
            cushion_days: self.partition_cushion_days,
        }
    }
}
