use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::entities::Bar;
use crate::values::Timestamp;

/// Exchange placeholder for instruments whose listing venue is not yet known
pub const UNKNOWN_EXCHANGE: &str = "UNK";

/// Serializable snapshot of an instrument's identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentRef {
    pub ticker: String,
    pub exchange: String,
}

impl std::fmt::Display for InstrumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.ticker, self.exchange)
    }
}

/// Shared handle to a security
///
/// Cloning is cheap and every clone points at the same instrument: the scheduler
/// writes the resolved exchange and incoming bars through its copy while the
/// caller reads through theirs. Bars are keyed by time, so a bar delivered twice
/// (partition chunks overlap at their boundary) is stored once.
#[derive(Clone)]
pub struct Security {
    inner: Arc<SecurityInner>,
}

struct SecurityInner {
    ticker: String,
    exchange: RwLock<String>,
    bars: Mutex<BTreeMap<Timestamp, Bar>>,
}

impl Security {
    /// Create a security listed on a known exchange
    pub fn new(ticker: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(SecurityInner {
                ticker: ticker.into(),
                exchange: RwLock::new(exchange.into()),
                bars: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    /// Create a security whose exchange must be resolved through the gateway
    pub fn unresolved(ticker: impl Into<String>) -> Self {
        Self::new(ticker, UNKNOWN_EXCHANGE)
    }

    pub fn ticker(&self) -> &str {
        &self.inner.ticker
    }

    pub fn exchange(&self) -> String {
        self.inner.exchange.read().clone()
    }

    pub fn set_exchange(&self, exchange: impl Into<String>) {
        *self.inner.exchange.write() = exchange.into();
    }

    /// Exchange is set to something other than the placeholder
    pub fn has_resolved_exchange(&self) -> bool {
        let exchange = self.inner.exchange.read();
        !exchange.is_empty() && exchange.as_str() != UNKNOWN_EXCHANGE
    }

    /// Case-insensitive ticker comparison
    pub fn matches_ticker(&self, ticker: &str) -> bool {
        self.inner.ticker.eq_ignore_ascii_case(ticker)
    }

    /// Both handles refer to the same underlying security
    pub fn same_as(&self, other: &Security) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Store a bar, returns false if a bar with the same time was already present
    pub fn deposit_bar(&self, bar: Bar) -> bool {
        self.inner.bars.lock().insert(bar.time, bar).is_none()
    }

    /// All bars in time order
    pub fn bars(&self) -> Vec<Bar> {
        self.inner.bars.lock().values().cloned().collect()
    }

    pub fn bar_count(&self) -> usize {
        self.inner.bars.lock().len()
    }

    pub fn first_bar(&self) -> Option<Bar> {
        self.inner.bars.lock().values().next().cloned()
    }

    pub fn last_bar(&self) -> Option<Bar> {
        self.inner.bars.lock().values().next_back().cloned()
    }

    pub fn clear_bars(&self) {
        self.inner.bars.lock().clear();
    }

    /// Current ticker/exchange pair
    pub fn snapshot(&self) -> InstrumentRef {
        InstrumentRef {
            ticker: self.inner.ticker.clone(),
            exchange: self.exchange(),
        }
    }
}

impl std::fmt::Debug for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Security")
            .field("ticker", &self.inner.ticker)
            .field("exchange", &*self.inner.exchange.read())
            .field("bars", &self.bar_count())
            .finish()
    }
}

impl std::fmt::Display for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.snapshot())
    }
}
