use dashmap::DashMap;
use std::sync::Arc;
use tempo_core::{RequestId, RequestKey};

use crate::request::{LogicalRequest, Step};

/// Hands out request ids, strictly increasing, never reused
#[derive(Debug)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> RequestId {
        let id = RequestId(self.next);
        self.next += 1;
        id
    }

    /// Most recently issued id, if any
    pub fn last_issued(&self) -> Option<RequestId> {
        (self.next > 1).then(|| RequestId(self.next - 1))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of one table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub seq: u64,
    pub key: RequestKey,
    pub ticker: String,
    pub next_step: Option<Step>,
    pub in_flight: Option<Step>,
    pub submittable: bool,
    pub done: bool,
}

/// Live logical requests keyed by their current wire id
///
/// Clones share the same map. The scheduler is the only writer; handles read
/// it to answer status queries. Closures passed to `update` and `inspect` run
/// while the entry's shard is locked and must not touch the table again.
#[derive(Clone, Default)]
pub struct RequestTable {
    entries: Arc<DashMap<RequestId, LogicalRequest>>,
}

impl RequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `request` under `id`, overwriting its `id` field
    pub fn insert(&self, id: RequestId, mut request: LogicalRequest) {
        request.id = id;
        self.entries.insert(id, request);
    }

    pub fn remove(&self, id: RequestId) -> Option<LogicalRequest> {
        self.entries.remove(&id).map(|(_, request)| request)
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run `f` against the entry stored under `id`
    pub fn update<R>(&self, id: RequestId, f: impl FnOnce(&mut LogicalRequest) -> R) -> Option<R> {
        self.entries.get_mut(&id).map(|mut entry| f(entry.value_mut()))
    }

    pub fn inspect<R>(&self, id: RequestId, f: impl FnOnce(&LogicalRequest) -> R) -> Option<R> {
        self.entries.get(&id).map(|entry| f(entry.value()))
    }

    pub fn is_submittable(&self, id: RequestId) -> bool {
        self.inspect(id, |request| request.submittable && !request.done)
            .unwrap_or(false)
    }

    /// Oldest submittable entry by queue position
    ///
    /// Entries are re-keyed as their chains advance, so the id says nothing
    /// about how long a request has waited.
    pub fn first_submittable(&self) -> Option<RequestId> {
        self.entries
            .iter()
            .filter(|entry| entry.submittable && !entry.done)
            .map(|entry| (entry.seq, *entry.key()))
            .min()
            .map(|(_, id)| id)
    }

    /// All ids, including retired entries still waiting on a callback
    pub fn ids(&self) -> Vec<RequestId> {
        let mut ids: Vec<_> = self.entries.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }

    pub fn ids_for_ticker(&self, ticker: &str) -> Vec<RequestId> {
        let mut ids: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| entry.security.matches_ticker(ticker))
            .map(|entry| *entry.key())
            .collect();
        ids.sort();
        ids
    }

    /// Entries that have not finished or been cancelled
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.done).count()
    }

    pub fn is_pending(&self, key: RequestKey) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.key == key && !entry.done)
    }

    /// Entries in queue order
    pub fn snapshot(&self) -> Vec<PendingRequest> {
        let mut rows: Vec<_> = self
            .entries
            .iter()
            .map(|entry| PendingRequest {
                id: *entry.key(),
                seq: entry.seq,
                key: entry.key,
                ticker: entry.security.ticker().to_string(),
                next_step: entry.next_step(),
                in_flight: entry.in_flight,
                submittable: entry.submittable,
                done: entry.done,
            })
            .collect();
        rows.sort_by_key(|row| (row.seq, row.id));
        rows
    }
}

impl std::fmt::Debug for RequestTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestTable")
            .field("entries", &self.entries.len())
            .finish()
    }
}
