//! Logical requests and their step plans
//!
//! A caller-level request is a short chain of wire calls. Each call is a
//! [`Step`]; the ordered list of steps still to run is a [`StepPlan`].

use serde::{Deserialize, Serialize};
use tempo_core::{DateRange, RequestId, RequestKey, Security};

/// One wire call on behalf of a logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    ResolveExchange,
    ResolveFirstAvailableDate,
    FetchHistoricalBars,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::ResolveExchange => "ResolveExchange",
            Step::ResolveFirstAvailableDate => "ResolveFirstAvailableDate",
            Step::FetchHistoricalBars => "FetchHistoricalBars",
        };
        f.write_str(name)
    }
}

/// Ordered steps with a cursor marking the next one to submit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepPlan {
    steps: Vec<Step>,
    cursor: usize,
}

impl StepPlan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps, cursor: 0 }
    }

    /// Steps needed to fetch prices for `security` over `range`
    ///
    /// The exchange is resolved first when unknown, then the first available
    /// date when the range is open-ended, and the fetch always comes last.
    pub fn for_price_data(security: &Security, range: &DateRange) -> Self {
        let mut steps = Vec::with_capacity(3);
        if !security.has_resolved_exchange() {
            steps.push(Step::ResolveExchange);
        }
        if range.start.is_earliest() {
            steps.push(Step::ResolveFirstAvailableDate);
        }
        steps.push(Step::FetchHistoricalBars);
        Self::new(steps)
    }

    pub fn contract_only() -> Self {
        Self::new(vec![Step::ResolveExchange])
    }

    pub fn fetch_only() -> Self {
        Self::new(vec![Step::FetchHistoricalBars])
    }

    /// Next step without consuming it
    pub fn peek(&self) -> Option<Step> {
        self.steps.get(self.cursor).copied()
    }

    /// Consume and return the next step
    pub fn advance(&mut self) -> Option<Step> {
        let step = self.peek()?;
        self.cursor += 1;
        Some(step)
    }

    /// Put the last consumed step back, returns false if nothing was consumed
    pub fn rewind(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn remaining(&self) -> &[Step] {
        &self.steps[self.cursor.min(self.steps.len())..]
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Drop every remaining step
    pub fn clear(&mut self) {
        self.cursor = self.steps.len();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    PriceData,
    ContractData,
}

/// A caller-level request as tracked by the request table
///
/// `id` is the id the entry is currently stored under. It changes every time
/// the request advances to its next step, and again on submission if newer
/// ids were issued while it waited. `seq` is the position in the FIFO queue
/// and stays fixed for the caller's whole request.
#[derive(Debug, Clone)]
pub struct LogicalRequest {
    pub id: RequestId,
    pub seq: u64,
    pub key: RequestKey,
    pub kind: RequestKind,
    pub security: Security,
    /// Date range for price requests, `None` for contract requests
    pub range: Option<DateRange>,
    pub plan: StepPlan,
    /// Chunk to run once this request's plan is exhausted
    pub continuation: Option<Box<LogicalRequest>>,
    /// Eligible for the pacer to pick up
    pub submittable: bool,
    /// Finished or cancelled; never resubmitted
    pub done: bool,
    /// Step sent on the wire and not yet answered
    pub in_flight: Option<Step>,
}

impl LogicalRequest {
    pub fn price_data(key: RequestKey, security: Security, range: DateRange) -> Self {
        let plan = StepPlan::for_price_data(&security, &range);
        Self::with_plan(key, RequestKind::PriceData, security, Some(range), plan)
    }

    pub fn contract_data(key: RequestKey, security: Security) -> Self {
        Self::with_plan(
            key,
            RequestKind::ContractData,
            security,
            None,
            StepPlan::contract_only(),
        )
    }

    fn with_plan(
        key: RequestKey,
        kind: RequestKind,
        security: Security,
        range: Option<DateRange>,
        plan: StepPlan,
    ) -> Self {
        Self {
            id: RequestId(0),
            seq: 0,
            key,
            kind,
            security,
            range,
            plan,
            continuation: None,
            submittable: true,
            done: false,
            in_flight: None,
        }
    }

    /// Fetch-only chunk of this request covering `range`
    ///
    /// The chunk shares the caller's key and security and waits, not
    /// submittable, until its parent has finished.
    pub fn continuation_chunk(&self, range: DateRange) -> Self {
        let mut chunk = Self::with_plan(
            self.key,
            self.kind,
            self.security.clone(),
            Some(range),
            StepPlan::fetch_only(),
        );
        chunk.seq = self.seq;
        chunk.submittable = false;
        chunk
    }

    pub fn next_step(&self) -> Option<Step> {
        self.plan.peek()
    }

    /// Fetch is the only step left
    pub fn only_fetch_remaining(&self) -> bool {
        self.plan.remaining() == [Step::FetchHistoricalBars]
    }

    /// Retire the request; an in-flight step stays recorded until its callback lands
    pub fn mark_done(&mut self) {
        self.done = true;
        self.submittable = false;
        self.plan.clear();
        self.continuation = None;
    }
}
