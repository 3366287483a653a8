//! Tempo Request Scheduler
//!
//! Drives historical price requests through a single, rate-limited gateway
//! session. Each caller request becomes a [`LogicalRequest`] with a short
//! chain of wire steps; the scheduler submits at most one step at a time,
//! paced by a fixed interval, and routes every callback back to the request
//! it answers.
//!
//! ```text
//!  SchedulerHandle ──commands──▶ SchedulerService ──submit──▶ GatewaySession
//!        ▲                        │  RequestScheduler               │
//!        │                        │   ├─ RequestTable               │
//!        └──── SchedulerEvent ◀───│   ├─ Pacer                      │
//!                                 │   └─ router                     │
//!                                 └◀────────── GatewayMessage ──────┘
//! ```
//!
//! Long fetches are split into a whole-years chunk and a short continuation
//! (see [`partition`]), and gateway errors are mapped onto outcomes or
//! connection state by [`classify`].

pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod pacer;
pub mod partition;
pub mod request;
pub mod scheduler;
pub mod service;
pub mod table;

pub use classify::{ErrorClass, classify};
pub use config::{
    ConfigError, SchedulerConfig, load_config, load_config_from_str, load_default_config,
};
pub use error::{ProtocolViolation, Result, SchedulerError};
pub use events::{EventReceiver, EventSender, Outcome, SchedulerEvent, event_channel};
pub use pacer::Pacer;
pub use partition::{PartitionConfig, maybe_partition, split_range};
pub use request::{LogicalRequest, RequestKind, Step, StepPlan};
pub use scheduler::RequestScheduler;
pub use service::{SchedulerCommand, SchedulerHandle, SchedulerService};
pub use table::{IdAllocator, PendingRequest, RequestTable};
