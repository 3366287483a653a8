//! Tempo Runner
//!
//! Loads a batch of price and contract requests, spawns the scheduler service
//! against the simulated gateway and collects one outcome per request.
//!
//! ```text
//!   runner_config.json ──▶ RunnerConfig
//!                              │
//!                              ▼
//!   run() ──requests──▶ SchedulerHandle ──▶ SchedulerService ──▶ SimulatedGateway
//!     ▲                                            │
//!     └──────────── SchedulerEvent ◀───────────────┘
//! ```

pub mod config;
pub mod error;
pub mod run;

pub use config::{RequestSpec, RunnerConfig, load_config, load_config_from_str, load_default_config};
pub use error::{Result, RunnerError};
pub use run::{RequestReport, RunSummary, run};
