use tempo_scheduler::{ConfigError, SchedulerError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Timed out with {pending} request(s) outstanding")]
    Timeout { pending: usize },

    #[error("Scheduler event stream closed with {pending} request(s) outstanding")]
    EventsClosed { pending: usize },
}

pub type Result<T> = std::result::Result<T, RunnerError>;
