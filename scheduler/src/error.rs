use thiserror::Error;

/// Errors surfaced by the scheduling core.
///
/// Only the submission/query boundary can fail at runtime; configuration
/// errors are fatal before the engine starts.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("process already exists: {0}")]
    DuplicateName(String),

    #[error("no such process: {0}")]
    NotFound(String),

    #[error("could not open config file {path}: {source}")]
    ConfigIo {
        path: String,
        source: std::io::Error,
    },

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not spawn engine thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),
}
