use thiserror::Error;

/// Errors surfaced by the harness. Configuration errors fire before any
/// session or resource is acquired; persistence errors are fatal to the run.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("unknown task: {0} (expected repeat_copy, variable_assignment or addition)")]
    UnknownTask(String),

    #[error("unknown controller type: {0} (expected lstm or rnn)")]
    UnknownController(String),

    #[error("checkpoint does not match the model: {0}")]
    CheckpointMismatch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("checkpoint encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}
