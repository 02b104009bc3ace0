use thiserror::Error;

/// Errors surfaced by producer lifecycle and access operations
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Producer already started, cannot be restarted")]
    AlreadyStarted,

    #[error("Producer was never started")]
    NotStarted,

    #[error("Outbound buffer size must be at least 1")]
    ZeroBufferSize,

    #[error("Timed out waiting for the next value")]
    Timeout,
}

/// Error returned by user-supplied production hooks.
///
/// Hook failures never reach the host: the generation loop logs them and
/// skips the rest of the iteration.
pub type StepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for producer operations
pub type Result<T> = std::result::Result<T, ProducerError>;
