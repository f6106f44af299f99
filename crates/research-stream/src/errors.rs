use std::time::Duration;

/// Errors raised by an agent engine while starting or streaming a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine refused to begin the run (credentials, invalid query, etc.).
    #[error("engine rejected run: {message}")]
    Rejected { message: String },
    /// Network or stream I/O failed.
    #[error("engine transport error: {message}")]
    Transport { message: String },
    /// The engine produced an event sequence or result it should not have.
    #[error("engine protocol error: {message}")]
    Protocol { message: String },
}

impl EngineError {
    /// Creates a rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a protocol-level error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected { message }
            | Self::Transport { message }
            | Self::Protocol { message } => message,
        }
    }
}

/// Terminal failure of a single research run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunFailure {
    /// The engine could not begin the run.
    #[error("startup failure: {0}")]
    Startup(EngineError),
    /// The engine failed while events were being streamed.
    #[error("stream failure: {0}")]
    Stream(EngineError),
    /// The engine failed to produce its final result.
    #[error("final result failure: {0}")]
    FinalResult(EngineError),
    /// The run exceeded its configured ceiling.
    #[error("run timed out after {0:?}")]
    TimedOut(Duration),
    /// The run was cancelled through its abort handle.
    #[error("run cancelled")]
    Cancelled,
}

impl RunFailure {
    /// Text shown to the consumer after the failure prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Startup(err) | Self::Stream(err) | Self::FinalResult(err) => {
                err.message().to_string()
            }
            Self::TimedOut(_) | Self::Cancelled => self.to_string(),
        }
    }
}

/// Top-level error type for the public research API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResearchError {
    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid user input to the builder API.
    #[error("validation error: {0}")]
    Validation(String),
    /// Reading a script or result file failed.
    #[error("io error: {0}")]
    Io(String),
    /// A script or result file could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
    /// A run was started outside a tokio runtime.
    #[error("runtime error: {0}")]
    Runtime(String),
    /// Terminal failure returned from a started run.
    #[error(transparent)]
    RunFailed(RunFailure),
    /// Internal protocol misuse or invariant violation.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ResearchError {
    pub(crate) fn protocol_msg(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl From<RunFailure> for ResearchError {
    fn from(value: RunFailure) -> Self {
        ResearchError::RunFailed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_failures_surface_only_the_engine_message() {
        let failure = RunFailure::Startup(EngineError::rejected("boom"));
        assert_eq!(failure.user_message(), "boom");
        assert_eq!(
            RunFailure::Stream(EngineError::transport("reset")).user_message(),
            "reset"
        );
    }

    #[test]
    fn timeout_message_names_the_ceiling() {
        let failure = RunFailure::TimedOut(Duration::from_secs(3));
        assert_eq!(failure.user_message(), "run timed out after 3s");
        assert_eq!(RunFailure::Cancelled.user_message(), "run cancelled");
    }
}
