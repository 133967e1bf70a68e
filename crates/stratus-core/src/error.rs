//! Error taxonomy for waits

use std::fmt;
use std::time::Duration;

use stratus_client::ClientError;
use thiserror::Error;

/// Boxed error forwarded verbatim from a probe
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of a failed wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transient,
    NotFound,
    InvariantViolation,
    RemoteFailureState,
    DeadlineExceeded,
    Cancelled,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Transient => "transient",
            ErrorKind::NotFound => "not found",
            ErrorKind::InvariantViolation => "invariant violation",
            ErrorKind::RemoteFailureState => "remote failure state",
            ErrorKind::DeadlineExceeded => "deadline exceeded",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// Errors returned by [`AsyncActionHandler::wait`](crate::AsyncActionHandler::wait)
#[derive(Error, Debug)]
pub enum WaitError {
    /// Retryable errors kept recurring past the probe's retry limit
    #[error("temporary failure for {resource}, gave up after {attempts} retries: {source}")]
    Transient {
        resource: String,
        attempts: u32,
        #[source]
        source: ClientError,
    },

    /// Resource is absent where it was required to exist; built by custom probes
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The API answered with something its contract rules out
    #[error("unexpected API response for {resource}: {reason}")]
    InvariantViolation { resource: String, reason: String },

    /// The resource settled in a terminal failure state
    #[error("{operation} failed for {resource}{}", detail_suffix(.detail))]
    RemoteFailureState {
        operation: String,
        resource: String,
        detail: Option<String>,
    },

    /// Overall wait time ran out; the operation may still finish remotely
    #[error("timed out after {elapsed:?} waiting for {resource}")]
    DeadlineExceeded { resource: String, elapsed: Duration },

    /// The caller cancelled the wait
    #[error("wait for {resource} cancelled")]
    Cancelled { resource: String },

    /// Underlying error forwarded unchanged
    #[error(transparent)]
    Other(BoxError),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

impl WaitError {
    /// Discriminant used by callers to pick a rendering
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            WaitError::Transient { .. } => ErrorKind::Transient,
            WaitError::NotFound { .. } => ErrorKind::NotFound,
            WaitError::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            WaitError::RemoteFailureState { .. } => ErrorKind::RemoteFailureState,
            WaitError::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            WaitError::Cancelled { .. } => ErrorKind::Cancelled,
            WaitError::Other(_) => ErrorKind::Other,
        }
    }

    /// Wrap any error as [`WaitError::Other`]
    pub fn other(err: impl Into<BoxError>) -> Self {
        WaitError::Other(err.into())
    }

    pub fn invariant(resource: impl fmt::Display, reason: impl Into<String>) -> Self {
        WaitError::InvariantViolation {
            resource: resource.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the remote operation has definitively failed
    ///
    /// Deadline and cancellation leave the remote state unknown.
    #[must_use]
    pub fn is_definitive(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::DeadlineExceeded | ErrorKind::Cancelled
        )
    }
}

impl From<ClientError> for WaitError {
    fn from(err: ClientError) -> Self {
        WaitError::Other(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, WaitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failure_message() {
        let err = WaitError::RemoteFailureState {
            operation: "create/update".to_string(),
            resource: "Intake R1".to_string(),
            detail: None,
        };
        assert_eq!(err.to_string(), "create/update failed for Intake R1");
        assert_eq!(err.kind(), ErrorKind::RemoteFailureState);
        assert!(err.is_definitive());

        let err = WaitError::RemoteFailureState {
            operation: "start".to_string(),
            resource: "server s-1".to_string(),
            detail: Some("no capacity".to_string()),
        };
        assert_eq!(err.to_string(), "start failed for server s-1: no capacity");
    }

    #[test]
    fn test_other_is_transparent() {
        let err = WaitError::from(ClientError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_ambiguous_outcomes_are_not_definitive() {
        let err = WaitError::Cancelled {
            resource: "server s-1".to_string(),
        };
        assert!(!err.is_definitive());
        let err = WaitError::DeadlineExceeded {
            resource: "server s-1".to_string(),
            elapsed: Duration::from_secs(1),
        };
        assert!(!err.is_definitive());
        assert!(err.to_string().contains("server s-1"));
    }
}
