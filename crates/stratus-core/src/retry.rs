//! Opt-in retry of selected client errors

use std::fmt;
use std::sync::Arc;

use stratus_client::ClientError;
use tracing::warn;

use crate::error::WaitError;

/// Retries allowed by [`RetryPolicy::gateway_errors`]
pub const GATEWAY_RETRY_LIMIT: u32 = 5;

type Classifier = Arc<dyn Fn(&ClientError) -> bool + Send + Sync>;

/// Which client errors a probe may downgrade to `pending`, and how often
///
/// Probes retry nothing unless a policy is attached.
#[derive(Clone)]
pub struct RetryPolicy {
    classify: Classifier,
    limit: u32,
}

impl RetryPolicy {
    pub fn new(
        limit: u32,
        classify: impl Fn(&ClientError) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            classify: Arc::new(classify),
            limit,
        }
    }

    /// Retry 502/503/504 and requests that never got an answer
    #[must_use]
    pub fn gateway_errors() -> Self {
        Self::new(GATEWAY_RETRY_LIMIT, ClientError::is_gateway_error)
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn is_retryable(&self, err: &ClientError) -> bool {
        (self.classify)(err)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

/// Probes that accept a [`RetryPolicy`]
pub trait Retryable {
    fn set_retry(&mut self, policy: RetryPolicy);
}

/// Per-probe retry counter; reset whenever the API answers successfully
#[derive(Debug, Default)]
pub(crate) struct RetryBudget {
    policy: Option<RetryPolicy>,
    used: u32,
}

impl RetryBudget {
    pub(crate) fn set_policy(&mut self, policy: RetryPolicy) {
        self.policy = Some(policy);
        self.used = 0;
    }

    pub(crate) fn reset(&mut self) {
        self.used = 0;
    }

    /// Absorb `err` as a retry, or turn it into the terminal error
    pub(crate) fn absorb(&mut self, err: ClientError, resource: &str) -> Result<(), WaitError> {
        match &self.policy {
            Some(policy) if policy.is_retryable(&err) => {
                if self.used < policy.limit {
                    self.used += 1;
                    warn!(
                        resource,
                        attempt = self.used,
                        limit = policy.limit,
                        error = %err,
                        "temporary failure, retrying"
                    );
                    Ok(())
                } else {
                    Err(WaitError::Transient {
                        resource: resource.to_string(),
                        attempts: self.used,
                        source: err,
                    })
                }
            }
            _ => Err(WaitError::from(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn gateway() -> ClientError {
        ClientError::Api {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_no_policy_forwards_everything() {
        let mut budget = RetryBudget::default();
        let err = budget.absorb(gateway(), "server s-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_gateway_policy_exhausts() {
        let mut budget = RetryBudget::default();
        budget.set_policy(RetryPolicy::gateway_errors());
        for _ in 0..GATEWAY_RETRY_LIMIT {
            assert!(budget.absorb(gateway(), "server s-1").is_ok());
        }
        let err = budget.absorb(gateway(), "server s-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(err.to_string().contains("5 retries"));
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut budget = RetryBudget::default();
        budget.set_policy(RetryPolicy::new(1, |_| true));
        assert!(budget.absorb(gateway(), "x").is_ok());
        budget.reset();
        assert!(budget.absorb(gateway(), "x").is_ok());
    }

    #[test]
    fn test_unclassified_errors_are_not_retried() {
        let mut budget = RetryBudget::default();
        budget.set_policy(RetryPolicy::gateway_errors());
        let err = budget
            .absorb(
                ClientError::Api {
                    status: 400,
                    message: "bad".to_string(),
                },
                "x",
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
