//! The three standard probe shapes
//!
//! - [`LifecycleProbe`]: create, update and in-place operations. Done once the
//!   resource reports a success state.
//! - [`DeletionProbe`]: done once the lookup answers 404.
//! - [`PresenceProbe`]: done as soon as the lookup succeeds, 404 is pending.

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use stratus_client::ClientError;
use tokio::time::Instant;
use tracing::debug;

use crate::error::WaitError;
use crate::handler::AsyncActionHandler;
use crate::probe::{Probe, ProbeOutcome};
use crate::retry::{RetryBudget, RetryPolicy, Retryable};
use crate::state::{Snapshot, StateClass, StateSets};

/// Default window during which a create/update lookup may answer 404
pub const DEFAULT_NOT_FOUND_GRACE: Duration = Duration::from_secs(15);

/// One remote lookup, re-run on every probe
pub type Fetch<'a, T> = Box<dyn FnMut() -> BoxFuture<'a, stratus_client::Result<T>> + Send + 'a>;

pub type LifecycleWaiter<'a, S> = AsyncActionHandler<LifecycleProbe<'a, S>>;
pub type DeletionWaiter<'a> = AsyncActionHandler<DeletionProbe<'a>>;
pub type PresenceWaiter<'a, T> = AsyncActionHandler<PresenceProbe<'a, T>>;

/// Operation whose completion a probe observes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    CreateOrUpdate,
    PartialUpdate,
    Start,
    Stop,
    Reboot,
    Resize,
    Rescue,
    Unrescue,
    Deallocate,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::CreateOrUpdate => "create/update",
            Operation::PartialUpdate => "partial update",
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Reboot => "reboot",
            Operation::Resize => "resize",
            Operation::Rescue => "rescue",
            Operation::Unrescue => "unrescue",
            Operation::Deallocate => "deallocate",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Probe for create, update and in-place operations
pub struct LifecycleProbe<'a, S: Snapshot> {
    fetch: Fetch<'a, S>,
    resource: String,
    expected_id: String,
    operation: Operation,
    states: StateSets<S::State>,
    intermediate: Vec<S::State>,
    transition_seen: bool,
    not_found_grace: Duration,
    first_probe: Option<Instant>,
    retry: RetryBudget,
}

impl<'a, S: Snapshot> LifecycleProbe<'a, S> {
    pub fn new(
        fetch: Fetch<'a, S>,
        resource: impl Into<String>,
        expected_id: impl Into<String>,
        operation: Operation,
        states: StateSets<S::State>,
    ) -> Self {
        Self {
            fetch,
            resource: resource.into(),
            expected_id: expected_id.into(),
            operation,
            states,
            intermediate: Vec::new(),
            transition_seen: false,
            not_found_grace: DEFAULT_NOT_FOUND_GRACE,
            first_probe: None,
            retry: RetryBudget::default(),
        }
    }

    /// Success only counts once one of `states` has been observed
    ///
    /// For operations that start and end in the same state, such as a
    /// reboot going `ACTIVE` to `REBOOTING` to `ACTIVE`.
    #[must_use]
    pub fn with_intermediate(mut self, states: impl IntoIterator<Item = S::State>) -> Self {
        self.intermediate.extend(states);
        self
    }

    /// How long a 404 counts as "not visible yet"; zero disables the grace
    #[must_use]
    pub fn with_not_found_grace(mut self, grace: Duration) -> Self {
        self.not_found_grace = grace;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry.set_policy(policy);
        self
    }

    fn on_error(&mut self, err: ClientError, since_first: Duration) -> ProbeOutcome<S> {
        if matches!(err, ClientError::EmptyResponse) {
            return ProbeOutcome::Fail(WaitError::invariant(
                &self.resource,
                "API returned an empty response",
            ));
        }
        if err.is_not_found() {
            if since_first < self.not_found_grace {
                debug!(resource = %self.resource, "not visible yet");
                return ProbeOutcome::Pending;
            }
            return ProbeOutcome::Fail(WaitError::invariant(
                &self.resource,
                format!("still not found after {:?}", self.not_found_grace),
            ));
        }
        match self.retry.absorb(err, &self.resource) {
            Ok(()) => ProbeOutcome::Pending,
            Err(err) => ProbeOutcome::Fail(err),
        }
    }

    fn on_snapshot(&mut self, snapshot: S) -> ProbeOutcome<S> {
        let class = {
            let (Some(id), Some(state)) = (snapshot.id(), snapshot.state()) else {
                return ProbeOutcome::Fail(WaitError::invariant(
                    &self.resource,
                    "response is missing its id or state",
                ));
            };
            if id != self.expected_id {
                return ProbeOutcome::Fail(WaitError::invariant(
                    &self.resource,
                    format!("response carries id {id}"),
                ));
            }
            debug!(resource = %self.resource, %state, "observed state");
            if self.intermediate.contains(state) {
                self.transition_seen = true;
            }
            self.states.classify(state)
        };

        match class {
            StateClass::Success if !self.intermediate.is_empty() && !self.transition_seen => {
                debug!(resource = %self.resource, "operation has not started yet");
                ProbeOutcome::Pending
            }
            StateClass::Success => ProbeOutcome::Done(snapshot),
            StateClass::Failure => ProbeOutcome::Fail(WaitError::RemoteFailureState {
                operation: self.operation.to_string(),
                resource: self.resource.clone(),
                detail: snapshot.failure_detail().map(str::to_string),
            }),
            StateClass::Transitional => ProbeOutcome::Pending,
        }
    }
}

impl<S: Snapshot> Retryable for LifecycleProbe<'_, S> {
    fn set_retry(&mut self, policy: RetryPolicy) {
        self.retry.set_policy(policy);
    }
}

impl<S> Probe for LifecycleProbe<'_, S>
where
    S: Snapshot,
{
    type Output = S;

    async fn probe(&mut self) -> ProbeOutcome<S> {
        let first = *self.first_probe.get_or_insert_with(Instant::now);
        match (self.fetch)().await {
            Ok(snapshot) => {
                self.retry.reset();
                self.on_snapshot(snapshot)
            }
            Err(err) => self.on_error(err, first.elapsed()),
        }
    }
}

/// Probe that completes once the resource is gone
pub struct DeletionProbe<'a> {
    fetch: Fetch<'a, ()>,
    resource: String,
    retry: RetryBudget,
}

impl<'a> DeletionProbe<'a> {
    pub fn new(fetch: Fetch<'a, ()>, resource: impl Into<String>) -> Self {
        Self {
            fetch,
            resource: resource.into(),
            retry: RetryBudget::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry.set_policy(policy);
        self
    }
}

impl Retryable for DeletionProbe<'_> {
    fn set_retry(&mut self, policy: RetryPolicy) {
        self.retry.set_policy(policy);
    }
}

impl Probe for DeletionProbe<'_> {
    type Output = ();

    async fn probe(&mut self) -> ProbeOutcome<()> {
        match (self.fetch)().await {
            // an empty body still means the lookup succeeded
            Ok(()) | Err(ClientError::EmptyResponse) => {
                self.retry.reset();
                debug!(resource = %self.resource, "still present");
                ProbeOutcome::Pending
            }
            Err(err) if err.is_not_found() => ProbeOutcome::Done(()),
            Err(err) => match self.retry.absorb(err, &self.resource) {
                Ok(()) => ProbeOutcome::Pending,
                Err(err) => ProbeOutcome::Fail(err),
            },
        }
    }
}

/// Probe that completes as soon as the resource can be fetched
///
/// For resources without a state field. A 404 stays pending for the whole
/// wait.
pub struct PresenceProbe<'a, T> {
    fetch: Fetch<'a, T>,
    resource: String,
    retry: RetryBudget,
}

impl<'a, T: Send> PresenceProbe<'a, T> {
    pub fn new(fetch: Fetch<'a, T>, resource: impl Into<String>) -> Self {
        Self {
            fetch,
            resource: resource.into(),
            retry: RetryBudget::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry.set_policy(policy);
        self
    }
}

impl<T> Retryable for PresenceProbe<'_, T> {
    fn set_retry(&mut self, policy: RetryPolicy) {
        self.retry.set_policy(policy);
    }
}

impl<T: Send> Probe for PresenceProbe<'_, T> {
    type Output = T;

    async fn probe(&mut self) -> ProbeOutcome<T> {
        match (self.fetch)().await {
            Ok(value) => ProbeOutcome::Done(value),
            Err(ClientError::EmptyResponse) => ProbeOutcome::Fail(WaitError::invariant(
                &self.resource,
                "API returned an empty response",
            )),
            Err(err) if err.is_not_found() => {
                debug!(resource = %self.resource, "not visible yet");
                ProbeOutcome::Pending
            }
            Err(err) => match self.retry.absorb(err, &self.resource) {
                Ok(()) => ProbeOutcome::Pending,
                Err(err) => ProbeOutcome::Fail(err),
            },
        }
    }
}
