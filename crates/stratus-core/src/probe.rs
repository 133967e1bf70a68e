//! Probe contract: one remote lookup interpreted into a tri-valued outcome

use std::future::Future;

use crate::error::WaitError;

/// Result of a single probe
#[derive(Debug)]
pub enum ProbeOutcome<T> {
    /// Not there yet; poll again
    Pending,
    /// Terminal success carrying the value the caller waits for
    Done(T),
    /// Terminal failure, forwarded to the caller unchanged
    Fail(WaitError),
}

impl<T> ProbeOutcome<T> {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, ProbeOutcome::Pending)
    }

    /// Transform the carried value, leaving pending and failure untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ProbeOutcome<U> {
        match self {
            ProbeOutcome::Pending => ProbeOutcome::Pending,
            ProbeOutcome::Done(value) => ProbeOutcome::Done(f(value)),
            ProbeOutcome::Fail(err) => ProbeOutcome::Fail(err),
        }
    }
}

/// A single-method capability polled by [`AsyncActionHandler`](crate::AsyncActionHandler)
///
/// The handler owns the probe for the duration of one wait and never calls
/// `probe` again after it returned `Done` or `Fail`.
pub trait Probe: Send {
    type Output: Send;

    fn probe(&mut self) -> impl Future<Output = ProbeOutcome<Self::Output>> + Send;
}

/// Probe backed by a closure, see [`probe_fn`]
#[derive(Debug, Clone)]
pub struct ProbeFn<F>(F);

/// Turn a closure returning a future of [`ProbeOutcome`] into a [`Probe`]
///
/// # Example
/// ```
/// use stratus_core::{ProbeOutcome, probe_fn};
///
/// let mut polls = 0;
/// let probe = probe_fn(move || {
///     polls += 1;
///     let ready = polls >= 3;
///     async move {
///         if ready { ProbeOutcome::Done(polls) } else { ProbeOutcome::Pending }
///     }
/// });
/// # let _ = probe;
/// ```
pub fn probe_fn<F, Fut, T>(f: F) -> ProbeFn<F>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = ProbeOutcome<T>> + Send,
    T: Send,
{
    ProbeFn(f)
}

impl<F, Fut, T> Probe for ProbeFn<F>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = ProbeOutcome<T>> + Send,
    T: Send,
{
    type Output = T;

    fn probe(&mut self) -> impl Future<Output = ProbeOutcome<T>> + Send {
        (self.0)()
    }
}
