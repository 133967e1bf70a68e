//! Async action handler: the polling engine behind every waiter

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, info, warn};

use crate::config::WaiterConfig;
use crate::context::WaitContext;
use crate::error::{Result, WaitError};
use crate::probe::{Probe, ProbeOutcome};
use crate::retry::{RetryPolicy, Retryable};

/// Polls a [`Probe`] until it settles, the deadline passes or the caller cancels
///
/// Probes run strictly one after another. Cancellation and the deadline are
/// observed while sleeping and while a probe is in flight, and both take
/// precedence over whatever the probe would have returned.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use stratus_core::{AsyncActionHandler, ProbeOutcome, WaitContext, probe_fn};
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let mut polls = 0;
/// let handler = AsyncActionHandler::new(probe_fn(move || {
///     polls += 1;
///     let n = polls;
///     async move { if n < 3 { ProbeOutcome::Pending } else { ProbeOutcome::Done(n) } }
/// }))
/// .with_interval(Duration::from_millis(10))
/// .with_timeout(Duration::from_secs(1));
///
/// assert_eq!(handler.wait(&WaitContext::new()).await.unwrap(), 3);
/// # }
/// ```
#[derive(Debug)]
pub struct AsyncActionHandler<P> {
    probe: P,
    config: WaiterConfig,
    resource: String,
}

impl<P: Probe> AsyncActionHandler<P> {
    /// Create a handler with the default timing
    #[must_use]
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            config: WaiterConfig::default(),
            resource: "resource".to_string(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: WaiterConfig) -> Self {
        self.config = config;
        self
    }

    /// Overall deadline; zero performs exactly one probe
    ///
    /// A context deadline that has already passed still wins: the wait then
    /// ends with [`WaitError::DeadlineExceeded`] before probing.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.config.throttle = throttle;
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.config.initial_delay = delay;
        self
    }

    /// Grow the interval by `factor` after every pending probe, up to `max`
    #[must_use]
    pub fn with_backoff(mut self, factor: f64, max: Duration) -> Self {
        self.config.backoff_factor = factor;
        self.config.max_backoff = max;
        self
    }

    /// Name used in timeout and cancellation errors and in logs
    #[must_use]
    pub fn labelled(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    /// Adjust the probe before waiting, e.g. to attach a retry policy
    #[must_use]
    pub fn map_probe(mut self, f: impl FnOnce(P) -> P) -> Self {
        self.probe = f(self.probe);
        self
    }

    #[must_use]
    pub fn config(&self) -> &WaiterConfig {
        &self.config
    }

    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Run the wait to completion
    ///
    /// # Errors
    /// Returns the probe's failure unchanged, [`WaitError::DeadlineExceeded`]
    /// when the earlier of the handler timeout and the context deadline
    /// passes, [`WaitError::Cancelled`] when the context is cancelled, and
    /// [`WaitError::Other`] when the probe panics.
    pub async fn wait(self, ctx: &WaitContext) -> Result<P::Output> {
        let Self {
            mut probe,
            config,
            resource,
        } = self;

        let started = Instant::now();
        let single_shot = config.timeout.is_zero();
        let deadline = if single_shot {
            ctx.deadline()
        } else {
            earliest(started.checked_add(config.timeout), ctx.deadline())
        };

        let cancelled = || WaitError::Cancelled {
            resource: resource.clone(),
        };
        let timed_out = || {
            warn!(resource = %resource, elapsed = ?started.elapsed(), "wait deadline exceeded");
            WaitError::DeadlineExceeded {
                resource: resource.clone(),
                elapsed: started.elapsed(),
            }
        };

        if !single_shot && !config.initial_delay.is_zero() {
            let delay = cap_to(config.initial_delay, deadline);
            tokio::select! {
                biased;
                () = ctx.cancelled() => return Err(cancelled()),
                () = sleep(delay) => {}
            }
        }

        let mut interval = config.poll_interval;
        let mut attempt: u32 = 0;

        loop {
            if ctx.is_cancelled() {
                return Err(cancelled());
            }
            // Also covers single-shot waits whose context deadline is already gone
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(timed_out());
            }

            attempt += 1;
            let probe_started = Instant::now();
            debug!(resource = %resource, attempt, "probing");

            let outcome = tokio::select! {
                biased;
                () = ctx.cancelled() => return Err(cancelled()),
                () = sleep_until_opt(deadline) => return Err(timed_out()),
                outcome = AssertUnwindSafe(probe.probe()).catch_unwind() => outcome,
            };

            if ctx.is_cancelled() {
                return Err(cancelled());
            }

            match outcome {
                Ok(ProbeOutcome::Done(value)) => {
                    info!(
                        resource = %resource,
                        attempt,
                        elapsed = ?started.elapsed(),
                        "wait finished"
                    );
                    return Ok(value);
                }
                Ok(ProbeOutcome::Fail(err)) => {
                    debug!(resource = %resource, attempt, error = %err, "probe failed");
                    return Err(err);
                }
                Err(panic) => {
                    return Err(WaitError::other(format!(
                        "probe for {resource} panicked: {}",
                        panic_message(panic.as_ref())
                    )));
                }
                Ok(ProbeOutcome::Pending) if single_shot => return Err(timed_out()),
                Ok(ProbeOutcome::Pending) => {}
            }

            let gap = cap_to(
                config
                    .throttle
                    .max(interval.saturating_sub(probe_started.elapsed())),
                deadline,
            );
            debug!(resource = %resource, attempt, ?gap, "not ready, sleeping");

            tokio::select! {
                biased;
                () = ctx.cancelled() => return Err(cancelled()),
                () = sleep(gap) => {}
            }

            interval = config.next_interval(interval);
        }
    }
}

impl<P: Probe + Retryable> AsyncActionHandler<P> {
    /// Let the probe retry the client errors `policy` selects
    #[must_use]
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.probe.set_retry(policy);
        self
    }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Shorten `gap` so a sleep never runs past the deadline
fn cap_to(gap: Duration, deadline: Option<Instant>) -> Duration {
    match deadline {
        Some(d) => gap.min(d.saturating_duration_since(Instant::now())),
        None => gap,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use super::*;
    use crate::error::ErrorKind;
    use crate::probe::probe_fn;

    const INTERVAL: Duration = Duration::from_millis(10);
    const TIMEOUT: Duration = Duration::from_millis(100);

    /// Probe that returns pending `n` times, then the value from `last`
    fn scripted<T: Send + 'static>(
        pending: u32,
        calls: Arc<AtomicU32>,
        last: impl Fn() -> ProbeOutcome<T> + Send + 'static,
    ) -> impl Probe<Output = T> {
        probe_fn(move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let outcome = if n < pending {
                ProbeOutcome::Pending
            } else {
                last()
            };
            async move { outcome }
        })
    }

    fn handler<P: Probe>(probe: P) -> AsyncActionHandler<P> {
        AsyncActionHandler::new(probe)
            .with_interval(INTERVAL)
            .with_timeout(TIMEOUT)
            .labelled("test resource")
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_after_pending() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = handler(scripted(2, calls.clone(), || ProbeOutcome::Done("R1")))
            .wait(&WaitContext::new())
            .await;

        assert_eq!(result.unwrap(), "R1");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_on_first_probe_does_not_sleep() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let err = handler(scripted::<()>(0, calls.clone(), || {
            ProbeOutcome::Fail(WaitError::invariant("R1", "no state"))
        }))
        .wait(&WaitContext::new())
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let err = handler(scripted::<()>(u32::MAX, calls, || ProbeOutcome::Pending))
            .wait(&WaitContext::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
        let elapsed = start.elapsed();
        assert!(elapsed >= TIMEOUT, "returned early: {elapsed:?}");
        assert!(elapsed < TIMEOUT + INTERVAL, "returned late: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_deadline_is_honoured() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let ctx = WaitContext::new().with_timeout(Duration::from_millis(35));
        let err = handler(scripted::<()>(u32::MAX, calls, || ProbeOutcome::Pending))
            .wait(&ctx)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
        assert_eq!(start.elapsed(), Duration::from_millis(35));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_sleep() {
        let calls = Arc::new(AtomicU32::new(0));
        let ctx = WaitContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(25)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let err = handler(scripted::<()>(u32::MAX, calls.clone(), || {
            ProbeOutcome::Pending
        }))
        .wait(&ctx)
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(calls.load(Ordering::SeqCst) <= 4);
        assert_eq!(start.elapsed(), Duration::from_millis(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_probe_wins_over_result() {
        let ctx = WaitContext::new();
        let canceller = ctx.clone();
        let probe = probe_fn(move || {
            let canceller = canceller.clone();
            async move {
                canceller.cancel();
                ProbeOutcome::Done(())
            }
        });

        let err = handler(probe).wait(&ctx).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_slow_probe() {
        let probe = probe_fn(|| async {
            sleep(Duration::from_secs(60)).await;
            ProbeOutcome::Done(())
        });

        let start = Instant::now();
        let err = handler(probe).wait(&WaitContext::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
        assert_eq!(start.elapsed(), TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_probes_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let err = handler(scripted::<()>(u32::MAX, calls.clone(), || {
            ProbeOutcome::Pending
        }))
        .with_timeout(Duration::ZERO)
        .with_initial_delay(Duration::from_secs(5))
        .wait(&WaitContext::new())
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);

        let done = handler(scripted(0, Arc::new(AtomicU32::new(0)), || {
            ProbeOutcome::Done(7)
        }))
        .with_timeout(Duration::ZERO)
        .wait(&WaitContext::new())
        .await;
        assert_eq!(done.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_context_deadline_beats_single_probe() {
        let calls = Arc::new(AtomicU32::new(0));
        let ctx = WaitContext::new().with_deadline(Instant::now());
        let err = handler(scripted(0, calls.clone(), || ProbeOutcome::Done(7)))
            .with_timeout(Duration::ZERO)
            .wait(&ctx)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_delay_precedes_first_probe() {
        let first_probe_at = Arc::new(std::sync::Mutex::new(None));
        let seen = first_probe_at.clone();
        let start = Instant::now();
        let probe = probe_fn(move || {
            seen.lock().unwrap().get_or_insert(Instant::now());
            async { ProbeOutcome::Done(()) }
        });

        handler(probe)
            .with_initial_delay(Duration::from_millis(40))
            .wait(&WaitContext::new())
            .await
            .unwrap();

        let at = first_probe_at.lock().unwrap().unwrap();
        assert_eq!(at - start, Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_enforces_minimum_gap() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        handler(scripted(2, calls, || ProbeOutcome::Done(())))
            .with_interval(Duration::ZERO)
            .with_throttle(Duration::from_millis(20))
            .wait(&WaitContext::new())
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_probe_shortens_gap() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let probe = probe_fn(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                sleep(Duration::from_millis(6)).await;
                if n < 1 {
                    ProbeOutcome::Pending
                } else {
                    ProbeOutcome::Done(())
                }
            }
        });

        let start = Instant::now();
        handler(probe).wait(&WaitContext::new()).await.unwrap();
        // second probe starts one interval after the first, then takes 6ms
        assert_eq!(start.elapsed(), Duration::from_millis(16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_grows_gaps() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        handler(scripted(3, calls, || ProbeOutcome::Done(())))
            .with_timeout(Duration::from_secs(10))
            .with_backoff(2.0, Duration::from_millis(30))
            .wait(&WaitContext::new())
            .await
            .unwrap();

        // gaps: 10, 20, 30
        assert_eq!(start.elapsed(), Duration::from_millis(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_probe_is_other() {
        let probe = probe_fn(|| async {
            if true {
                panic!("lookup exploded");
            }
            ProbeOutcome::Done(())
        });

        let err = handler(probe).wait(&WaitContext::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.to_string().contains("lookup exploded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probes_never_overlap() {
        let busy = Arc::new(AtomicBool::new(false));
        let calls = Arc::new(AtomicU32::new(0));
        let (busy_flag, counter) = (busy.clone(), calls.clone());
        let probe = probe_fn(move || {
            let busy = busy_flag.clone();
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                assert!(!busy.swap(true, Ordering::SeqCst), "overlapping probe");
                sleep(Duration::from_millis(15)).await;
                busy.store(false, Ordering::SeqCst);
                if n < 4 {
                    ProbeOutcome::Pending
                } else {
                    ProbeOutcome::Done(())
                }
            }
        });

        handler(probe)
            .with_timeout(Duration::from_secs(1))
            .wait(&WaitContext::new())
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_never_probes() {
        let calls = Arc::new(AtomicU32::new(0));
        let ctx = WaitContext::new();
        ctx.cancel();
        let err = handler(scripted(0, calls.clone(), || ProbeOutcome::Done(())))
            .wait(&ctx)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(err.to_string().contains("test resource"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
