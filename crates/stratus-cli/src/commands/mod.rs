//! Subcommand implementations
//!
//! Every mutating command issues one API call and then, unless `--async`
//! was given, blocks on the matching catalog waiter.

pub mod bucket;
pub mod db;
pub mod intake;
pub mod server;
pub mod wait;

use std::future::Future;
use std::time::Duration;

use color_eyre::Section;
use eyre::WrapErr;
use stratus_api::RegionScope;
use stratus_client::HttpClient;
use stratus_core::{
    AsyncActionHandler, ErrorKind, Probe, Retryable, RetryPolicy, WaitContext, WaitError,
};

use crate::config::WaitSettings;
use crate::spinner::Spinner;

/// Shared state for one command invocation
pub struct Context {
    pub client: HttpClient,
    pub scope: RegionScope,
    pub settings: WaitSettings,
    /// `--timeout` override for the catalog default
    pub timeout: Option<Duration>,
    /// `--async`: trigger the operation and return
    pub no_wait: bool,
    pub wait_ctx: WaitContext,
}

impl Context {
    /// Apply configured polling settings and the `--timeout` override
    fn tune<P>(&self, waiter: AsyncActionHandler<P>) -> AsyncActionHandler<P>
    where
        P: Probe + Retryable,
    {
        let waiter = waiter
            .with_interval(Duration::from_secs(self.settings.poll_interval_secs))
            .with_backoff(
                self.settings.backoff_factor,
                Duration::from_secs(self.settings.max_backoff_secs),
            )
            .with_initial_delay(Duration::from_secs(self.settings.initial_delay_secs));
        let waiter = if self.settings.retry_gateway_errors {
            waiter.with_retry(RetryPolicy::gateway_errors())
        } else {
            waiter
        };
        match self.timeout {
            Some(timeout) => waiter.with_timeout(timeout),
            None => waiter,
        }
    }

    /// Send a mutating request, abandoning it when Ctrl-C arrives first
    ///
    /// # Errors
    /// Returns the client error wrapped as "failed to {action}", or
    /// [`WaitError::Cancelled`] when interrupted
    pub async fn request<T>(
        &self,
        action: &str,
        request: impl Future<Output = stratus_client::Result<T>>,
    ) -> eyre::Result<T> {
        tokio::select! {
            biased;
            () = self.wait_ctx.cancelled() => {
                let err = WaitError::Cancelled {
                    resource: action.to_string(),
                };
                Err(eyre::Report::new(err)
                    .wrap_err(format!("interrupted before the request to {action} completed"))
                    .note("the request may already have reached the API"))
            }
            result = request => result.wrap_err_with(|| format!("failed to {action}")),
        }
    }

    /// Block on `waiter` behind a spinner
    ///
    /// # Errors
    /// Returns the wait error with context and a hint for ambiguous outcomes
    pub async fn wait_for<P>(
        &self,
        waiter: AsyncActionHandler<P>,
        what: &str,
    ) -> eyre::Result<P::Output>
    where
        P: Probe + Retryable,
    {
        let spinner = Spinner::start(format!("Waiting for {what}"));
        let result = self.tune(waiter).wait(&self.wait_ctx).await;
        spinner.finish();
        result.map_err(|err| report(err, what))
    }
}

/// Turn a wait error into a report, keeping the error downcastable
fn report(err: WaitError, what: &str) -> eyre::Report {
    let kind = err.kind();
    let definitive = err.is_definitive();
    let report = eyre::Report::new(err).wrap_err(format!("waiting for {what} did not succeed"));
    let report = if definitive {
        report
    } else {
        report.note("the operation may still complete remotely")
    };
    match kind {
        ErrorKind::DeadlineExceeded => {
            report.suggestion("check again later with `stratus wait`, or raise --timeout")
        }
        ErrorKind::Cancelled => {
            report.note("only the wait was cancelled, not the remote operation")
        }
        ErrorKind::Transient => report.suggestion("the service is unstable; retry the wait later"),
        _ => report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        Context {
            client: HttpClient::new("https://{service}.api.stratus.test").unwrap(),
            scope: RegionScope::new("pid", "eu01"),
            settings: WaitSettings::default(),
            timeout: None,
            no_wait: false,
            wait_ctx: WaitContext::new(),
        }
    }

    #[tokio::test]
    async fn test_request_is_abandoned_on_interrupt() {
        let ctx = context();
        ctx.wait_ctx.cancel();

        let err = ctx
            .request("delete server s-1", std::future::pending::<stratus_client::Result<()>>())
            .await
            .unwrap_err();

        let cause = err.downcast_ref::<WaitError>().unwrap();
        assert_eq!(cause.kind(), ErrorKind::Cancelled);
        assert_eq!(crate::render::code_for(&err), crate::render::EXIT_CANCELLED);
    }

    #[tokio::test]
    async fn test_request_passes_result_through() {
        let ctx = context();
        let value = ctx
            .request("start server s-1", async { Ok::<_, stratus_client::ClientError>(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);

        let err = ctx
            .request("start server s-1", async {
                Err::<(), _>(stratus_client::ClientError::EmptyResponse)
            })
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<WaitError>().is_none());
        assert!(format!("{err}").contains("failed to start server s-1"));
    }

    #[test]
    fn test_ambiguous_outcomes_keep_the_error() {
        let err = WaitError::DeadlineExceeded {
            resource: "server s-1".to_string(),
            elapsed: Duration::from_secs(1),
        };
        let report = report(err, "server s-1");
        let cause = report.downcast_ref::<WaitError>().unwrap();
        assert!(!cause.is_definitive());
    }
}
