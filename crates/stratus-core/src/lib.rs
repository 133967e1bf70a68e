//! stratus-core: resource-lifecycle waiter
//!
//! A probe performs one lookup and reports `pending`, `done` or `fail`. The
//! [`AsyncActionHandler`] polls a probe until it settles, honouring a
//! deadline and a cancellation token. The [`catalog`] wires the standard
//! probe shapes to each (resource, operation) pair.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use stratus_api::RegionScope;
//! use stratus_client::{HttpClient, ServerAction};
//! use stratus_core::{WaitContext, catalog};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("https://{service}.api.stratus.cloud")?;
//! let scope = RegionScope::new("my-project", "eu01");
//!
//! client.server_action(&scope, "my-server", &ServerAction::Start).await?;
//! let server = catalog::iaas::start_server(&client, &scope, "my-server")
//!     .with_timeout(Duration::from_secs(300))
//!     .wait(&WaitContext::new())
//!     .await?;
//! println!("server is {:?}", server.status);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod probe;
pub mod retry;
pub mod shape;
pub mod state;

pub use config::WaiterConfig;
pub use context::WaitContext;
pub use error::{BoxError, ErrorKind, Result, WaitError};
pub use handler::AsyncActionHandler;
pub use probe::{Probe, ProbeFn, ProbeOutcome, probe_fn};
pub use retry::{GATEWAY_RETRY_LIMIT, RetryPolicy, Retryable};
pub use shape::{
    DEFAULT_NOT_FOUND_GRACE, DeletionProbe, DeletionWaiter, Fetch, LifecycleProbe,
    LifecycleWaiter, Operation, PresenceProbe, PresenceWaiter,
};
pub use state::{Snapshot, StateClass, StateSets};
