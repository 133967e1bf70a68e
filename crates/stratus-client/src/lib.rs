//! stratus-client: HTTP client library for the Stratus cloud APIs
//!
//! Provides the typed lookups the waiters poll, plus the handful of mutating
//! calls the CLI triggers before waiting.
//!
//! # Example
//!
//! ```no_run
//! use stratus_api::RegionScope;
//! use stratus_client::{HttpClient, IaasApi, ServerAction};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("https://{service}.api.stratus.cloud")?.with_token("token");
//! let scope = RegionScope::new("my-project", "eu01");
//!
//! client.server_action(&scope, "my-server", &ServerAction::Start).await?;
//! let server = client.get_server(&scope, "my-server").await?;
//! println!("status: {:?}", server.status);
//! # Ok(())
//! # }
//! ```

pub mod endpoints;
pub mod error;
pub mod http;
pub mod traits;

pub use endpoints::{DEFAULT_ENDPOINT_TEMPLATE, Endpoints, Service};
pub use error::{ClientError, Result};
pub use http::{HttpClient, ServerAction};
pub use traits::{DbFlexApi, IaasApi, IntakeApi, ObjectStorageApi};
