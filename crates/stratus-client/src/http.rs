//! HTTP client for the Stratus cloud APIs

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use stratus_api::requests::{PartialUpdateInstancePayload, RescueServerPayload, ResizeServerPayload};
use stratus_api::{
    Bucket, BucketResponse, DatabaseFamily, DbInstance, DbInstanceResponse, Intake, IntakeRunner,
    IntakeUser, Network, RegionScope, Server, Volume,
};

use crate::endpoints::{Endpoints, Service};
use crate::error::{ClientError, Result};
use crate::traits::{DbFlexApi, IaasApi, IntakeApi, ObjectStorageApi};

const INTAKE_VERSION: &str = "v1beta";
const IAAS_VERSION: &str = "v2";
const OBJECT_STORAGE_VERSION: &str = "v2";
const DBFLEX_VERSION: &str = "v2";

/// Server lifecycle actions that are triggered with a `POST .../servers/{id}/<action>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAction {
    Start,
    Stop,
    Reboot,
    Deallocate,
    Unrescue,
    Resize { machine_type: String },
    Rescue { image_id: String },
}

impl ServerAction {
    fn path(&self) -> &'static str {
        match self {
            ServerAction::Start => "start",
            ServerAction::Stop => "stop",
            ServerAction::Reboot => "reboot",
            ServerAction::Deallocate => "deallocate",
            ServerAction::Unrescue => "unrescue",
            ServerAction::Resize { .. } => "resize",
            ServerAction::Rescue { .. } => "rescue",
        }
    }
}

/// HTTP client for the Stratus cloud APIs
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    endpoints: Endpoints,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from an endpoint template
    ///
    /// # Errors
    /// Returns an error if the template is not a valid URL.
    ///
    /// # Example
    /// ```no_run
    /// use stratus_client::HttpClient;
    ///
    /// let client = HttpClient::new("https://{service}.api.stratus.cloud")?
    ///     .with_token("my-access-token");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(endpoint_template: impl Into<String>) -> Result<Self> {
        Ok(Self::from_endpoints(Endpoints::new(endpoint_template)?))
    }

    /// Create a new HTTP client from prepared endpoints
    #[must_use]
    pub fn from_endpoints(endpoints: Endpoints) -> Self {
        Self::with_client(endpoints, Client::new())
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    ///
    /// Per-request timeouts are configured on the `reqwest::Client`.
    #[must_use]
    pub fn with_client(endpoints: Endpoints, client: Client) -> Self {
        Self {
            client,
            endpoints,
            token: None,
        }
    }

    /// Authenticate every request with a bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Endpoint routing used by this client
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Build a regional resource URL: `<base>/<version>/projects/<p>/regions/<r>/<segments..>`
    fn regional_url(
        &self,
        service: Service,
        version: &str,
        scope: &RegionScope,
        segments: &[&str],
    ) -> Result<Url> {
        let mut path = vec![
            version,
            "projects",
            scope.project_id.as_str(),
            "regions",
            scope.region.as_str(),
        ];
        path.extend_from_slice(segments);
        self.endpoints.url(service, &path)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "sending request");
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and map non-success statuses to `ClientError::Api`
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::Http(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        Ok(response)
    }

    /// Perform a GET request and deserialize the response
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(self.request(Method::GET, url)).await?;
        let body = response.bytes().await?;
        decode_body(&body)
    }

    /// Perform a request with an optional JSON body, discarding the response body
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<()> {
        let mut builder = self.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder).await?;
        Ok(())
    }

    // Infrastructure endpoints

    /// Trigger a server lifecycle action
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn server_action(
        &self,
        scope: &RegionScope,
        server_id: &str,
        action: &ServerAction,
    ) -> Result<()> {
        let url = self.regional_url(
            Service::Iaas,
            IAAS_VERSION,
            scope,
            &["servers", server_id, action.path()],
        )?;
        match action {
            ServerAction::Resize { machine_type } => {
                let payload = ResizeServerPayload {
                    machine_type: machine_type.clone(),
                };
                self.execute(Method::POST, url, Some(&payload)).await
            }
            ServerAction::Rescue { image_id } => {
                let payload = RescueServerPayload {
                    image: image_id.clone(),
                };
                self.execute(Method::POST, url, Some(&payload)).await
            }
            _ => self.execute(Method::POST, url, None::<&()>).await,
        }
    }

    /// Delete a server
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn delete_server(&self, scope: &RegionScope, server_id: &str) -> Result<()> {
        let url = self.regional_url(Service::Iaas, IAAS_VERSION, scope, &["servers", server_id])?;
        self.execute(Method::DELETE, url, None::<&()>).await
    }

    // Object storage endpoints

    /// Create a bucket
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn create_bucket(&self, scope: &RegionScope, bucket_name: &str) -> Result<()> {
        let url = self.bucket_url(scope, bucket_name)?;
        self.execute(Method::POST, url, None::<&()>).await
    }

    /// Delete a bucket
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn delete_bucket(&self, scope: &RegionScope, bucket_name: &str) -> Result<()> {
        let url = self.bucket_url(scope, bucket_name)?;
        self.execute(Method::DELETE, url, None::<&()>).await
    }

    /// Object storage addresses projects with a singular `project` segment
    fn bucket_url(&self, scope: &RegionScope, bucket_name: &str) -> Result<Url> {
        self.endpoints.url(
            Service::ObjectStorage,
            &[
                OBJECT_STORAGE_VERSION,
                "project",
                scope.project_id.as_str(),
                "regions",
                scope.region.as_str(),
                "bucket",
                bucket_name,
            ],
        )
    }

    // Intake endpoints

    /// Delete an intake runner
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn delete_intake_runner(&self, scope: &RegionScope, runner_id: &str) -> Result<()> {
        let url = self.regional_url(
            Service::Intake,
            INTAKE_VERSION,
            scope,
            &["intake-runners", runner_id],
        )?;
        self.execute(Method::DELETE, url, None::<&()>).await
    }

    /// Delete an intake
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn delete_intake(&self, scope: &RegionScope, intake_id: &str) -> Result<()> {
        let url =
            self.regional_url(Service::Intake, INTAKE_VERSION, scope, &["intakes", intake_id])?;
        self.execute(Method::DELETE, url, None::<&()>).await
    }

    /// Delete an intake user
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn delete_intake_user(
        &self,
        scope: &RegionScope,
        intake_id: &str,
        user_id: &str,
    ) -> Result<()> {
        let url = self.regional_url(
            Service::Intake,
            INTAKE_VERSION,
            scope,
            &["intakes", intake_id, "users", user_id],
        )?;
        self.execute(Method::DELETE, url, None::<&()>).await
    }

    // Managed database endpoints

    /// Partially update a managed database instance
    ///
    /// # Errors
    /// Returns an error if the request fails or the API returns an error.
    pub async fn partial_update_db_instance(
        &self,
        family: DatabaseFamily,
        scope: &RegionScope,
        instance_id: &str,
        payload: &PartialUpdateInstancePayload,
    ) -> Result<()> {
        let url = self.regional_url(
            family.into(),
            DBFLEX_VERSION,
            scope,
            &["instances", instance_id],
        )?;
        self.execute(Method::PATCH, url, Some(payload)).await
    }
}

/// Decode a JSON body, treating an empty or `null` body as a missing resource
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let trimmed = body.trim_ascii();
    if trimmed.is_empty() || trimmed == b"null" {
        return Err(ClientError::EmptyResponse);
    }
    Ok(serde_json::from_slice(trimmed)?)
}

#[async_trait]
impl IntakeApi for HttpClient {
    async fn get_intake_runner(
        &self,
        scope: &RegionScope,
        runner_id: &str,
    ) -> Result<IntakeRunner> {
        let url = self.regional_url(
            Service::Intake,
            INTAKE_VERSION,
            scope,
            &["intake-runners", runner_id],
        )?;
        self.get(url).await
    }

    async fn get_intake(&self, scope: &RegionScope, intake_id: &str) -> Result<Intake> {
        let url =
            self.regional_url(Service::Intake, INTAKE_VERSION, scope, &["intakes", intake_id])?;
        self.get(url).await
    }

    async fn get_intake_user(
        &self,
        scope: &RegionScope,
        intake_id: &str,
        user_id: &str,
    ) -> Result<IntakeUser> {
        let url = self.regional_url(
            Service::Intake,
            INTAKE_VERSION,
            scope,
            &["intakes", intake_id, "users", user_id],
        )?;
        self.get(url).await
    }
}

#[async_trait]
impl IaasApi for HttpClient {
    async fn get_server(&self, scope: &RegionScope, server_id: &str) -> Result<Server> {
        let url = self.regional_url(Service::Iaas, IAAS_VERSION, scope, &["servers", server_id])?;
        self.get(url).await
    }

    async fn get_volume(&self, scope: &RegionScope, volume_id: &str) -> Result<Volume> {
        let url = self.regional_url(Service::Iaas, IAAS_VERSION, scope, &["volumes", volume_id])?;
        self.get(url).await
    }

    async fn get_network(&self, scope: &RegionScope, network_id: &str) -> Result<Network> {
        let url =
            self.regional_url(Service::Iaas, IAAS_VERSION, scope, &["networks", network_id])?;
        self.get(url).await
    }
}

#[async_trait]
impl ObjectStorageApi for HttpClient {
    async fn get_bucket(&self, scope: &RegionScope, bucket_name: &str) -> Result<Bucket> {
        let url = self.bucket_url(scope, bucket_name)?;
        let response: BucketResponse = self.get(url).await?;
        response.bucket.ok_or(ClientError::EmptyResponse)
    }
}

#[async_trait]
impl DbFlexApi for HttpClient {
    async fn get_db_instance(
        &self,
        family: DatabaseFamily,
        scope: &RegionScope,
        instance_id: &str,
    ) -> Result<DbInstance> {
        let url = self.regional_url(
            family.into(),
            DBFLEX_VERSION,
            scope,
            &["instances", instance_id],
        )?;
        let response: DbInstanceResponse = self.get(url).await?;
        response.item.ok_or(ClientError::EmptyResponse)
    }
}
