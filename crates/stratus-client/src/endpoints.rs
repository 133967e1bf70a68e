//! Endpoint routing for the per-service APIs

use std::collections::BTreeMap;
use std::fmt;

use stratus_api::DatabaseFamily;
use url::Url;

use crate::error::{ClientError, Result};

/// Default endpoint template; `{service}` is replaced by the service name
pub const DEFAULT_ENDPOINT_TEMPLATE: &str = "https://{service}.api.stratus.cloud";

/// Remote services the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Service {
    Intake,
    Iaas,
    ObjectStorage,
    PostgresFlex,
    MongoDbFlex,
    SqlServerFlex,
}

impl Service {
    pub const ALL: [Service; 6] = [
        Service::Intake,
        Service::Iaas,
        Service::ObjectStorage,
        Service::PostgresFlex,
        Service::MongoDbFlex,
        Service::SqlServerFlex,
    ];

    /// Name used in host names, path prefixes and configuration keys
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Service::Intake => "intake",
            Service::Iaas => "iaas",
            Service::ObjectStorage => "object-storage",
            Service::PostgresFlex => "postgresflex",
            Service::MongoDbFlex => "mongodbflex",
            Service::SqlServerFlex => "sqlserverflex",
        }
    }

    /// Look up a service by its configuration name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl From<DatabaseFamily> for Service {
    fn from(family: DatabaseFamily) -> Self {
        match family {
            DatabaseFamily::Postgres => Service::PostgresFlex,
            DatabaseFamily::MongoDb => Service::MongoDbFlex,
            DatabaseFamily::SqlServer => Service::SqlServerFlex,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base URLs per service
///
/// A template containing `{service}` yields one host per service. A template
/// without the placeholder is treated as a shared gateway and the service
/// name becomes the first path segment.
#[derive(Debug, Clone)]
pub struct Endpoints {
    template: String,
    overrides: BTreeMap<Service, Url>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            template: DEFAULT_ENDPOINT_TEMPLATE.to_string(),
            overrides: BTreeMap::new(),
        }
    }
}

impl Endpoints {
    /// Create endpoints from a template
    ///
    /// # Errors
    /// Returns an error if the template does not expand to a valid URL.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let endpoints = Self {
            template: template.into(),
            overrides: BTreeMap::new(),
        };
        // validate the template up front
        endpoints.resolve(Service::Intake)?;
        Ok(endpoints)
    }

    /// Pin one service to a fixed base URL
    ///
    /// # Errors
    /// Returns an error if the URL is invalid.
    pub fn with_override(mut self, service: Service, base_url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(base_url.as_ref())?;
        self.overrides.insert(service, url);
        Ok(self)
    }

    /// Base URL for a service
    ///
    /// # Errors
    /// Returns an error if the template expands to an invalid URL.
    pub fn resolve(&self, service: Service) -> Result<Url> {
        if let Some(url) = self.overrides.get(&service) {
            return Ok(url.clone());
        }

        if self.template.contains("{service}") {
            return Ok(Url::parse(&self.template.replace("{service}", service.name()))?);
        }

        let mut url = Url::parse(&self.template)?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidEndpoint(self.template.clone()))?
            .pop_if_empty()
            .push(service.name());
        Ok(url)
    }

    /// Build a full URL for a service from path segments
    ///
    /// Segments are percent-encoded individually, so identifiers can never
    /// change the shape of the path.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot be resolved.
    pub fn url(&self, service: Service, segments: &[&str]) -> Result<Url> {
        let mut url = self.resolve(service)?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidEndpoint(service.name().to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_per_service_host() {
        let endpoints = Endpoints::default();
        let url = endpoints.resolve(Service::Iaas).unwrap();
        assert_eq!(url.as_str(), "https://iaas.api.stratus.cloud/");
    }

    #[test]
    fn test_shared_gateway_prefixes_service() {
        let endpoints = Endpoints::new("http://localhost:8080").unwrap();
        let url = endpoints
            .url(Service::Intake, &["v1beta", "projects", "p-1"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/intake/v1beta/projects/p-1");
    }

    #[test]
    fn test_override_wins() {
        let endpoints = Endpoints::default()
            .with_override(Service::ObjectStorage, "http://127.0.0.1:9000/os/")
            .unwrap();
        let url = endpoints.url(Service::ObjectStorage, &["v2", "project"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/os/v2/project");
    }

    #[test]
    fn test_segments_are_encoded() {
        let endpoints = Endpoints::new("http://localhost").unwrap();
        let url = endpoints.url(Service::Iaas, &["servers", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost/iaas/servers/a%2Fb");
    }

    #[test]
    fn test_invalid_template() {
        assert!(Endpoints::new("not a url").is_err());
    }

    #[test]
    fn test_service_names_round_trip() {
        for service in Service::ALL {
            assert_eq!(Service::from_name(service.name()), Some(service));
        }
        assert_eq!(Service::from(DatabaseFamily::MongoDb), Service::MongoDbFlex);
    }
}
