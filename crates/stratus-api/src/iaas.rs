//! Infrastructure service types (servers, volumes and networks)

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server status as reported by the infrastructure API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerStatus {
    Creating,
    Active,
    Inactive,
    Starting,
    Stopping,
    Rebooting,
    Resizing,
    Rescue,
    Rescuing,
    Unrescuing,
    Deallocating,
    Deallocated,
    Deleting,
    Error,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Creating => "CREATING",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Starting => "STARTING",
            Self::Stopping => "STOPPING",
            Self::Rebooting => "REBOOTING",
            Self::Resizing => "RESIZING",
            Self::Rescue => "RESCUE",
            Self::Rescuing => "RESCUING",
            Self::Unrescuing => "UNRESCUING",
            Self::Deallocating => "DEALLOCATING",
            Self::Deallocated => "DEALLOCATED",
            Self::Deleting => "DELETING",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Server as returned by `GET .../servers/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<ServerStatus>,
    pub machine_type: Option<String>,
    pub availability_zone: Option<String>,
    /// Set by the API when `status` is `ERROR`
    pub error_message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Block storage volume status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeStatus {
    Creating,
    Available,
    Attaching,
    Attached,
    Detaching,
    Deleting,
    Error,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for VolumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Creating => "CREATING",
            Self::Available => "AVAILABLE",
            Self::Attaching => "ATTACHING",
            Self::Attached => "ATTACHED",
            Self::Detaching => "DETACHING",
            Self::Deleting => "DELETING",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Volume as returned by `GET .../volumes/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<VolumeStatus>,
    /// Size in GB
    pub size: Option<i64>,
    pub availability_zone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Network provisioning state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkState {
    Creating,
    Created,
    Updating,
    Deleting,
    Failed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Creating => "CREATING",
            Self::Created => "CREATED",
            Self::Updating => "UPDATING",
            Self::Deleting => "DELETING",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Network as returned by `GET .../networks/{id}`
///
/// The API names the identifier `networkId` rather than `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub network_id: Option<String>,
    pub name: Option<String>,
    pub state: Option<NetworkState>,
    #[serde(default)]
    pub prefixes: Vec<String>,
    pub routed: Option<bool>,
}
