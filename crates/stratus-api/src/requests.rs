//! Request payloads for mutating calls

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeServerPayload {
    pub machine_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescueServerPayload {
    /// Image to boot the rescue system from
    pub image: String,
}

/// Partial update of a managed database instance; unset fields are left as-is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialUpdateInstancePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StoragePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PartialUpdateInstancePayload {
    /// True when no field would be changed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.flavor_id.is_none()
            && self.storage.is_none()
            && self.version.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoragePayload {
    /// Size in GB
    pub size: i64,
}
