//! Project and region addressing

use std::fmt;

use serde::{Deserialize, Serialize};

/// Project and region a resource lives in
///
/// Every regional API call is addressed through this pair, so the two values
/// travel together instead of as loose positional strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionScope {
    /// Project identifier (usually a UUID)
    pub project_id: String,
    /// Region name, e.g. `eu01`
    pub region: String,
}

impl RegionScope {
    /// Create a new scope
    pub fn new(project_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
        }
    }
}

impl fmt::Display for RegionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project {} ({})", self.project_id, self.region)
    }
}
