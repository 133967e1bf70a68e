//! Object storage types

use serde::{Deserialize, Serialize};

/// Object storage bucket
///
/// Buckets have no lifecycle state; a bucket is ready once the lookup
/// returns it and gone once the lookup returns 404.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: Option<String>,
    pub region: Option<String>,
    pub url_path_style: Option<String>,
    pub url_virtual_hosted_style: Option<String>,
}

/// Envelope returned by `GET .../bucket/{name}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketResponse {
    pub bucket: Option<Bucket>,
    pub project: Option<String>,
}
