//! stratus-api: Shared API types
//!
//! Contains the resource snapshots returned by the Stratus cloud APIs, their
//! lifecycle state enums and the request payloads used by the CLI.

pub mod dbflex;
pub mod iaas;
pub mod intake;
pub mod object_storage;
pub mod requests;
pub mod scope;

pub use dbflex::{DatabaseFamily, DbInstance, DbInstanceResponse, DbInstanceStatus};
pub use iaas::{Network, NetworkState, Server, ServerStatus, Volume, VolumeStatus};
pub use intake::{Intake, IntakeRunner, IntakeState, IntakeUser};
pub use object_storage::{Bucket, BucketResponse};
pub use scope::RegionScope;
