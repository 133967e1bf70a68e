//! Read-side API traits used by waiters
//!
//! Each trait covers the lookups one service family offers. `HttpClient`
//! implements all of them; tests substitute in-memory mocks.

use async_trait::async_trait;
use stratus_api::{
    Bucket, DatabaseFamily, DbInstance, Intake, IntakeRunner, IntakeUser, Network, RegionScope,
    Server, Volume,
};

use crate::error::Result;

#[async_trait]
pub trait IntakeApi: Send + Sync {
    async fn get_intake_runner(&self, scope: &RegionScope, runner_id: &str)
    -> Result<IntakeRunner>;
    async fn get_intake(&self, scope: &RegionScope, intake_id: &str) -> Result<Intake>;
    async fn get_intake_user(
        &self,
        scope: &RegionScope,
        intake_id: &str,
        user_id: &str,
    ) -> Result<IntakeUser>;
}

#[async_trait]
pub trait IaasApi: Send + Sync {
    async fn get_server(&self, scope: &RegionScope, server_id: &str) -> Result<Server>;
    async fn get_volume(&self, scope: &RegionScope, volume_id: &str) -> Result<Volume>;
    async fn get_network(&self, scope: &RegionScope, network_id: &str) -> Result<Network>;
}

#[async_trait]
pub trait ObjectStorageApi: Send + Sync {
    async fn get_bucket(&self, scope: &RegionScope, bucket_name: &str) -> Result<Bucket>;
}

#[async_trait]
pub trait DbFlexApi: Send + Sync {
    async fn get_db_instance(
        &self,
        family: DatabaseFamily,
        scope: &RegionScope,
        instance_id: &str,
    ) -> Result<DbInstance>;
}
