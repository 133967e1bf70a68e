//! Waiters for managed database instances (PostgreSQL, MongoDB and SQL Server Flex)
//!
//! All three families share one instance model. `READY` and `ACTIVE` both
//! count as success because the families disagree on the name.

use futures::FutureExt;
use stratus_api::{DatabaseFamily, DbInstance, DbInstanceStatus, RegionScope};
use stratus_client::DbFlexApi;

use super::{DB_CREATE_TIMEOUT, DB_DELETE_TIMEOUT, DB_UPDATE_TIMEOUT, presence_of};
use crate::handler::AsyncActionHandler;
use crate::shape::{
    DeletionProbe, DeletionWaiter, Fetch, LifecycleProbe, LifecycleWaiter, Operation,
};
use crate::state::StateSets;

fn instance_fetch<'a, C>(
    client: &'a C,
    family: DatabaseFamily,
    scope: &RegionScope,
    instance_id: &str,
) -> Fetch<'a, DbInstance>
where
    C: DbFlexApi + ?Sized,
{
    let scope = scope.clone();
    let instance_id = instance_id.to_string();
    Box::new(move || {
        let (scope, instance_id) = (scope.clone(), instance_id.clone());
        async move { client.get_db_instance(family, &scope, &instance_id).await }.boxed()
    })
}

fn settled() -> StateSets<DbInstanceStatus> {
    StateSets::new([DbInstanceStatus::Ready, DbInstanceStatus::Active])
        .with_failure([DbInstanceStatus::Failed])
}

fn instance_waiter<'a, C>(
    client: &'a C,
    family: DatabaseFamily,
    scope: &RegionScope,
    instance_id: &str,
    operation: Operation,
) -> LifecycleWaiter<'a, DbInstance>
where
    C: DbFlexApi + ?Sized,
{
    let resource = format!("{family} instance {instance_id}");
    let probe = LifecycleProbe::new(
        instance_fetch(client, family, scope, instance_id),
        resource.clone(),
        instance_id,
        operation,
        settled(),
    );
    AsyncActionHandler::new(probe).labelled(resource)
}

pub fn create_db_instance<'a, C>(
    client: &'a C,
    family: DatabaseFamily,
    scope: &RegionScope,
    instance_id: &str,
) -> LifecycleWaiter<'a, DbInstance>
where
    C: DbFlexApi + ?Sized,
{
    instance_waiter(client, family, scope, instance_id, Operation::Create)
        .with_timeout(DB_CREATE_TIMEOUT)
}

pub fn partial_update_db_instance<'a, C>(
    client: &'a C,
    family: DatabaseFamily,
    scope: &RegionScope,
    instance_id: &str,
) -> LifecycleWaiter<'a, DbInstance>
where
    C: DbFlexApi + ?Sized,
{
    instance_waiter(client, family, scope, instance_id, Operation::PartialUpdate)
        .with_timeout(DB_UPDATE_TIMEOUT)
}

pub fn delete_db_instance<'a, C>(
    client: &'a C,
    family: DatabaseFamily,
    scope: &RegionScope,
    instance_id: &str,
) -> DeletionWaiter<'a>
where
    C: DbFlexApi + ?Sized,
{
    let resource = format!("{family} instance {instance_id}");
    let probe = DeletionProbe::new(
        presence_of(instance_fetch(client, family, scope, instance_id)),
        resource.clone(),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(DB_DELETE_TIMEOUT)
        .labelled(resource)
}
