//! Waiters for servers, volumes and networks

use futures::FutureExt;
use stratus_api::{
    Network, NetworkState, RegionScope, Server, ServerStatus, Volume, VolumeStatus,
};
use stratus_client::IaasApi;

use super::{NETWORK_TIMEOUT, SERVER_TIMEOUT, VOLUME_TIMEOUT, presence_of};
use crate::handler::AsyncActionHandler;
use crate::shape::{
    DeletionProbe, DeletionWaiter, Fetch, LifecycleProbe, LifecycleWaiter, Operation,
};
use crate::state::StateSets;

fn server_fetch<'a, C>(client: &'a C, scope: &RegionScope, server_id: &str) -> Fetch<'a, Server>
where
    C: IaasApi + ?Sized,
{
    let scope = scope.clone();
    let server_id = server_id.to_string();
    Box::new(move || {
        let (scope, server_id) = (scope.clone(), server_id.clone());
        async move { client.get_server(&scope, &server_id).await }.boxed()
    })
}

fn volume_fetch<'a, C>(client: &'a C, scope: &RegionScope, volume_id: &str) -> Fetch<'a, Volume>
where
    C: IaasApi + ?Sized,
{
    let scope = scope.clone();
    let volume_id = volume_id.to_string();
    Box::new(move || {
        let (scope, volume_id) = (scope.clone(), volume_id.clone());
        async move { client.get_volume(&scope, &volume_id).await }.boxed()
    })
}

fn network_fetch<'a, C>(client: &'a C, scope: &RegionScope, network_id: &str) -> Fetch<'a, Network>
where
    C: IaasApi + ?Sized,
{
    let scope = scope.clone();
    let network_id = network_id.to_string();
    Box::new(move || {
        let (scope, network_id) = (scope.clone(), network_id.clone());
        async move { client.get_network(&scope, &network_id).await }.boxed()
    })
}

/// Server waiter that ends on `target`, or fails on `ERROR`
fn server_waiter<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    server_id: &str,
    operation: Operation,
    target: ServerStatus,
) -> LifecycleWaiter<'a, Server>
where
    C: IaasApi + ?Sized,
{
    let resource = format!("server {server_id}");
    let probe = LifecycleProbe::new(
        server_fetch(client, scope, server_id),
        resource.clone(),
        server_id,
        operation,
        StateSets::new([target]).with_failure([ServerStatus::Error]),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(SERVER_TIMEOUT)
        .labelled(resource)
}

pub fn create_server<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    server_id: &str,
) -> LifecycleWaiter<'a, Server>
where
    C: IaasApi + ?Sized,
{
    server_waiter(client, scope, server_id, Operation::Create, ServerStatus::Active)
}

pub fn start_server<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    server_id: &str,
) -> LifecycleWaiter<'a, Server>
where
    C: IaasApi + ?Sized,
{
    server_waiter(client, scope, server_id, Operation::Start, ServerStatus::Active)
}

pub fn stop_server<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    server_id: &str,
) -> LifecycleWaiter<'a, Server>
where
    C: IaasApi + ?Sized,
{
    server_waiter(client, scope, server_id, Operation::Stop, ServerStatus::Inactive)
}

pub fn reboot_server<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    server_id: &str,
) -> LifecycleWaiter<'a, Server>
where
    C: IaasApi + ?Sized,
{
    server_waiter(client, scope, server_id, Operation::Reboot, ServerStatus::Active)
        .map_probe(|probe| probe.with_intermediate([ServerStatus::Rebooting]))
}

/// Resize ends back in `ACTIVE` with the new machine type
///
/// The server is still `ACTIVE` right after the request is accepted, so
/// success only counts after `RESIZING` was seen.
pub fn resize_server<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    server_id: &str,
) -> LifecycleWaiter<'a, Server>
where
    C: IaasApi + ?Sized,
{
    server_waiter(client, scope, server_id, Operation::Resize, ServerStatus::Active)
        .map_probe(|probe| probe.with_intermediate([ServerStatus::Resizing]))
}

pub fn rescue_server<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    server_id: &str,
) -> LifecycleWaiter<'a, Server>
where
    C: IaasApi + ?Sized,
{
    server_waiter(client, scope, server_id, Operation::Rescue, ServerStatus::Rescue)
}

pub fn unrescue_server<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    server_id: &str,
) -> LifecycleWaiter<'a, Server>
where
    C: IaasApi + ?Sized,
{
    server_waiter(client, scope, server_id, Operation::Unrescue, ServerStatus::Active)
}

pub fn deallocate_server<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    server_id: &str,
) -> LifecycleWaiter<'a, Server>
where
    C: IaasApi + ?Sized,
{
    server_waiter(client, scope, server_id, Operation::Deallocate, ServerStatus::Deallocated)
}

pub fn delete_server<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    server_id: &str,
) -> DeletionWaiter<'a>
where
    C: IaasApi + ?Sized,
{
    let resource = format!("server {server_id}");
    let probe = DeletionProbe::new(
        presence_of(server_fetch(client, scope, server_id)),
        resource.clone(),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(SERVER_TIMEOUT)
        .labelled(resource)
}

/// Wait until a volume is `AVAILABLE`
pub fn create_volume<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    volume_id: &str,
) -> LifecycleWaiter<'a, Volume>
where
    C: IaasApi + ?Sized,
{
    let resource = format!("volume {volume_id}");
    let probe = LifecycleProbe::new(
        volume_fetch(client, scope, volume_id),
        resource.clone(),
        volume_id,
        Operation::Create,
        StateSets::new([VolumeStatus::Available]).with_failure([VolumeStatus::Error]),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(VOLUME_TIMEOUT)
        .labelled(resource)
}

pub fn delete_volume<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    volume_id: &str,
) -> DeletionWaiter<'a>
where
    C: IaasApi + ?Sized,
{
    let resource = format!("volume {volume_id}");
    let probe = DeletionProbe::new(
        presence_of(volume_fetch(client, scope, volume_id)),
        resource.clone(),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(VOLUME_TIMEOUT)
        .labelled(resource)
}

/// Wait until a network is `CREATED`
pub fn create_or_update_network<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    network_id: &str,
) -> LifecycleWaiter<'a, Network>
where
    C: IaasApi + ?Sized,
{
    let resource = format!("network {network_id}");
    let probe = LifecycleProbe::new(
        network_fetch(client, scope, network_id),
        resource.clone(),
        network_id,
        Operation::CreateOrUpdate,
        StateSets::new([NetworkState::Created]).with_failure([NetworkState::Failed]),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(NETWORK_TIMEOUT)
        .labelled(resource)
}

pub fn delete_network<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    network_id: &str,
) -> DeletionWaiter<'a>
where
    C: IaasApi + ?Sized,
{
    let resource = format!("network {network_id}");
    let probe = DeletionProbe::new(
        presence_of(network_fetch(client, scope, network_id)),
        resource.clone(),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(NETWORK_TIMEOUT)
        .labelled(resource)
}
