//! Waiters for intake runners, intakes and intake users

use futures::FutureExt;
use stratus_api::{Intake, IntakeRunner, IntakeState, IntakeUser, RegionScope};
use stratus_client::IntakeApi;

use super::{INTAKE_RUNNER_TIMEOUT, INTAKE_TIMEOUT, INTAKE_USER_TIMEOUT, presence_of};
use crate::handler::AsyncActionHandler;
use crate::shape::{
    DeletionProbe, DeletionWaiter, Fetch, LifecycleProbe, LifecycleWaiter, Operation,
};
use crate::state::StateSets;

fn runner_fetch<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    runner_id: &str,
) -> Fetch<'a, IntakeRunner>
where
    C: IntakeApi + ?Sized,
{
    let scope = scope.clone();
    let runner_id = runner_id.to_string();
    Box::new(move || {
        let (scope, runner_id) = (scope.clone(), runner_id.clone());
        async move { client.get_intake_runner(&scope, &runner_id).await }.boxed()
    })
}

fn intake_fetch<'a, C>(client: &'a C, scope: &RegionScope, intake_id: &str) -> Fetch<'a, Intake>
where
    C: IntakeApi + ?Sized,
{
    let scope = scope.clone();
    let intake_id = intake_id.to_string();
    Box::new(move || {
        let (scope, intake_id) = (scope.clone(), intake_id.clone());
        async move { client.get_intake(&scope, &intake_id).await }.boxed()
    })
}

fn user_fetch<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    intake_id: &str,
    user_id: &str,
) -> Fetch<'a, IntakeUser>
where
    C: IntakeApi + ?Sized,
{
    let scope = scope.clone();
    let intake_id = intake_id.to_string();
    let user_id = user_id.to_string();
    Box::new(move || {
        let (scope, intake_id, user_id) = (scope.clone(), intake_id.clone(), user_id.clone());
        async move { client.get_intake_user(&scope, &intake_id, &user_id).await }.boxed()
    })
}

/// Wait until an intake runner is `ACTIVE`
///
/// Runners have no failure state; a stuck runner surfaces as a timeout.
pub fn create_or_update_intake_runner<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    runner_id: &str,
) -> LifecycleWaiter<'a, IntakeRunner>
where
    C: IntakeApi + ?Sized,
{
    let resource = format!("Intake Runner {runner_id}");
    let probe = LifecycleProbe::new(
        runner_fetch(client, scope, runner_id),
        resource.clone(),
        runner_id,
        Operation::CreateOrUpdate,
        StateSets::new([IntakeState::Active]),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(INTAKE_RUNNER_TIMEOUT)
        .labelled(resource)
}

pub fn delete_intake_runner<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    runner_id: &str,
) -> DeletionWaiter<'a>
where
    C: IntakeApi + ?Sized,
{
    let resource = format!("Intake Runner {runner_id}");
    let probe = DeletionProbe::new(
        presence_of(runner_fetch(client, scope, runner_id)),
        resource.clone(),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(INTAKE_RUNNER_TIMEOUT)
        .labelled(resource)
}

/// Wait until an intake is `ACTIVE`; `FAILED` ends the wait with an error
pub fn create_or_update_intake<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    intake_id: &str,
) -> LifecycleWaiter<'a, Intake>
where
    C: IntakeApi + ?Sized,
{
    let resource = format!("Intake {intake_id}");
    let probe = LifecycleProbe::new(
        intake_fetch(client, scope, intake_id),
        resource.clone(),
        intake_id,
        Operation::CreateOrUpdate,
        StateSets::new([IntakeState::Active]).with_failure([IntakeState::Failed]),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(INTAKE_TIMEOUT)
        .labelled(resource)
}

pub fn delete_intake<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    intake_id: &str,
) -> DeletionWaiter<'a>
where
    C: IntakeApi + ?Sized,
{
    let resource = format!("Intake {intake_id}");
    let probe = DeletionProbe::new(
        presence_of(intake_fetch(client, scope, intake_id)),
        resource.clone(),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(INTAKE_TIMEOUT)
        .labelled(resource)
}

/// Wait until an intake user is `ACTIVE`
pub fn create_or_update_intake_user<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    intake_id: &str,
    user_id: &str,
) -> LifecycleWaiter<'a, IntakeUser>
where
    C: IntakeApi + ?Sized,
{
    let resource = format!("Intake User {user_id}");
    let probe = LifecycleProbe::new(
        user_fetch(client, scope, intake_id, user_id),
        resource.clone(),
        user_id,
        Operation::CreateOrUpdate,
        StateSets::new([IntakeState::Active]),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(INTAKE_USER_TIMEOUT)
        .labelled(resource)
}

pub fn delete_intake_user<'a, C>(
    client: &'a C,
    scope: &RegionScope,
    intake_id: &str,
    user_id: &str,
) -> DeletionWaiter<'a>
where
    C: IntakeApi + ?Sized,
{
    let resource = format!("Intake User {user_id}");
    let probe = DeletionProbe::new(
        presence_of(user_fetch(client, scope, intake_id, user_id)),
        resource.clone(),
    );
    AsyncActionHandler::new(probe)
        .with_timeout(INTAKE_USER_TIMEOUT)
        .labelled(resource)
}
