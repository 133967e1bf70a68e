//! `stratus wait ...`: attach to an operation that was already triggered

use clap::{Args, ValueEnum};
use stratus_api::DatabaseFamily;
use stratus_core::catalog::{dbflex, iaas, intake, object_storage};
use stratus_core::{DeletionWaiter, LifecycleWaiter, Snapshot};

use super::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resource {
    Server,
    Volume,
    Network,
    Bucket,
    IntakeRunner,
    Intake,
    IntakeUser,
    Postgres,
    Mongodb,
    Sqlserver,
}

impl Resource {
    fn family(self) -> Option<DatabaseFamily> {
        match self {
            Self::Postgres => Some(DatabaseFamily::Postgres),
            Self::Mongodb => Some(DatabaseFamily::MongoDb),
            Self::Sqlserver => Some(DatabaseFamily::SqlServer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    Create,
    Update,
    Start,
    Stop,
    Reboot,
    Resize,
    Rescue,
    Unrescue,
    Deallocate,
    Delete,
}

#[derive(Debug, Args)]
pub struct WaitArgs {
    #[arg(value_enum)]
    resource: Resource,

    /// Operation to wait for
    #[arg(long = "for", value_enum)]
    operation: Operation,

    /// Resource id; intake users take the intake id first, then the user id
    #[arg(required = true, num_args = 1..=2)]
    ids: Vec<String>,
}

/// Resolve the ids to `(id, parent id)`
fn split_ids(resource: Resource, ids: &[String]) -> eyre::Result<(&str, Option<&str>)> {
    match (resource, ids) {
        (Resource::IntakeUser, [intake_id, user_id]) => {
            Ok((user_id.as_str(), Some(intake_id.as_str())))
        }
        (Resource::IntakeUser, _) => eyre::bail!("intake-user takes <INTAKE_ID> <USER_ID>"),
        (_, [id]) => Ok((id.as_str(), None)),
        (resource, _) => eyre::bail!("{resource:?} takes exactly one id"),
    }
}

pub async fn run(ctx: &Context, args: WaitArgs) -> eyre::Result<()> {
    use Operation as Op;
    use Resource as R;

    let WaitArgs {
        resource,
        operation,
        ids,
    } = args;
    let (id, parent) = split_ids(resource, &ids)?;
    let parent = parent.unwrap_or_default();
    let (client, scope) = (&ctx.client, &ctx.scope);

    match (resource, operation) {
        (R::Server, Op::Create) => settle(ctx, iaas::create_server(client, scope, id)).await,
        (R::Server, Op::Start) => settle(ctx, iaas::start_server(client, scope, id)).await,
        (R::Server, Op::Stop) => settle(ctx, iaas::stop_server(client, scope, id)).await,
        (R::Server, Op::Reboot) => settle(ctx, iaas::reboot_server(client, scope, id)).await,
        (R::Server, Op::Resize) => settle(ctx, iaas::resize_server(client, scope, id)).await,
        (R::Server, Op::Rescue) => settle(ctx, iaas::rescue_server(client, scope, id)).await,
        (R::Server, Op::Unrescue) => settle(ctx, iaas::unrescue_server(client, scope, id)).await,
        (R::Server, Op::Deallocate) => {
            settle(ctx, iaas::deallocate_server(client, scope, id)).await
        }
        (R::Server, Op::Delete) => gone(ctx, iaas::delete_server(client, scope, id)).await,
        (R::Volume, Op::Create) => settle(ctx, iaas::create_volume(client, scope, id)).await,
        (R::Volume, Op::Delete) => gone(ctx, iaas::delete_volume(client, scope, id)).await,
        (R::Network, Op::Create | Op::Update) => {
            settle(ctx, iaas::create_or_update_network(client, scope, id)).await
        }
        (R::Network, Op::Delete) => gone(ctx, iaas::delete_network(client, scope, id)).await,
        (R::Bucket, Op::Create) => {
            let waiter = object_storage::create_bucket(client, scope, id);
            let what = waiter.resource().to_string();
            ctx.wait_for(waiter, &what).await?;
            println!("{what} exists");
            Ok(())
        }
        (R::Bucket, Op::Delete) => {
            gone(ctx, object_storage::delete_bucket(client, scope, id)).await
        }
        (R::IntakeRunner, Op::Create | Op::Update) => {
            settle(ctx, intake::create_or_update_intake_runner(client, scope, id)).await
        }
        (R::IntakeRunner, Op::Delete) => {
            gone(ctx, intake::delete_intake_runner(client, scope, id)).await
        }
        (R::Intake, Op::Create | Op::Update) => {
            settle(ctx, intake::create_or_update_intake(client, scope, id)).await
        }
        (R::Intake, Op::Delete) => gone(ctx, intake::delete_intake(client, scope, id)).await,
        (R::IntakeUser, Op::Create | Op::Update) => {
            let waiter = intake::create_or_update_intake_user(client, scope, parent, id);
            settle(ctx, waiter).await
        }
        (R::IntakeUser, Op::Delete) => {
            gone(ctx, intake::delete_intake_user(client, scope, parent, id)).await
        }
        (R::Postgres | R::Mongodb | R::Sqlserver, op) => {
            let Some(family) = resource.family() else {
                eyre::bail!("{resource:?} is not a database family");
            };
            match op {
                Op::Create => {
                    settle(ctx, dbflex::create_db_instance(client, family, scope, id)).await
                }
                Op::Update => {
                    let waiter = dbflex::partial_update_db_instance(client, family, scope, id);
                    settle(ctx, waiter).await
                }
                Op::Delete => {
                    gone(ctx, dbflex::delete_db_instance(client, family, scope, id)).await
                }
                _ => eyre::bail!("cannot wait for {op:?} on a {resource:?} instance"),
            }
        }
        (resource, op) => eyre::bail!("cannot wait for {op:?} on a {resource:?}"),
    }
}

/// Wait for a lifecycle operation and print the state it settled in
async fn settle<S: Snapshot>(ctx: &Context, waiter: LifecycleWaiter<'_, S>) -> eyre::Result<()> {
    let what = waiter.resource().to_string();
    let snapshot = ctx.wait_for(waiter, &what).await?;
    match snapshot.state() {
        Some(state) => println!("{what} is {state}"),
        None => println!("{what} is ready"),
    }
    Ok(())
}

async fn gone(ctx: &Context, waiter: DeletionWaiter<'_>) -> eyre::Result<()> {
    let what = waiter.resource().to_string();
    ctx.wait_for(waiter, &what).await?;
    println!("{what} is gone");
    Ok(())
}
