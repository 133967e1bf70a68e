//! `stratus db ...`

use clap::Subcommand;
use stratus_api::DatabaseFamily;
use stratus_api::requests::{PartialUpdateInstancePayload, StoragePayload};
use stratus_core::catalog::dbflex;
use tracing::info;

use super::Context;

#[derive(Subcommand)]
pub enum DbCommand {
    /// Change name, flavor or storage of a managed database instance
    Update {
        /// postgres, mongodb or sqlserver
        family: DatabaseFamily,
        instance_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        flavor_id: Option<String>,
        /// Storage size in GB
        #[arg(long)]
        storage_size: Option<i64>,
    },
}

pub async fn run(ctx: &Context, command: DbCommand) -> eyre::Result<()> {
    let DbCommand::Update {
        family,
        instance_id,
        name,
        flavor_id,
        storage_size,
    } = command;

    let payload = PartialUpdateInstancePayload {
        name,
        flavor_id,
        storage: storage_size.map(|size| StoragePayload { size }),
        version: None,
    };
    if payload.is_empty() {
        eyre::bail!("nothing to update: pass at least one of --name, --flavor-id, --storage-size");
    }

    let what = format!("{family} instance {instance_id}");
    let request = ctx
        .client
        .partial_update_db_instance(family, &ctx.scope, &instance_id, &payload);
    ctx.request(&format!("update {what}"), request).await?;
    info!(family = family.service_name(), instance = %instance_id, "update accepted");

    if ctx.no_wait {
        println!("Triggered update of {what}");
        return Ok(());
    }
    let waiter = dbflex::partial_update_db_instance(&ctx.client, family, &ctx.scope, &instance_id);
    let instance = ctx.wait_for(waiter, &what).await?;
    let status = instance
        .status
        .map_or_else(|| "unknown".to_string(), |status| status.to_string());
    println!("Updated {what} ({status})");
    Ok(())
}
