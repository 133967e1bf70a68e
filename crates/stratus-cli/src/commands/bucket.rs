//! `stratus bucket ...`

use clap::Subcommand;
use stratus_core::catalog::object_storage;
use tracing::info;

use super::Context;

#[derive(Subcommand)]
pub enum BucketCommand {
    /// Create an object storage bucket
    Create { name: String },
    /// Delete an object storage bucket
    Delete { name: String },
}

pub async fn run(ctx: &Context, command: BucketCommand) -> eyre::Result<()> {
    match command {
        BucketCommand::Create { name } => {
            let what = format!("bucket {name}");
            let request = ctx.client.create_bucket(&ctx.scope, &name);
            ctx.request(&format!("create {what}"), request).await?;
            info!(bucket = %name, "create accepted");
            if ctx.no_wait {
                println!("Triggered creation of {what}");
                return Ok(());
            }
            let bucket = ctx
                .wait_for(object_storage::create_bucket(&ctx.client, &ctx.scope, &name), &what)
                .await?;
            match bucket.url_virtual_hosted_style {
                Some(url) => println!("Created {what} at {url}"),
                None => println!("Created {what}"),
            }
        }
        BucketCommand::Delete { name } => {
            let what = format!("bucket {name}");
            let request = ctx.client.delete_bucket(&ctx.scope, &name);
            ctx.request(&format!("delete {what}"), request).await?;
            info!(bucket = %name, "delete accepted");
            if ctx.no_wait {
                println!("Triggered deletion of {what}");
                return Ok(());
            }
            ctx.wait_for(object_storage::delete_bucket(&ctx.client, &ctx.scope, &name), &what)
                .await?;
            println!("Deleted {what}");
        }
    }
    Ok(())
}
