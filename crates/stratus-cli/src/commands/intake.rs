//! `stratus intake ...`

use clap::Subcommand;
use stratus_core::catalog::intake;
use tracing::info;

use super::Context;

#[derive(Subcommand)]
pub enum IntakeCommand {
    /// Manage intake runners
    #[command(subcommand)]
    Runner(RunnerCommand),
    /// Manage intakes
    #[command(subcommand)]
    Instance(InstanceCommand),
    /// Manage intake users
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Subcommand)]
pub enum RunnerCommand {
    /// Delete an intake runner
    Delete { runner_id: String },
}

#[derive(Subcommand)]
pub enum InstanceCommand {
    /// Delete an intake
    Delete { intake_id: String },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Delete a user of an intake
    Delete { intake_id: String, user_id: String },
}

pub async fn run(ctx: &Context, command: IntakeCommand) -> eyre::Result<()> {
    let (client, scope) = (&ctx.client, &ctx.scope);
    match command {
        IntakeCommand::Runner(RunnerCommand::Delete { runner_id }) => {
            let what = format!("Intake Runner {runner_id}");
            let request = client.delete_intake_runner(scope, &runner_id);
            ctx.request(&format!("delete {what}"), request).await?;
            info!(runner = %runner_id, "delete accepted");
            if !ctx.no_wait {
                ctx.wait_for(intake::delete_intake_runner(client, scope, &runner_id), &what)
                    .await?;
            }
            report_deleted(ctx, &what);
        }
        IntakeCommand::Instance(InstanceCommand::Delete { intake_id }) => {
            let what = format!("Intake {intake_id}");
            let request = client.delete_intake(scope, &intake_id);
            ctx.request(&format!("delete {what}"), request).await?;
            info!(intake = %intake_id, "delete accepted");
            if !ctx.no_wait {
                ctx.wait_for(intake::delete_intake(client, scope, &intake_id), &what)
                    .await?;
            }
            report_deleted(ctx, &what);
        }
        IntakeCommand::User(UserCommand::Delete { intake_id, user_id }) => {
            let what = format!("Intake User {user_id}");
            let request = client.delete_intake_user(scope, &intake_id, &user_id);
            ctx.request(&format!("delete {what}"), request).await?;
            info!(intake = %intake_id, user = %user_id, "delete accepted");
            if !ctx.no_wait {
                let waiter = intake::delete_intake_user(client, scope, &intake_id, &user_id);
                ctx.wait_for(waiter, &what).await?;
            }
            report_deleted(ctx, &what);
        }
    }
    Ok(())
}

fn report_deleted(ctx: &Context, what: &str) {
    if ctx.no_wait {
        println!("Triggered deletion of {what}");
    } else {
        println!("Deleted {what}");
    }
}
