//! `stratus server ...`

use clap::Subcommand;
use stratus_client::ServerAction;
use stratus_core::catalog::iaas;
use tracing::info;

use super::Context;

#[derive(Subcommand)]
pub enum ServerCommand {
    /// Start a stopped server
    Start { server_id: String },
    /// Stop a running server
    Stop { server_id: String },
    /// Reboot a server
    Reboot { server_id: String },
    /// Change the machine type of a server
    Resize {
        server_id: String,
        #[arg(long)]
        machine_type: String,
    },
    /// Boot a server into a rescue image
    Rescue {
        server_id: String,
        #[arg(long)]
        image_id: String,
    },
    /// Leave rescue mode
    Unrescue { server_id: String },
    /// Release the compute resources of a stopped server
    Deallocate { server_id: String },
    /// Delete a server
    Delete { server_id: String },
}

impl ServerCommand {
    fn server_id(&self) -> &str {
        match self {
            Self::Start { server_id }
            | Self::Stop { server_id }
            | Self::Reboot { server_id }
            | Self::Resize { server_id, .. }
            | Self::Rescue { server_id, .. }
            | Self::Unrescue { server_id }
            | Self::Deallocate { server_id }
            | Self::Delete { server_id } => server_id,
        }
    }

    /// The lifecycle action behind this command; `None` for delete
    fn action(&self) -> Option<ServerAction> {
        match self {
            Self::Start { .. } => Some(ServerAction::Start),
            Self::Stop { .. } => Some(ServerAction::Stop),
            Self::Reboot { .. } => Some(ServerAction::Reboot),
            Self::Resize { machine_type, .. } => Some(ServerAction::Resize {
                machine_type: machine_type.clone(),
            }),
            Self::Rescue { image_id, .. } => Some(ServerAction::Rescue {
                image_id: image_id.clone(),
            }),
            Self::Unrescue { .. } => Some(ServerAction::Unrescue),
            Self::Deallocate { .. } => Some(ServerAction::Deallocate),
            Self::Delete { .. } => None,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Stop { .. } => "stop",
            Self::Reboot { .. } => "reboot",
            Self::Resize { .. } => "resize",
            Self::Rescue { .. } => "rescue",
            Self::Unrescue { .. } => "unrescue",
            Self::Deallocate { .. } => "deallocation",
            Self::Delete { .. } => "deletion",
        }
    }

    fn past(&self) -> &'static str {
        match self {
            Self::Start { .. } => "Started",
            Self::Stop { .. } => "Stopped",
            Self::Reboot { .. } => "Rebooted",
            Self::Resize { .. } => "Resized",
            Self::Rescue { .. } => "Rescued",
            Self::Unrescue { .. } => "Unrescued",
            Self::Deallocate { .. } => "Deallocated",
            Self::Delete { .. } => "Deleted",
        }
    }
}

pub async fn run(ctx: &Context, command: ServerCommand) -> eyre::Result<()> {
    let server_id = command.server_id().to_string();
    let what = format!("server {server_id}");
    let triggered = format!("Triggered {} of {what}", command.verb());

    match command.action() {
        Some(action) => {
            let request = ctx.client.server_action(&ctx.scope, &server_id, &action);
            ctx.request(&format!("trigger {} of {what}", command.verb()), request)
                .await?;
        }
        None => {
            let request = ctx.client.delete_server(&ctx.scope, &server_id);
            ctx.request(&format!("delete {what}"), request).await?;
        }
    }
    info!(server = %server_id, action = command.verb(), "request accepted");

    if ctx.no_wait {
        println!("{triggered}");
        return Ok(());
    }

    let (client, scope) = (&ctx.client, &ctx.scope);
    let waiter = match &command {
        ServerCommand::Start { .. } => iaas::start_server(client, scope, &server_id),
        ServerCommand::Stop { .. } => iaas::stop_server(client, scope, &server_id),
        ServerCommand::Reboot { .. } => iaas::reboot_server(client, scope, &server_id),
        ServerCommand::Resize { .. } => iaas::resize_server(client, scope, &server_id),
        ServerCommand::Rescue { .. } => iaas::rescue_server(client, scope, &server_id),
        ServerCommand::Unrescue { .. } => iaas::unrescue_server(client, scope, &server_id),
        ServerCommand::Deallocate { .. } => iaas::deallocate_server(client, scope, &server_id),
        ServerCommand::Delete { .. } => {
            ctx.wait_for(iaas::delete_server(client, scope, &server_id), &what)
                .await?;
            println!("{} {what}", command.past());
            return Ok(());
        }
    };

    let server = ctx.wait_for(waiter, &what).await?;
    let status = server
        .status
        .map_or_else(|| "unknown".to_string(), |status| status.to_string());
    println!("{} {what} ({status})", command.past());
    Ok(())
}
