//! Command executor for dispatching CLI commands

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::AppResult;

/// Execute the parsed command with merged settings.
///
/// `serve` (also the default when no subcommand is given) runs until a
/// shutdown signal arrives.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    let command = cli.command_or_default();
    warn_about_risky_args(&command, &settings);

    match command {
        Commands::Serve { dry_run, .. } => ServeCommandHandler::new(settings).execute(dry_run).await,
        Commands::Migrate { dry_run, rollback } => {
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await
        }
    }
}

/// Log argument combinations that are legal but probably unintended.
fn warn_about_risky_args(command: &Commands, settings: &Settings) {
    match command {
        Commands::Serve { dry_run: false, .. } => {
            if settings.server.port < 1024 && settings.server.host == "0.0.0.0" {
                tracing::warn!(
                    port = settings.server.port,
                    "Binding to 0.0.0.0 on a privileged port typically requires root privileges"
                );
            }
            if settings.database.auto_migrate {
                tracing::info!("Pending migrations will be applied before serving");
            }
        }
        Commands::Migrate {
            rollback: Some(steps),
            ..
        } if *steps > 50 => {
            tracing::warn!(
                steps = *steps,
                "Rolling back many migrations at once. Consider using smaller steps."
            );
        }
        _ => {}
    }
}
