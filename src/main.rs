use clap::Parser;
use stockroom::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    let handle = init_logger_from_settings(&settings)?;

    tracing::debug!(
        filter = handle.current_filter().as_deref().unwrap_or("unknown"),
        "Logger initialized"
    );

    execute_command(&cli, settings).await?;

    Ok(())
}
