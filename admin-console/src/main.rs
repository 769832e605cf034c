use admin_console::cli::{self, Cli};
use admin_console::config::get_configuration;
use admin_console::navigation::HistoryNavigator;
use admin_console::Console;
use api_core::observability::init_tracing;
use clap::Parser;
use dotenvy::dotenv;
use std::io::Write;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args = Cli::parse();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "admin-console",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    );

    let navigator = Arc::new(HistoryNavigator::new());
    let console = Console::from_settings(&configuration, navigator.clone()).map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize console");
        anyhow::anyhow!("Failed to initialize console: {}", e)
    })?;

    let mut stdout = std::io::stdout().lock();
    cli::run(args.command, &console, &mut stdout).await?;

    if let Some(route) = navigator.current() {
        writeln!(stdout, "-> {}", route)?;
    }

    Ok(())
}
