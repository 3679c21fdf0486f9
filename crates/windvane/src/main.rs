mod cli;
mod error;
mod mcp;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use windvane_api::WeatherClient;
use windvane_core::DeviceResolver;

use crate::cli::Cli;
use crate::error::CliError;
use crate::mcp::server::McpServer;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries the protocol stream; logs must stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = windvane_config::load(cli.config.as_deref())?;
    let client_config = settings.into_client_config()?;
    let client = WeatherClient::new(client_config).map_err(CliError::Client)?;
    let resolver = DeviceResolver::new(client);

    McpServer::new(resolver).run().await?;
    Ok(())
}
