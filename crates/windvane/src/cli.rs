use std::path::PathBuf;

use clap::Parser;

/// MCP gateway for Ecowitt weather stations.
///
/// Speaks MCP over stdio; all diagnostics go to stderr. Credentials come
/// from the config file or WINDVANE_* environment variables.
#[derive(Debug, Parser)]
#[command(name = "windvane", version, about)]
pub struct Cli {
    /// Path to the TOML config file (defaults to the platform config dir).
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}
