//! Binary-level error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use windvane_config::ConfigError;

/// Exit codes for process termination.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 2;
    pub const IO: i32 = 3;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(
        code(windvane::config),
        help(
            "Set WINDVANE_APPLICATION_KEY and WINDVANE_API_KEY,\n\
             or put them in the config file (see --config)."
        )
    )]
    Config(#[from] ConfigError),

    #[error("Could not construct the upstream client")]
    #[diagnostic(code(windvane::client))]
    Client(#[source] windvane_api::Error),

    #[error(transparent)]
    #[diagnostic(code(windvane::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => exit_code::CONFIG,
            Self::Client(_) => exit_code::GENERAL,
            Self::Io(_) => exit_code::IO,
        }
    }
}
