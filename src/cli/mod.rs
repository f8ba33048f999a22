//! CLI module for tribunal
//!
//! Provides command-line access to:
//! - graph: list, inspect, cycles, blast radius, fragility
//! - snapshot: create, list, show
//! - replay / verify: certify a recorded run
//! - diff: structural comparison of two runs
//! - ledger: recent artifacts
//!
//! Every command writes exactly one JSON object to stdout.

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, Fixture, GraphAction, LedgerAction, SnapshotAction};
pub use commands::run_command;
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, ok_response, read_json_file, write_error, write_response};

/// Parse arguments, run the command and write its response.
///
/// Failures are written as an error response before being returned, so the
/// caller only has to pick the exit code.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    let outcome = Config::load_or_default(cli.config.as_deref())
        .and_then(|config| run_command(cli.command, &config));

    match outcome {
        Ok(data) => write_response(data),
        Err(err) => {
            write_error(err.code_str(), err.message())?;
            Err(err)
        }
    }
}
