//! tribunal CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. The JSON response
//! is already on stdout when an error comes back; stderr gets a one-line
//! copy and the process exits non-zero.

use tribunal::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
