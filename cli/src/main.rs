//! Capsule CLI - Encrypted, containerised per-project dev sessions

use std::process::ExitCode;

use clap::Parser;

use capsule_cli::cli::Cli;
use capsule_cli::domain::error::{error_code, is_timeout};
use capsule_cli::logging;
use capsule_cli::output::json::format_error;

/// Exit status for a boundary call that hit its deadline.
const EXIT_TIMEOUT: u8 = 124;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let json = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            if json {
                match format_error(&format!("{e:#}"), error_code(&e)) {
                    Ok(out) => println!("{out}"),
                    Err(_) => eprintln!("Error: {e:#}"),
                }
            } else {
                eprintln!("Error: {e:#}");
            }
            if is_timeout(&e) {
                ExitCode::from(EXIT_TIMEOUT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
