//! Fournil CLI

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::cli::Cli;

mod cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(source) = cli::logging::init(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("failed to initialize logging: {source}");
        }
    }

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(kind = %err.kind(), "{err}");

            #[expect(
                clippy::print_stderr,
                reason = "the failure must reach the user whatever the log level"
            )]
            {
                eprintln!("{}: {err}", err.kind());
            }

            ExitCode::from(err.exit_code())
        }
    }
}
