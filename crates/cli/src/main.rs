//! get-aws-secret CLI
//!
//! Fetches a single secret from AWS Secrets Manager and writes the decoded
//! value to stdout. Logs go to stderr.

mod cli;
mod commands;
mod output;
mod tracing;

use crate::cli::{Cli, CliError, Commands, EXIT_OK, exit_code_for, render_error};
use crate::tracing::TracingConfig;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    #[allow(clippy::print_stderr)]
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
    };
    // Ignore error if tracing already initialized
    let _ = crate::tracing::init_tracing(tracing_config);

    let exit_code = match run(cli) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            let code = exit_code_for(&err);
            render_error(err);
            code
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Config {
            message: format!("Failed to create tokio runtime: {e}"),
            help: None,
        })?;

    runtime.block_on(async {
        match cli.command {
            Commands::Get(args) => commands::execute_get(args).await,
        }
    })
}
