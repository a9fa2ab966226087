mod capture;
mod chart;
mod cli;
mod clipboard;
mod commands;
mod config;
mod error;
mod output;
mod shell;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::Ctx;
use crate::error::CliError;
use crate::shell::TerminalShell;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        // The shell already showed these to the user.
        if !err.is_reported() {
            eprintln!("{:?}", miette::Report::new(err));
        }
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

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need an appliance connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "pidns", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the appliance
        cmd => {
            let session = config::build_session_config(&cli.global)?;
            let shell = Arc::new(TerminalShell::new(
                cli.global.yes,
                cli.global.quiet,
                output::should_color(cli.global.color),
            ));
            let ctx = Ctx {
                global: &cli.global,
                shell,
                config: session,
            };

            tracing::debug!(command = ?cmd, url = %ctx.config.url, "dispatching command");
            commands::dispatch(cmd, &ctx).await
        }
    }
}
