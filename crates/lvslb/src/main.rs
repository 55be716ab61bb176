mod cli;
mod commands;
mod config;
mod error;
mod output;
mod state;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use lvslb_core::Endpoint;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    // Ctrl-C aborts the in-flight request; acknowledged actions stay applied.
    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            watcher.cancel();
        }
    });

    if let Err(err) = run(cli, cancel).await {
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

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    match cli.command {
        // Offline commands never resolve an endpoint
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Plan(ref args) => commands::plan::handle(args, &cli.global),
        Command::Validate(ref args) => commands::validate::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "lvslb", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let endpoint = Endpoint::new(config::resolve_endpoint(&cli.global)?);

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &endpoint, &cli.global, cancel).await
        }
    }
}
