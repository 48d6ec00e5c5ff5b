mod cli;
mod logger;

use crate::cli::Cli;
use crate::logger::LOGGER;
use clap::Parser;
use kiln_server::dev::{DevOrchestrator, Mode};
use kiln_server::server::ServerConfig;
use kiln_shared::KilnResult;
use log::{LevelFilter, error, info};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Map verbosity count (-v, -vv) to log levels
    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(log_level))
        .is_err()
    {
        eprintln!("failed to install logger");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(target: "server", "{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> KilnResult {
    let mode = Mode::from_arg(cli.dev.as_deref());
    let config = ServerConfig::new()
        .with_host(cli.host)
        .with_port(cli.port)
        .with_root(cli.root);

    info!(target: "server", "initializing...");

    DevOrchestrator::new(config, mode)?.run().await
}
