use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dockrun::init_logging(cli.global.log_directive());
    tracing::debug!(command = ?cli.command, "Dispatching");

    let result = match cli.command {
        Commands::Pull(args) => commands::pull::execute(args, &cli.global).await.map(|()| 0),
        Commands::Run(args) => commands::run::execute(args, &cli.global).await,
        Commands::Exec(args) => commands::exec::execute(args, &cli.global).await,
        Commands::Ps(args) => commands::ps::execute(args, &cli.global).await.map(|()| 0),
        Commands::Stop(args) => commands::stop::execute(args, &cli.global).await.map(|()| 0),
        Commands::Rm(args) => commands::rm::execute(args, &cli.global).await.map(|()| 0),
    };

    match result {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Container exit statuses are 0..=255; anything else wraps like a shell would.
fn exit_code(code: i64) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}
