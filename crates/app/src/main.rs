//! Ricochet - Main Entry Point

use std::process::ExitCode;

use clap::Parser;
use ricochet::commands::{self, EXIT_ERROR, EXIT_PASS};
use ricochet::telemetry::init_tracing;
use ricochet::{Cli, Commands};
use ricochet_application::CancellationToken;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level.as_deref()) {
        eprintln!("ricochet: {e:#}");
        return ExitCode::from(EXIT_ERROR);
    }

    let status = match cli.command {
        Commands::Run(args) => {
            let (token, receiver) = CancellationToken::new();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, stopping after the current request");
                    token.cancel();
                }
            });

            match commands::run(&args, Some(receiver)).await {
                Ok(report) => {
                    print!("{}", commands::render_summary(&report));
                    commands::exit_status(report.outcome)
                }
                Err(e) => {
                    error!("{e:#}");
                    EXIT_ERROR
                }
            }
        }
        Commands::Check(args) => match commands::check(&args).await {
            Ok(summary) => {
                print!("{summary}");
                EXIT_PASS
            }
            Err(e) => {
                error!("{e:#}");
                EXIT_ERROR
            }
        },
    };

    ExitCode::from(status)
}
