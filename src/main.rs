use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tasktimer::{
    args::{CLISubcommand, TimerCLI},
    config::Config,
    error::TimerError,
    log::init_tracing,
    mcp::Server,
    time::{self, elapsed_seconds, format_timestamp, seconds_to_string},
    timers::TimerStore,
};
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(TimerCLI::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!("Failed to run: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: TimerCLI) -> Result<ExitCode, TimerError> {
    let config = Config::resolve(args.root)?;
    debug!("Using data root {}", config.root.display());

    let store = TimerStore::new(config.root);

    match args.command.unwrap_or_default() {
        CLISubcommand::Serve => {
            Server::new(store).serve_stdio().await?;
        }
        CLISubcommand::Start { task } => {
            let started = store.start(&task)?;

            println!(
                "Started timer on {} for task {}",
                format_timestamp(&started.started_at).bright_yellow(),
                task.blue()
            );
        }
        CLISubcommand::Stop { task } => {
            let Some(stopped) = store.stop(&task)? else {
                eprintln!("{}", format!("No running timer found for \"{task}\".").red());
                return Ok(ExitCode::FAILURE);
            };

            println!(
                "Stopped timer for task {} after {}",
                task.blue(),
                seconds_to_string(stopped.elapsed_seconds).green()
            );
        }
        CLISubcommand::List => {
            let running = store.running();
            if running.is_empty() {
                println!("No running timers");
            }

            let now = time::now();
            for timer in running {
                println!(
                    "{} since {} ({})",
                    timer.task.blue(),
                    format_timestamp(&timer.started_at).bright_yellow(),
                    seconds_to_string(elapsed_seconds(&timer.started_at, &now)).green()
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
