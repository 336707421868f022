use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct TimerCLI {
    /// Override the data root holding timers.json, can also be overridden using $TASKTIMER_ROOT
    #[arg(long)]
    pub root: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<CLISubcommand>,
}

#[derive(Subcommand, Debug, Default, PartialEq)]
pub enum CLISubcommand {
    /// Serve the timer tools over stdio (default)
    #[default]
    Serve,
    /// Start (or restart) the timer for a task
    Start {
        /// Name of the task to time
        #[arg(value_parser = parse_task)]
        task: String,
    },
    /// Stop a running timer and show the elapsed time
    Stop {
        /// Name of the task to stop timing
        #[arg(value_parser = parse_task)]
        task: String,
    },
    /// List running timers
    List,
}

fn parse_task(task: &str) -> Result<String, String> {
    if task.is_empty() {
        Err("task name must not be empty".to_string())
    } else {
        Ok(task.to_string())
    }
}
