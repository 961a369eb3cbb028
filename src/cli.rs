use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::DEFAULT_API_URL;

/// Terminal client for a REST task list.
/// Runs the interactive screen when no subcommand is given.
#[derive(Parser)]
#[command(name = "taskdeck", version, about = "Manage a REST-backed task list from the terminal")]
pub struct Cli {
    /// Base URL of the task collection endpoint.
    #[arg(long, global = true, env = "TASKDECK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Log file used by the interactive screen.
    #[arg(long, global = true, env = "TASKDECK_LOG")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
