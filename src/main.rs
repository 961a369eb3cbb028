//! # taskdeck
//!
//! A terminal client for a personal task list kept by a REST backend.
//!
//! ## Key Features
//!
//! - **Task list**: every task as a card, in the order the server returns them
//! - **Modal editor**: create or edit a task, change status with a segmented selector,
//!   pick a due date from a calendar
//! - **Confirmed deletes**: nothing is deleted without an explicit yes
//! - **Scripting CLI**: the same operations as subcommands for shell use
//!
//! The local list is never patched: after every successful create, update or delete
//! the whole list is fetched again from the server.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive screen against the default backend
//! taskdeck
//!
//! # Point at another backend
//! TASKDECK_API_URL=http://tasks.lan:8000/tasks taskdeck list
//!
//! # Add and update from the shell
//! taskdeck add "Water the plants" --priority 2 --due tomorrow
//! taskdeck update 4 --status done
//! taskdeck delete 4
//! ```
//!
//! ## Configuration
//!
//! - `--api-url` / `TASKDECK_API_URL`: task collection URL (default `http://localhost:8000/tasks`)
//! - `--log-file` / `TASKDECK_LOG`: log file of the interactive screen (default `taskdeck.log`)
//! - `RUST_LOG`: log filter (default `info`)
//!
//! Variables may also be set in a `.env` file in the working directory.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod confirm;
pub mod editor;
pub mod error;
pub mod fields;
pub mod format;
pub mod gateway;
pub mod logging;
pub mod screen;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod date_picker;
    pub mod dispatch;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;
use confirm::{AssumeYes, Confirmer, PromptConfirmer};
use gateway::HttpGateway;

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(&cli)?;
    let command = cli.command.unwrap_or(Commands::Ui);

    // Completions need neither logging nor a backend
    if let Commands::Completions { shell } = command {
        cmd_completions(shell);
        return Ok(());
    }

    match command {
        Commands::Ui => logging::init_file(&config.log_file)?,
        _ => logging::init_stderr(),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let gateway = Arc::new(HttpGateway::new(&config.api_url));
    info!(api_url = gateway.base_url(), "using task endpoint");

    match command {
        Commands::Ui => cmd_ui(&runtime, gateway, &config.log_file),

        Commands::List => cmd_list(&runtime, gateway.as_ref()),

        Commands::View { id } => cmd_view(&runtime, gateway.as_ref(), id),

        Commands::Add { title, desc, status, priority, due } => {
            let edits = TaskEdits { desc, status, priority, due, ..Default::default() };
            cmd_add(&runtime, gateway.as_ref(), title, edits)
        }

        Commands::Update { id, title, desc, status, priority, due, clear_due } => {
            let edits = TaskEdits { title, desc, status, priority, due, clear_due };
            ensure_edits(&edits)?;
            cmd_update(&runtime, gateway.as_ref(), id, edits)
        }

        Commands::Delete { id, yes } => {
            let mut confirmer: Box<dyn Confirmer> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(PromptConfirmer::stdin())
            };
            cmd_delete(&runtime, gateway.as_ref(), id, confirmer.as_mut())
        }

        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}

