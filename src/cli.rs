//! CLI interface for the sprinkler controller.
//!
//! Each subcommand maps onto one core operation: `submit` records a command,
//! `history` replays the command log, `actual` shows what the device agent
//! last reported, and `status` shows both the way the control page did.

mod format;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sprinkler::{
    Controller, actual,
    history::{self, History},
    model,
    storage::FileStore,
};

use crate::config::Config;

use format::{format_actual, format_history, format_totals};

/// Sprinkler: command a remote irrigation controller and watch what it reports.
#[derive(Debug, Parser)]
#[command(name = "sprinkler", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Directory holding the command log and audit trail.
    /// Overrides `data-dir` from the config file.
    #[arg(long, global = true, env = "SPRINKLER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow:
  1. sprinkler submit Protect
     → appends to the command log and updates the mirror file
  2. sprinkler status
     → current command, history, and the device's reported state

Files (defaults, relative to the data dir):
  controlstate.txt      command log, one `<state> <date>` per command
  controllog.txt        audit trail
  ../mirrorstate.txt    current command, polled by the device agent
  ../actualstate.txt    written by the device agent";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Command a new operating mode.
    ///
    /// Unrecognized names change nothing. See `sprinkler modes`.
    Submit {
        /// Mode name, e.g. `Protect`.
        name: String,
    },

    /// Show the current command and past commands, most recent first.
    History {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Also show how often each mode was commanded.
        #[arg(long)]
        totals: bool,
    },

    /// Show the state last reported by the device agent.
    Actual {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show history and the reported state together.
    Status {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List the recognized modes.
    Modes,

    /// Revert the last command.
    ///
    /// Not yet implemented.
    Undo,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    let paths = config.store_paths(cli.data_dir.as_deref())?;
    let controller = Controller::new(FileStore::new(paths));

    match cli.command {
        Command::Submit { name } => cmd_submit(config, &controller, &name),
        Command::History { json, totals } => cmd_history(&controller, json, totals),
        Command::Actual { json } => cmd_actual(&controller, json),
        Command::Status { json } => cmd_status(&controller, json),
        Command::Modes => {
            for mode in model::Command::ALL {
                println!("{mode}");
            }
            Ok(())
        }
        Command::Undo => controller.undo().map_err(|e| e.to_string()),
    }
}

fn cmd_submit(
    config: &Config,
    controller: &Controller<FileStore>,
    name: &str,
) -> Result<(), String> {
    let now = config.clock()?.now();

    let event = controller
        .submit(name, now)
        .map_err(|e| format!("failed to submit {name}: {e}"))?;

    match event {
        Some(event) => println!("{} {} {}", event.date(), event.command, event.time()),
        None => eprintln!("'{name}' is not a recognized mode; nothing changed"),
    }
    Ok(())
}

fn cmd_history(
    controller: &Controller<FileStore>,
    json: bool,
    totals: bool,
) -> Result<(), String> {
    let history = load_history(controller)?;

    if json {
        let value = serde_json::json!({
            "history": history,
            "totals": totals_json(&history),
        });
        return print_json(&value);
    }

    for line in format_history(&history) {
        println!("{line}");
    }
    if totals {
        for line in format_totals(&history) {
            println!("{line}");
        }
    }
    warn_skipped(&history);
    Ok(())
}

fn cmd_actual(controller: &Controller<FileStore>, json: bool) -> Result<(), String> {
    let actual = actual::read(controller.store());

    if json {
        return print_json(&actual);
    }
    for line in format_actual(&actual) {
        println!("{line}");
    }
    Ok(())
}

fn cmd_status(controller: &Controller<FileStore>, json: bool) -> Result<(), String> {
    let history = load_history(controller)?;
    let actual = actual::read(controller.store());

    if json {
        let value = serde_json::json!({
            "history": history,
            "actual": actual,
        });
        return print_json(&value);
    }

    for line in format_history(&history) {
        println!("{line}");
    }
    println!();
    for line in format_actual(&actual) {
        println!("{line}");
    }
    warn_skipped(&history);
    Ok(())
}

fn load_history(controller: &Controller<FileStore>) -> Result<History, String> {
    history::render(controller.store()).map_err(|e| format!("failed to load history: {e}"))
}

fn totals_json(history: &History) -> serde_json::Map<String, serde_json::Value> {
    history
        .totals()
        .into_iter()
        .map(|(command, count)| (command.to_string(), count.into()))
        .collect()
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize output: {e}"))?;
    println!("{json}");
    Ok(())
}

fn warn_skipped(history: &History) {
    let skipped = history.skipped();
    if skipped > 0 {
        eprintln!("Skipped {skipped} malformed command log record(s)");
    }
}
