//! Command-line front end over the todo list core.
//!
//! # Responsibility
//! - Run one store session per invocation: load, apply at most one
//!   mutation, print the resulting list.
//! - Exercise the same storage path the FFI layer uses.
//!
//! ## Exit codes
//!
//! - 0: success (including boundary no-ops)
//! - 1: the record could not be loaded or the mutation could not be saved
//! - 2: setup error (logging or database open failed)

use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use todolist_core::{
    default_log_level, init_logging, resolve_db_path, LoadSource, MutationOutcome, PersistStatus,
    SqliteKeyValueStore, TodoStore,
};

mod exit_codes {
    pub const OK: u8 = 0;
    pub const DEGRADED: u8 = 1;
    pub const SETUP_ERROR: u8 = 2;
}

/// Local todo list backed by a SQLite key-value record.
#[derive(Debug, Parser)]
#[command(name = "todolist", version)]
struct Cli {
    /// Database file; defaults to `$TODOLIST_DB_PATH` or a temp-dir file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (`trace|debug|info|warn|error`).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print the list as the persisted JSON record shape.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show all items and the progress line (default).
    List,
    /// Append a new item; blank text is ignored.
    Add {
        /// Item label.
        text: String,
    },
    /// Flip completion of one item.
    Toggle {
        /// Item id as printed by `list`.
        id: String,
    },
    /// Remove one item.
    Delete {
        /// Item id as printed by `list`.
        id: String,
    },
    /// Print only the completed fraction.
    Progress,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    ExitCode::from(run(cli))
}

fn run(cli: Cli) -> u8 {
    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, &log_dir.to_string_lossy()) {
            eprintln!("logging setup failed: {err}");
            return exit_codes::SETUP_ERROR;
        }
    }

    let db_path = cli.db.clone().unwrap_or_else(resolve_db_path);
    let storage = match SqliteKeyValueStore::open(&db_path) {
        Ok(storage) => storage,
        Err(err) => {
            eprintln!("failed to open `{}`: {err}", db_path.display());
            return exit_codes::SETUP_ERROR;
        }
    };

    let mut store = TodoStore::new(storage);
    let mut code = exit_codes::OK;
    match store.load() {
        Ok(LoadSource::Restored)
        | Ok(LoadSource::Seeded(PersistStatus::Saved | PersistStatus::Skipped)) => {}
        Ok(LoadSource::Seeded(PersistStatus::Failed(reason))) => {
            eprintln!("warning: seed list not saved: {reason}");
            code = exit_codes::DEGRADED;
        }
        Ok(LoadSource::Failed(err)) => {
            eprintln!("warning: {err}");
            code = exit_codes::DEGRADED;
        }
        Err(err) => {
            eprintln!("{err}");
            return exit_codes::SETUP_ERROR;
        }
    }
    info!(
        "event=cli_session module=cli status=ok db={} count={}",
        db_path.display(),
        store.len()
    );

    let outcome = match cli.command.unwrap_or(Command::List) {
        Command::List => None,
        Command::Progress => {
            println!("{:.2}", store.progress());
            return code;
        }
        Command::Add { text } => Some(store.add(&text)),
        Command::Toggle { id } => Some(store.toggle_complete(&id)),
        Command::Delete { id } => Some(store.delete(&id)),
    };

    if let Some(result) = outcome {
        match result {
            Ok(MutationOutcome { changed, persist }) => {
                if !changed {
                    eprintln!("no change");
                }
                if let PersistStatus::Failed(reason) = persist {
                    eprintln!("warning: not saved: {reason}");
                    code = exit_codes::DEGRADED;
                }
            }
            Err(err) => {
                eprintln!("{err}");
                return exit_codes::DEGRADED;
            }
        }
    }

    print_list(&store, cli.json);
    code
}

fn print_list(store: &TodoStore<SqliteKeyValueStore>, json: bool) {
    if json {
        match serde_json::to_string_pretty(store.items()) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => eprintln!("failed to render list: {err}"),
        }
        return;
    }

    for item in store.items() {
        let mark = if item.is_completed { "x" } else { " " };
        println!("[{mark}] {}  {}", item.id, item.text);
    }
    println!(
        "{}/{} done ({:.0}%)",
        store.completed_count(),
        store.len(),
        store.progress() * 100.0
    );
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_global_flags() {
        let cli = Cli::parse_from(["todolist", "add", "buy milk", "--db", "/tmp/t.db", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/t.db")));
        assert!(matches!(cli.command, Some(Command::Add { text }) if text == "buy milk"));
    }

    #[test]
    fn subcommand_is_optional() {
        let cli = Cli::parse_from(["todolist"]);
        assert!(cli.command.is_none());
    }
}
