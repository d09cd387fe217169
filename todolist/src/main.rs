//! `todolist`: keep a local to-do list from the terminal.
//!
//! Tasks live in a single JSON file. Configuration via CLI flags,
//! environment variables, or config file (`~/.config/todolist/config.toml`).
//!
//! ```bash
//! todolist add "Buy milk" -d "2%"
//! todolist list
//! todolist done 0
//! todolist sort name
//! todolist search milk
//!
//! # Use a different task file
//! TODOLIST_DATA=/tmp/tasks.json todolist list
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use todolist::app::{App, Command};
use todolist::config::{AppConfig, CliArgs};
use todolist::tasks::TaskStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match AppConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            AppConfig::from_cli(&cli)
        }
    };

    let _log_guard = init_logging(&config.log_level, config.log_file.as_deref());

    let store = TaskStore::open(&config.storage);
    store.load().await;

    let app = App::new(store.clone());
    let command = cli.command.unwrap_or(Command::List);
    let result = app.execute(command);

    // Writes are fire-and-forget; make sure they land before exiting.
    store.flush().await;

    match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging.
///
/// With a log file, output goes through a non-blocking file writer and the
/// returned [`WorkerGuard`] must be held until shutdown so buffered entries
/// are flushed. Without one, logs go to stderr so stdout carries only
/// command output.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let Some((log_dir, file_name)) = file_path.and_then(|p| Some((p.parent()?, p.file_name()?)))
    else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .with_ansi(false)
            .init();
        return None;
    };

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
