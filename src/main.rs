//! Pomodoro board CLI
//!
//! A focus timer with three modes:
//! - light: 25 minutes of work, 5 minutes of break
//! - medium: 35 minutes of work, 7 minutes of break
//! - deep: 50 minutes of work, 10 minutes of break

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::debug;

use pomodoro_board::api::{ApiClient, SessionStore, TaskStore};
use pomodoro_board::calendar::YearMonth;
use pomodoro_board::cli::{Cli, Commands, Display, IpcClient, TaskCommand};
use pomodoro_board::config::AppConfig;
use pomodoro_board::daemon;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&e);
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        generate_completions(shell);
        return Ok(());
    }

    let config = AppConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    debug!(?config, "Configuration loaded");

    match command {
        Commands::Daemon => daemon::run(config).await?,
        Commands::Start => Display::show_response(&IpcClient::new(&config)?.start().await?),
        Commands::Pause => Display::show_response(&IpcClient::new(&config)?.pause().await?),
        Commands::Reset => Display::show_response(&IpcClient::new(&config)?.reset().await?),
        Commands::Mode { name } => {
            let client = IpcClient::new(&config)?;
            Display::show_response(&client.select_mode(&name).await?);
        }
        Commands::Status => Display::show_status(&IpcClient::new(&config)?.status().await?),
        Commands::Watch => watch(IpcClient::new(&config)?).await?,
        Commands::Select { id } => {
            Display::show_response(&IpcClient::new(&config)?.select_task(id).await?)
        }
        Commands::Unselect => {
            Display::show_response(&IpcClient::new(&config)?.clear_task().await?)
        }
        Commands::Stats => {
            let stats = api_client(&config).fetch_stats().await?;
            Display::show_stats(&stats);
        }
        Commands::Tasks => {
            let registry = config.build_registry()?;
            let tasks = api_client(&config).list_tasks().await?;
            Display::show_tasks(&tasks, &registry);
        }
        Commands::Task(command) => execute_task(command, &config).await?,
        Commands::Calendar(args) => {
            let now = chrono::Local::now();
            let month = args.target(YearMonth::of(now.date_naive()));
            Display::show_calendar(&now, month);
        }
        Commands::Modes => Display::show_modes(&config.build_registry()?),
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Executes a task subcommand against the task API.
async fn execute_task(command: TaskCommand, config: &AppConfig) -> Result<()> {
    let api = api_client(config);
    match command {
        TaskCommand::Add(args) => {
            let task = args.into_draft().build()?;
            api.add_task(&task).await?;
            println!("* Task added: {}", task.name);
        }
        TaskCommand::Done { id } => {
            api.set_completed(id, true).await?;
            println!("* Task {} completed", id);
        }
        TaskCommand::Undo { id } => {
            api.set_completed(id, false).await?;
            println!("* Task {} reopened", id);
        }
        TaskCommand::Rm { id } => {
            api.delete_task(id).await?;
            println!("* Task {} deleted", id);

            // A running daemon drops the selection if it pointed at this task.
            match IpcClient::new(config) {
                Ok(client) => {
                    if let Err(e) = client.without_retry().task_deleted(id).await {
                        debug!("Daemon not notified: {:#}", e);
                    }
                }
                Err(e) => debug!("Daemon not notified: {:#}", e),
            }
        }
    }
    Ok(())
}

/// Redraws the countdown every second until Ctrl-C.
async fn watch(client: IpcClient) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut stdout = std::io::stdout();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                let response = client.status().await?;
                if let Some(data) = &response.data {
                    // Clear the line before redrawing; titles vary in length.
                    write!(stdout, "\r\x1b[2K{}", Display::render_watch_line(data))?;
                    stdout.flush()?;
                }
            }
        }
    }
    writeln!(stdout)?;
    Ok(())
}

fn api_client(config: &AppConfig) -> ApiClient {
    ApiClient::new(config.api_base_url.clone(), config.request_timeout())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["pomodoro-board"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["pomodoro-board", "status"]);
        assert!(matches!(cli.command, Some(Commands::Status)));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["pomodoro-board", "--verbose", "status"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
