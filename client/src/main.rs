//! Taskdeck - Kanban task board client.
//!
//! This binary manages tasks on a remote task API, either one command at a
//! time or through the interactive board.
//!
//! # Commands
//!
//! - `taskdeck register` / `login` / `logout` / `whoami`: Session management
//! - `taskdeck list`: Print the board, optionally filtered and searched
//! - `taskdeck add` / `edit` / `status` / `toggle` / `delete`: Task changes
//! - `taskdeck board`: Open the interactive board
//!
//! # Environment Variables
//!
//! See the [`config`](taskdeck_client::config) module for available
//! configuration options.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use taskdeck_client::config::Config;
use taskdeck_client::types::{Column, NewTask, Priority, Task, TaskPatch, TaskStatus};
use taskdeck_client::view::StatusFilter;
use taskdeck_client::{tui, ApiClient, Board, FileTokenStore};

/// Taskdeck - Kanban task board client.
///
/// Signs in to a remote task API and shows your tasks in three columns:
/// To Do, In Progress and Done.
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    TASKDECK_API_URL               API base URL (required unless --api-url is given)
    TASKDECK_DATA_DIR              Session and log directory (default: ~/.taskdeck)
    TASKDECK_REQUEST_TIMEOUT_SECS  Per-request timeout in seconds (default: none)
    RUST_LOG                       Log filter, overrides -v

EXAMPLES:
    # Create an account and sign in
    export TASKDECK_API_URL=http://localhost:5000/api
    taskdeck register --name Ada --email ada@example.com

    # Add a task and move it along
    taskdeck add \"Write report\" --priority high --due 2026-11-01
    taskdeck status <ID> in-progress

    # Show only unfinished tasks mentioning milk
    taskdeck list --status todo --search milk

    # Open the interactive board
    taskdeck board
")]
struct Cli {
    /// API base URL, overriding TASKDECK_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in with it.
    Register {
        /// Display name.
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: String,

        /// Password (at least 6 characters). Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: String,

        /// Password. Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored session.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Print the board.
    List {
        /// Only show tasks with this status (all, todo, in-progress, done).
        #[arg(long, default_value = "all", value_parser = parse_filter)]
        status: StatusFilter,

        /// Only show tasks whose title or description contains this text.
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Create a task in the To Do column.
    Add {
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// low, medium or high.
        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,

        /// Due date as YYYY-MM-DD.
        #[arg(long, value_parser = parse_due_date)]
        due: Option<String>,
    },

    /// Change fields of a task.
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,

        #[arg(long, value_parser = parse_due_date)]
        due: Option<String>,
    },

    /// Move a task to another column (todo, in-progress, done).
    Status {
        id: String,

        #[arg(value_parser = parse_status)]
        status: TaskStatus,
    },

    /// Mark a task done, or back to todo if it already is.
    Toggle { id: String },

    /// Delete a task.
    Delete { id: String },

    /// Open the interactive board.
    Board,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env_with_api_url(cli.api_url.clone())
        .context("Failed to load configuration")?;

    match cli.command {
        Command::Board => init_file_logging(&config)?,
        _ => init_logging(cli.verbose),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(run(cli.command, config))
}

async fn run(command: Command, config: Config) -> Result<()> {
    let mut board = new_board(&config)?;

    match command {
        Command::Register {
            name,
            email,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let user = board
                .register(name.as_deref(), &email, &password)
                .await?;
            println!("Signed in as {} <{}>", user.display_name(), user.email);
        }
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let user = board.login(&email, &password).await?;
            println!("Signed in as {} <{}>", user.display_name(), user.email);
        }
        Command::Logout => {
            board.logout()?;
            println!("Signed out");
        }
        Command::Whoami => {
            require_session(&mut board).await?;
            if let Some(user) = board.user() {
                println!("{} <{}>", user.display_name(), user.email);
            }
        }
        Command::List { status, search } => {
            require_session(&mut board).await?;
            board.set_filter(status);
            board.set_search(search);
            print_board(&board);
        }
        Command::Add {
            title,
            description,
            priority,
            due,
        } => {
            require_session(&mut board).await?;
            let task = board
                .create_task(NewTask {
                    title,
                    description,
                    priority,
                    due_date: due,
                })
                .await?;
            println!("Added {}", format_task(&task));
        }
        Command::Edit {
            id,
            title,
            description,
            priority,
            due,
        } => {
            let patch = TaskPatch {
                title,
                description,
                priority,
                due_date: due,
                ..TaskPatch::default()
            };
            if patch.is_empty() {
                bail!("Nothing to change. Pass at least one of --title, --description, --priority, --due");
            }
            require_session(&mut board).await?;
            let task = board.update_task(&id, patch).await?;
            println!("Updated {}", format_task(&task));
        }
        Command::Status { id, status } => {
            require_session(&mut board).await?;
            let task = board.set_status(&id, status).await?;
            println!("Moved to {}: {}", task.column().title(), format_task(&task));
        }
        Command::Toggle { id } => {
            require_session(&mut board).await?;
            let task = board.toggle_complete(&id).await?;
            println!("{}", format_task(&task));
        }
        Command::Delete { id } => {
            require_session(&mut board).await?;
            board.delete_task(&id).await?;
            println!("Deleted {id}");
        }
        Command::Board => {
            tui::run(board).await?;
        }
    }

    Ok(())
}

/// Builds a board backed by the token file in the data directory.
fn new_board(config: &Config) -> Result<Board> {
    let tokens = Arc::new(FileTokenStore::new(&config.data_dir));
    let client = ApiClient::with_timeout(&config.api_url, tokens, config.request_timeout)
        .context("Invalid API URL")?;
    Ok(Board::new(client))
}

/// Restores the stored session and loads the task list.
async fn require_session(board: &mut Board) -> Result<()> {
    if !board.restore_session().await {
        bail!("Not signed in. Run `taskdeck login` first.");
    }
    if let Some(error) = board.error() {
        bail!("{error}");
    }
    Ok(())
}

/// Returns the password from the flag, or reads one line from stdin.
fn password_or_prompt(password: Option<String>) -> Result<Zeroizing<String>> {
    if let Some(password) = password {
        return Ok(Zeroizing::new(password));
    }

    eprint!("Password: ");
    io::stderr().flush()?;

    let mut input = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read password")?;
    let trimmed = input.trim_end_matches(['\r', '\n']).len();
    input.truncate(trimmed);
    Ok(input)
}

fn print_board(board: &Board) {
    let view = board.view();
    for column in Column::ALL {
        let tasks = view.grouped.column(column);
        println!("{} ({})", column.title(), tasks.len());
        for task in tasks {
            println!("  {}", format_task(task));
        }
        println!();
    }
}

fn format_task(task: &Task) -> String {
    let checkbox = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{checkbox} {}  {}  ({}", task.id, task.title, task.priority);
    if let Some(due) = task.due_date.as_deref() {
        line.push_str(", due ");
        line.push_str(due.split('T').next().unwrap_or(due));
    }
    line.push(')');
    line
}

fn parse_filter(s: &str) -> Result<StatusFilter, String> {
    StatusFilter::parse(s).ok_or_else(|| format!("expected all, todo, in-progress or done, got '{s}'"))
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(s).ok_or_else(|| format!("expected todo, in-progress or done, got '{s}'"))
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("expected low, medium or high, got '{s}'"))
}

fn parse_due_date(s: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("expected a date as YYYY-MM-DD, got '{s}'"))
}

/// Initializes stderr logging for one-shot commands.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .init();
}

/// Initializes logging to a file, since the board owns the terminal.
fn init_file_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            config.data_dir.display()
        )
    })?;
    let log_path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
