use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use kanban_client::render::{render_board, render_card, ColumnBody};
use kanban_client::ui::{run_app, App};
use kanban_client::{ClientConfig, Controller, HttpTaskApi, TaskApi, TaskId};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Kanban board client for the tasks REST API.
#[derive(Parser)]
#[command(name = "kanban", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root URL of the API; overrides the config file.
    #[arg(long)]
    base_url: Option<String>,

    /// Directory for the log file written while the board is open.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive board (default).
    Board,

    /// Print every column and exit.
    List,

    /// Print a single task.
    Show { id: TaskId },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(ClientConfig::default_config_path);
    let mut config = ClientConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(log_dir) = cli.log_dir {
        config.log_dir = Some(log_dir);
    }
    config.validate()?;

    let api = HttpTaskApi::new(&config)?;

    match cli.command.unwrap_or(Command::Board) {
        Command::Board => {
            let _guard = init_file_logging(&config.resolved_log_dir())?;
            tracing::info!(base_url = %config.base_url, "opening board");
            run_board(Controller::new(api, config.toast_duration())).await
        }
        Command::List => {
            init_stderr_logging();
            print_board(&api).await
        }
        Command::Show { id } => {
            init_stderr_logging();
            print_task(&api, id).await
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kanban_client=info,kanban=info"))
}

// The board owns the terminal, so its logs go to a file instead.
fn init_file_logging(dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, "kanban-client.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

async fn run_board<A: TaskApi>(controller: Controller<A>) -> anyhow::Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller);
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "board exited with an error");
    }
    Ok(result?)
}

async fn print_board(api: &HttpTaskApi) -> anyhow::Result<()> {
    let tasks = api.list_tasks().await.context("Failed to load tasks")?;
    let view = render_board(&tasks, Utc::now());

    for column in &view.columns {
        println!("{} ({})", column.heading, column.count);
        match &column.body {
            ColumnBody::Empty(placeholder) => println!("  {placeholder}"),
            ColumnBody::Cards(cards) => {
                for card in cards {
                    println!("  [#{}] {} ({})", card.id, card.title, card.created);
                    for line in &card.description {
                        println!("        {line}");
                    }
                }
            }
        }
        println!();
    }
    Ok(())
}

async fn print_task(api: &HttpTaskApi, id: TaskId) -> anyhow::Result<()> {
    let task = api
        .get_task(id)
        .await
        .with_context(|| format!("Failed to load task {id}"))?;
    let card = render_card(&task, Utc::now());

    println!("[#{}] {}", card.id, card.title);
    println!("status:  {}", task.status.heading());
    println!(
        "created: {} ({})",
        task.created_at.format("%Y-%m-%d %H:%M"),
        card.created
    );
    if let Some(updated) = task.updated_at {
        println!("updated: {}", updated.format("%Y-%m-%d %H:%M"));
    }
    for line in &card.description {
        println!("  {line}");
    }
    Ok(())
}
