use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod agent;
mod app;
mod config;
mod handler;
mod report;
mod session;
mod tui;
mod ui;

use agent::AgentClient;
use app::App;
use config::Config;
use session::SessionToken;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "titan")]
#[command(about = "Terminal console for the TITAN financial-analysis agent")]
struct Cli {
    /// Backend base URL (overrides TITAN_BASE_URL and the config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Pin an explicit backend thread id instead of the stored session token
    #[arg(long)]
    thread: Option<String>,
}

/// Logs go to a file under the data directory; the terminal itself belongs
/// to the TUI. Logging being unavailable is not an error worth dying for.
fn init_logging() {
    let Some(data_dir) = dirs::data_dir() else {
        return;
    };
    let log_dir = data_dir.join("titan-console");
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("console.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("could not load config, using defaults: {e:#}");
        Config::default()
    });
    let base_url = config::resolve_base_url(cli.base_url, &config);
    let agent = AgentClient::new(&base_url);

    let thread_id = match cli.thread {
        Some(thread) => thread,
        None => {
            let state_dir = session::state_dir()?;
            SessionToken::load_or_create(&state_dir).as_str().to_string()
        }
    };

    tracing::info!(base_url = agent.base_url(), %thread_id, "starting console");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(agent, thread_id);

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event);
        }

        // Settle the in-flight agent request, if any; ticks guarantee this
        // runs shortly after the task completes.
        app.poll_agent().await;
    }
    Ok(())
}
