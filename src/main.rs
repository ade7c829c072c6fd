use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use miette::{miette, IntoDiagnostic};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use cliptui::api::{HistoryApi, HttpHistoryClient};
use cliptui::config::AppConfig;
use cliptui::core::logging;
use cliptui::tui::app::AppState;
use cliptui::tui::services::Services;

/// Terminal browser for a clipboard-history server.
#[derive(Debug, Parser)]
#[command(name = "cliptui", version, about)]
struct Cli {
    /// Server base URL (overrides the config file).
    #[arg(long, env = "CLIPTUI_SERVER")]
    server: Option<String>,

    /// Username for automatic login.
    #[arg(long, env = "CLIPTUI_USERNAME")]
    username: Option<String>,

    /// Password for automatic login.
    #[arg(long, env = "CLIPTUI_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Path to an alternative config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial page size.
    #[arg(long)]
    page_size: Option<u32>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check server health and the session, then print record stats.
    Status,
}

impl Cli {
    fn resolve_config(&self) -> AppConfig {
        let mut config = match self.config {
            Some(ref path) => AppConfig::load_from(path),
            None => AppConfig::load(),
        };
        if let Some(ref server) = self.server {
            config.server.base_url = server.clone();
        }
        if let Some(ref username) = self.username {
            config.server.username = Some(username.clone());
        }
        if let Some(ref password) = self.password {
            config.server.password = Some(password.clone());
        }
        if let Some(page_size) = self.page_size {
            config.list.page_size = page_size;
        }
        config.validated()
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Status) => {
            let _log_guard = logging::init_cli();
            let config = cli.resolve_config();
            status(&config).await
        }
        None => {
            let _log_guard = logging::init_tui();
            log::info!("{} v{} starting", cliptui::NAME, cliptui::VERSION);
            let config = cli.resolve_config();
            run_tui(config).await
        }
    }
}

fn build_client(config: &AppConfig) -> miette::Result<HttpHistoryClient> {
    HttpHistoryClient::new(
        &config.server.base_url,
        Duration::from_secs(config.server.request_timeout_secs),
    )
    .into_diagnostic()
}

async fn status(config: &AppConfig) -> miette::Result<()> {
    let client = build_client(config)?;

    let health = client.health().await.into_diagnostic()?;
    println!("Server:  {} ({})", client.base_url(), health.status);

    if let (Some(username), Some(password)) = (&config.server.username, &config.server.password) {
        client
            .login(cliptui::api::Credentials {
                username: username.clone(),
                password: password.clone(),
            })
            .await
            .into_diagnostic()?;
    }

    let auth = client.check_auth().await.into_diagnostic()?;
    if !auth.authenticated {
        return Err(miette!("Not logged in (pass --username and --password)"));
    }
    println!("User:    {}", auth.username.as_deref().unwrap_or("-"));

    let stats = client.stats().await.into_diagnostic()?;
    println!("Records: {}", stats.total_records);
    for (kind, count) in &stats.by_type {
        println!("  {kind:<8} {count}");
    }
    if let Some(ref latest) = stats.latest_sync {
        println!("Latest:  {latest}");
    }
    Ok(())
}

async fn run_tui(config: AppConfig) -> miette::Result<()> {
    let client = build_client(&config)?;
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let services = Services::new(Arc::new(client), event_tx, config.download_dir());
    let mut app = AppState::new(&config, event_rx, services);

    // Setup terminal
    enable_raw_mode().into_diagnostic()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).into_diagnostic()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).into_diagnostic()?;

    let result = app
        .run(
            &mut terminal,
            Duration::from_millis(config.tui.tick_rate_ms),
            Duration::from_millis(config.list.poll_interval_ms),
        )
        .await;

    // Restore terminal
    disable_raw_mode().into_diagnostic()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).into_diagnostic()?;
    terminal.show_cursor().into_diagnostic()?;

    log::info!("{} exiting", cliptui::NAME);
    result.into_diagnostic()
}
