mod app;
mod artwork;
mod config;
mod fetch;
mod models;
mod observe;
mod ui;
mod utils;
mod view;

use clap::Parser;
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::error::Error;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app::App;
use crate::config::Cli;
use crate::fetch::CatalogClient;
use crate::observe::{FetchObserver, LogObserver, NoopObserver};
use crate::ui::draw_ui;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let logging = init_logging(cli.log_file.as_deref(), cli.fetch_only)?;

    let observer: Arc<dyn FetchObserver> = if logging {
        Arc::new(LogObserver)
    } else {
        Arc::new(NoopObserver)
    };
    let client = CatalogClient::new(&cli.base_url)
        .with_limit(cli.limit)
        .with_observer(observer);

    // Headless mode: print the list and exit.
    if cli.fetch_only {
        let entries = client.fetch_entry_list().await?;
        for e in &entries {
            println!("{}\t{}", e.name, e.url);
        }
        eprintln!("{} entries from {}", entries.len(), client.list_address());
        return Ok(());
    }

    let mut app = App::new(client, cli.sprite_host, !cli.no_images);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(LeaveAlternateScreen)?;
    result
}

/// Logs go to `path` when given. Without one the TUI runs with logging off,
/// and fetch-only mode logs to stderr. Returns whether a logger is installed.
fn init_logging(path: Option<&Path>, fetch_only: bool) -> Result<bool, Box<dyn Error>> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if fetch_only => {
            builder.target(env_logger::Target::Stderr);
        }
        None => return Ok(false),
    }
    builder.init();
    Ok(true)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    app.start();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        // pick up whatever the fetch tasks finished since the last frame
        app.drain_messages();
        draw_ui(terminal, app)?;

        if app.should_quit {
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick = app.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }
}
