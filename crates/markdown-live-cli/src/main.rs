mod app;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_live_config::{Config, DefaultView};
use markdown_live_engine::{
    AutosaveOptions, EditorSession, FileStore, LocalAssetUploader, LocalAuth, SearchMode,
    SessionOptions, ViewMode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    env,
    fs::OpenOptions,
    io::stdout,
    path::{Path, PathBuf},
    process,
    time::{Duration, Instant},
};

use crate::app::App;

/// Longest time the loop sleeps waiting for input
const MAX_POLL: Duration = Duration::from_millis(250);

struct Args {
    user: Option<String>,
    file: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        user: env::var("MARKDOWN_LIVE_USER").ok(),
        file: None,
    };

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--user" | "-u" => match rest.next() {
                Some(user) => parsed.user = Some(user.clone()),
                None => usage_and_exit(&args[0]),
            },
            "--help" | "-h" => usage_and_exit(&args[0]),
            path if parsed.file.is_none() && !path.starts_with('-') => {
                parsed.file = Some(PathBuf::from(path));
            }
            _ => usage_and_exit(&args[0]),
        }
    }
    parsed
}

fn usage_and_exit(program: &str) -> ! {
    eprintln!("Usage: {program} [--user NAME] [file.md]");
    eprintln!("The user can also be set with MARKDOWN_LIVE_USER.");
    eprintln!("Settings are read from {}", Config::config_path().display());
    process::exit(1);
}

fn init_logging(storage_path: &Path) -> Result<()> {
    std::fs::create_dir_all(storage_path)?;
    let log_path = storage_path.join("markdown-live.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    // The terminal belongs to the UI, so logs go to a file
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn session_options(config: &Config) -> SessionOptions {
    SessionOptions {
        autosave: AutosaveOptions {
            debounce: config.autosave.debounce(),
            saved_display: config.autosave.saved_display(),
            default_title: config.autosave.default_title.clone(),
        },
        search_mode: if config.search.regex {
            SearchMode::Regex
        } else {
            SearchMode::Literal
        },
        line_height: config.search.line_height,
        view: match config.settings.default_view {
            DefaultView::Split => ViewMode::Split,
            DefaultView::Editor => ViewMode::Editor,
            DefaultView::Preview => ViewMode::Preview,
        },
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.storage_path) {
        eprintln!("Warning: logging disabled: {e:#}");
    }
    log::info!("markdown-live starting up!");
    log::info!("Storage path: {}", config.storage_path.display());

    let store = match FileStore::open(&config.storage_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!(
                "Error: Storage path '{}' is invalid: {e}",
                config.storage_path.display()
            );
            process::exit(1);
        }
    };

    let auth = match &args.user {
        Some(user) => match LocalAuth::signed_in(user) {
            Ok(auth) => auth,
            Err(e) => {
                eprintln!("Error: cannot sign in as {user:?}: {e}");
                process::exit(1);
            }
        },
        None => LocalAuth::new(),
    };

    let mut session = EditorSession::new(session_options(&config));
    if let Some(file) = &args.file {
        let result = session.import_file(file, Instant::now());
        if let Err(e) = result {
            eprintln!("Error: cannot open {}: {e}", file.display());
            process::exit(1);
        }
    }

    let uploader = LocalAssetUploader::new(&config.storage_path);
    let mut app = App::new(session, store, auth, uploader);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }
    log::info!("markdown-live shutting down");

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: std::error::Error + Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let now = Instant::now();
        let timeout = app
            .session
            .autosave()
            .next_deadline()
            .map_or(MAX_POLL, |deadline| {
                deadline.saturating_duration_since(now).min(MAX_POLL)
            });

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key, Instant::now());
        }

        app.tick(Instant::now());
        if app.should_quit {
            app.flush_pending(Instant::now());
            return Ok(());
        }
    }
}
