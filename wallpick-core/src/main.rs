//! src/main.rs
//! Interactive wallpaper picker: live incremental search, then an optional
//! line-based edit mode.

use std::{
    io::{self, BufRead, Stdout, Write},
    panic::PanicHookInfo,
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tracing::{error, info, warn};

use wallpick_core::{
    AppError, Logger,
    config::Config,
    controller::{EventLoop, LoopOutcome},
    external::{
        ActiveItemStore, Externals,
        assets::FfmpegAssetCreator,
        clipboard::SystemClipboard,
        process::ShellProcessController,
        prop_config::{PropConfig, user_homes},
    },
    input::{input_channel, spawn_reader, spawn_signal_listener},
    model::{Catalog, Favorites, History, Session, history::SyncOutcome},
    prompt::{EditMode, EditSettings},
    view::ui,
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

const STOPPED_MESSAGE: &str = "Program stopped.";

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    setup_panic_handler();

    let config = Config::load().await.unwrap_or_else(|e| {
        eprintln!("[WARNING] Failed to load config, using defaults: {e}");
        Config::default()
    });
    config.validate().context("Invalid configuration")?;

    if config.require_elevated && !is_elevated() {
        println!("Please run this script as root.");
        return Ok(());
    }

    let _log_guard = Logger::init_tracing(&config.logging).context("Failed to initialize logging")?;
    info!("Starting wallpaper picker");

    let Some(monitor) = prompt_monitor().context("Failed to read the monitor index")? else {
        println!("\n{STOPPED_MESSAGE}");
        return Ok(());
    };

    let run_as = std::env::var("SUDO_USER").ok().filter(|u| !u.is_empty());
    let home = user_home(run_as.as_deref());

    let catalog = Catalog::scan(&config.catalog_dir).context("Failed to read the wallpaper catalog")?;
    info!("Catalog holds {} wallpapers", catalog.len());

    let prop = PropConfig::locate(&config.prop_file_prefix, &monitor, &user_homes(), &home);
    let active = prop.active_name().unwrap_or_else(|e| {
        warn!("Could not read the active wallpaper: {}", e);
        None
    });

    let history = History::open(config.history_path(), config.max_recent_history)
        .context("Failed to open the history list")?;
    let synced = match history.sync_on_startup(active.as_deref(), &catalog) {
        Ok(outcome) => {
            info!("History sync: {:?}", outcome);
            Some(outcome)
        }
        Err(e) => {
            warn!("History sync failed: {}", e);
            None
        }
    };

    let (favorites, problems) = Favorites::load(config.favorites_path(), &catalog)
        .context("Failed to load the favorites list")?;

    let mut session = Session::new(catalog, favorites, history, active);
    for problem in &problems {
        warn!("{}", problem);
    }
    if let Some(SyncOutcome::Appended(name)) = synced {
        session.show_info(format!("Added '{name}' to history"));
    }
    if let Some(problem) = problems.first() {
        session.show_warning(format!("{problem}. Consider updating the favorites file."));
    }

    let externals = Externals {
        process: Box::new(
            ShellProcessController::new(&config.app_binary, prop.dir(), &config.prop_file_prefix)
                .with_run_as(run_as.clone()),
        ),
        store: Box::new(prop),
        assets: Box::new(FfmpegAssetCreator::new(&config.catalog_dir)),
        clipboard: Box::new(SystemClipboard::new(run_as)),
    };

    // let the Enter that answered the monitor prompt drain
    tokio::time::sleep(config.startup_delay).await;

    let mut event_loop = EventLoop::new(session, externals);
    let outcome = run_live(&mut event_loop).await?;

    match outcome {
        LoopOutcome::Interrupted => println!("{STOPPED_MESSAGE}"),
        LoopOutcome::InputClosed => info!("Input closed, exiting"),
        LoopOutcome::EnterEditMode => {
            let (mut session, externals) = event_loop.into_parts();
            let settings = EditSettings {
                to_edit_path: config.to_edit_path(),
                backups_dir: config.backups_dir.clone(),
                home,
            };
            run_edit_mode(&mut session, &externals, settings)?;
        }
    }

    info!("Application exited cleanly");
    Ok(())
}

/// Owns the terminal while the live view is up. Dropping it restores the
/// normal screen.
struct TerminalGuard {
    terminal: AppTerminal,
    active: bool,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;
        info!("Terminal setup complete");
        Ok(Self {
            terminal,
            active: true,
        })
    }

    fn draw(&mut self, session: &Session) -> Result<(), AppError> {
        self.terminal
            .draw(|frame: &mut Frame<'_>| ui::render(frame, session))
            .map_err(|e| AppError::Terminal(e.to_string()))?;
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show)
            .context("Failed to leave alternate screen")?;

        info!("Terminal cleanup complete");
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

async fn run_live(event_loop: &mut EventLoop) -> Result<LoopOutcome> {
    let mut terminal = TerminalGuard::enter()?;

    let (tx, mut rx) = input_channel();
    let reader = spawn_reader(tx.clone());
    let signals = spawn_signal_listener(tx);

    let outcome = event_loop
        .run(&mut rx, |session| terminal.draw(session))
        .await;

    // edit mode reads stdin line by line, so the key reader must be gone
    reader.abort();
    signals.abort();
    terminal.restore()?;

    outcome.context("Live mode failed")
}

fn run_edit_mode(session: &mut Session, externals: &Externals, settings: EditSettings) -> Result<()> {
    // the blocking read below cannot observe the input queue
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{STOPPED_MESSAGE}");
            std::process::exit(130);
        }
    });

    let stdin = io::stdin();
    let mut edit = EditMode::new(stdin.lock(), io::stdout(), session, externals, settings);
    match edit.run() {
        Ok(()) => Ok(()),
        Err(AppError::Cancelled) => {
            info!("Edit mode cancelled");
            Ok(())
        }
        Err(e) if e.is_fatal() => {
            error!("Edit mode failed: {}", e);
            Err(e).context("Edit mode failed")
        }
        Err(e) => {
            warn!("Edit command failed: {}", e);
            eprintln!("[ERROR] {e}");
            Ok(())
        }
    }
}

/// `None` when stdin closes before an answer arrives.
fn prompt_monitor() -> Result<Option<String>> {
    let mut out = io::stdout();
    writeln!(out, "Which monitor? (index, e.g. 0)")?;
    write!(out, "> ")?;
    out.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let monitor = line.trim().to_string();
    if monitor.is_empty() {
        bail!("A monitor index is required");
    }
    Ok(Some(monitor))
}

/// Home of the invoking user, even under sudo.
fn user_home(run_as: Option<&str>) -> PathBuf {
    if let Some(user) = run_as.filter(|_| cfg!(unix)) {
        return PathBuf::from("/home").join(user);
    }

    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(unix)]
fn is_elevated() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_elevated() -> bool {
    true
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen, Show);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
