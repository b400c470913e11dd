//! pokedex-tui, a random Pokémon every few seconds, in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌────────────┐ FetchFuture ┌──────────────┐  AppMsg   ┌──────────┐  draw()  ┌──────────┐
//! │  source/   │ ──────────► │ tokio::spawn │ ────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (sampling) │             │  (HTTP I/O)  │ (channel) │ (state)  │          │ (render) │
//! └────────────┘             └──────────────┘           └──────────┘          └──────────┘
//!                                                             ▲
//!                                   timers (refresh.rs) ──────┤ handle_key_event()
//!                                                        ┌──────────┐
//!                                                        │ input.rs │
//!                                                        └──────────┘
//! ```
//!
//! * **`source/`**: the `ItemSource` trait, the catalog item type, id
//!   sampling and the PokeAPI fetcher.
//! * **`refresh`**: the refresh controller (result list, loading state,
//!   elapsed clock), timers and fetch spawning.
//! * **`app`**: view state on top of the controller (selection, status).
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` mutations.
//! * **`config`** / **`logging`**: command line and log file setup.
//! * **`main`**: wires everything together and runs the event loop.
//!
//! All state is owned by the event loop task; spawned fetches only report
//! back through the channel.

mod app;
mod config;
mod input;
mod logging;
mod refresh;
mod source;
mod ui;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

use app::App;
use config::Config;
use refresh::{AppMsg, RefreshController, CLOCK_INTERVAL};
use source::{IdSampler, ItemSource, RandomItemFetcher};

const CHANNEL_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    /// Start the key reader.  Taking `&self` means raw mode is already on
    /// when the first `event::read()` runs.
    fn spawn_input(&self, tx: mpsc::Sender<AppMsg>) {
        input::spawn_reader(tx);
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // -- configuration and logging -------------------------------------------
    let config = Config::parse();
    config.validate().context("invalid configuration")?;
    let log_path = config.log_path();
    let _log_guard = logging::init(&log_path)
        .with_context(|| format!("failed to set up logging at {}", log_path.display()))?;
    info!(?config, "starting pokedex-tui");

    install_panic_hook();

    // -- item source ---------------------------------------------------------
    let mut source = RandomItemFetcher::new(&config.base_url, IdSampler::new(config.id_range()));

    // -- terminal setup (RAII, Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;

    // -- channels and input --------------------------------------------------
    let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
    guard.spawn_input(tx.clone());

    let mut app = App::new(RefreshController::new(config.overlap));
    let mut failures = config.show_errors.then(|| app.controller.subscribe_errors());

    let mut clock = refresh::every(CLOCK_INTERVAL);
    let mut auto_refresh = refresh::every(config.refresh_period());

    // -- main event loop -----------------------------------------------------
    // Each iteration:
    //   1. Render the UI.
    //   2. Wait for a message, the clock or the auto-refresh timer.
    //   3. Spawn any fetches the controller approved.
    //   4. Surface failures if requested.
    loop {
        // 1. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 2. Wait for the next event
        tokio::select! {
            Some(msg) = rx.recv() => match msg {
                AppMsg::Key(key) => input::handle_key_event(&mut app, key),
                AppMsg::Fetched { origin, result } => app.handle_fetched(origin, result),
            },
            _ = clock.tick() => app.controller.on_clock_tick(),
            _ = auto_refresh.tick() => app.auto_refresh(),
        }

        // 3. Start approved fetches
        for origin in app.take_pending() {
            refresh::spawn_fetch(&mut source, origin, tx.clone());
        }

        // 4. Error channel
        if let Some(rx) = failures.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(failure) => app.show_failure(&failure),
                    Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
        }

        if app.quit {
            break;
        }
    }

    info!(
        items = app.item_count(),
        requested = source.sampler().requested().len(),
        source = source.name(),
        "shutting down"
    );
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
