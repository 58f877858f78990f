//! latest-post-stats: a terminal card for a site's latest published post.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌────────────┐ CompletionEvent ┌──────────┐  draw()  ┌──────────┐
//! │ service.rs │ ──────────────► │  app.rs  │ ───────► │  ui.rs   │
//! │  (thread)  │    (channel)    │ (state)  │          │ (render) │
//! └────────────┘                 └──────────┘          └──────────┘
//!       ▲    request_sections()       │  ▲
//!       └─────────────────────────────┘  │ handle_key_event()
//!                                   ┌──────────┐
//!                                   │ input.rs │
//!                                   └──────────┘
//! ```
//!
//! * **`source/`**: the `StatsSource` trait, the REST implementation, and
//!   the latest-post model.
//! * **`service`**: background worker that fetches sections and publishes
//!   completion events.
//! * **`orchestrator`**: the latest-post card: filters events, decides when
//!   the follow-up views fetch is needed, and produces the view state.
//! * **`app`**: owns the card and fans bus events out to consumers.
//! * **`ui`** / **`input`**: rendering and key bindings.
//! * **`main`**: wires everything together: parse config, set up logging and
//!   the terminal, and run the event loop.

mod app;
mod config;
mod error;
mod format;
mod input;
mod logging;
mod orchestrator;
mod section;
mod service;
mod source;
mod store;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::App;
use config::Config;
use service::FetchService;
use source::RestSource;

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
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
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the panic message is printed.
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

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    let _log_guard = logging::init(&config.log_file, config.log_level)?;
    info!(site = %config.site, "starting latest-post-stats");

    install_panic_hook();

    // -- fetch service -------------------------------------------------------
    let source = RestSource::new(config.api_base_url()?, &config.site, config.token.clone())
        .context("failed to build REST client")?;
    let (service, events) = FetchService::spawn(Arc::new(source))?;

    // -- terminal setup (RAII, Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(service.clone());

    let refresh_interval = config.refresh_interval();
    let tick_rate = Duration::from_millis(100);

    // -- main event loop -----------------------------------------------------
    // Each tick: refresh if due, drain completion events, render, then wait
    // up to tick_rate for a key.
    loop {
        let now = Instant::now();
        if app.refresh_due(now, refresh_interval) {
            app.refresh(now);
        }

        while let Ok(completion) = events.try_recv() {
            app.handle_event(&completion);
        }

        guard.terminal.draw(|f| ui::draw(&app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key, Instant::now());
            }
        }

        if app.quit {
            break;
        }
    }

    service.shutdown();
    info!("latest-post-stats stopped");
    Ok(())
}
