//! Terminal User Interface for ZenDo
//!
//! A single screen with:
//! - Stats header and progress gauge
//! - Draft line with priority selector and AI breakdown
//! - Filter tabs and the task list
//! - Review modal for suggested subtasks

mod app;
mod events;
mod runner;
pub mod state;
mod views;

pub use app::App;
pub use events::{Event, EventHandler};
pub use runner::TuiRunner;
pub use state::{AppState, InteractionMode};

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use crate::config::Config;
use crate::controller::Controller;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the TUI over `controller` until the user quits
pub async fn run(controller: Controller, config: &Config) -> Result<()> {
    info!(storage = %controller.storage_description(), "Starting TUI");
    let terminal = init()?;

    // Use a guard to ensure terminal is restored even on early return/error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let mut state = AppState::new(controller).with_date_format(config.ui.date_format.clone());
    state.controller.set_draft_priority(config.ui.default_priority);

    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms.max(10));
    let mut runner = TuiRunner::new(terminal, App::new(state), config.llm.clone(), tick_rate);
    runner.run().await
}
