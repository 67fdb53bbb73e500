//! TUI Runner - main loop that owns the terminal
//!
//! The TuiRunner is responsible for:
//! - Dispatching terminal events to the App
//! - Spawning breakdown requests as background tasks
//! - Feeding their results back to the controller

use std::time::Duration;

use eyre::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::views;
use crate::config::LlmConfig;
use crate::controller::DecomposeTicket;
use crate::decompose::{DecomposeOutcome, Decomposer};

/// Result sent back by a breakdown task
type DecomposeResult = (DecomposeTicket, DecomposeOutcome);

/// What woke the main loop
enum Step {
    Event(Event),
    Decomposed(DecomposeResult),
}

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    app: App,
    terminal: Tui,
    event_handler: EventHandler,
    /// Provider settings; a client is built per request so a missing key
    /// only fails that request
    llm_config: LlmConfig,
    decompose_rx: Option<mpsc::Receiver<DecomposeResult>>,
    decompose_task: Option<JoinHandle<()>>,
}

impl TuiRunner {
    pub fn new(terminal: Tui, app: App, llm_config: LlmConfig, tick_rate: Duration) -> Self {
        debug!(?tick_rate, "TuiRunner::new: called");
        Self {
            app,
            terminal,
            event_handler: EventHandler::new(tick_rate),
            llm_config,
            decompose_rx: None,
            decompose_task: None,
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: entering main loop");
        loop {
            self.terminal.draw(|frame| views::render(self.app.state(), frame))?;

            let step = {
                let events = &mut self.event_handler;
                let decompose_rx = &mut self.decompose_rx;
                tokio::select! {
                    event = events.next() => Step::Event(event?),
                    Some(result) = async move {
                        match decompose_rx {
                            Some(rx) => rx.recv().await,
                            None => std::future::pending::<Option<DecomposeResult>>().await,
                        }
                    } => Step::Decomposed(result),
                }
            };

            match step {
                Step::Event(Event::Tick) => self.app.state_mut().tick(),
                Step::Event(Event::Key(key_event)) => {
                    if self.app.handle_key(key_event) {
                        break;
                    }
                }
                Step::Event(Event::Resize(width, height)) => {
                    debug!(width, height, "TuiRunner::run: resize");
                }
                Step::Decomposed((ticket, outcome)) => self.handle_decompose_result(ticket, outcome),
            }

            if let Some(ticket) = self.app.state_mut().pending_decompose.take() {
                self.start_decompose(ticket);
            }

            // Esc drops the in-flight ticket; stop the request with it
            if !self.app.state().controller.is_loading() {
                self.abort_decompose();
            }

            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        self.abort_decompose();
        debug!("TuiRunner::run: exiting");
        Ok(())
    }

    /// Spawn a background breakdown for `ticket`
    fn start_decompose(&mut self, ticket: DecomposeTicket) {
        debug!(generation = ticket.generation, "TuiRunner::start_decompose: called");
        self.abort_decompose();

        let (result_tx, result_rx) = mpsc::channel::<DecomposeResult>(1);
        self.decompose_rx = Some(result_rx);

        let llm_config = self.llm_config.clone();
        info!(provider = %llm_config.provider, "Spawning breakdown request");
        self.decompose_task = Some(tokio::spawn(async move {
            let outcome = match Decomposer::from_config(&llm_config) {
                Ok(decomposer) => decomposer.try_decompose(&ticket.text).await,
                Err(e) => DecomposeOutcome::Failed(e.into()),
            };
            let _ = result_tx.send((ticket, outcome)).await;
        }));
    }

    fn handle_decompose_result(&mut self, ticket: DecomposeTicket, outcome: DecomposeOutcome) {
        debug!(generation = ticket.generation, "TuiRunner::handle_decompose_result: called");
        self.decompose_rx = None;
        self.decompose_task = None;
        self.app.state_mut().controller.finish_decompose(&ticket, outcome);
    }

    fn abort_decompose(&mut self) {
        if let Some(task) = self.decompose_task.take() {
            debug!("TuiRunner::abort_decompose: aborting background request");
            task.abort();
        }
        self.decompose_rx = None;
    }
}
