//! Interactive Kanban board in the terminal.
//!
//! Built with [`ratatui`] on a crossterm backend:
//!
//! - [`app`]: Board state, key bindings, theme and the terminal event loop
//! - [`ui`]: Screen composition
//! - [`terminal`]: Raw mode setup and restoration, including on panic
//! - [`widgets`]: Columns, header, login form and status line
//!
//! ```ignore
//! use taskdeck_client::{tui, ApiClient, Board};
//!
//! let board = Board::new(client);
//! tui::run(board).await?;
//! ```

pub mod app;
pub mod terminal;
pub mod ui;
pub mod widgets;

pub use app::{Action, BoardApp, EventHandler, InputMode, Theme, TuiEvent};
pub use terminal::{install_panic_hook, Tui};

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::board::Board;
use crate::error::{Result, TuiError};

/// Capacity of the terminal event channel.
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Runs the interactive board until the user quits.
///
/// The stored session is restored first; without one the login screen is
/// shown. Remote failures are displayed in the status line rather than
/// returned.
///
/// # Errors
///
/// Returns an error if the terminal cannot be initialized, drawn to, or
/// restored.
pub async fn run(board: Board) -> Result<()> {
    install_panic_hook();
    let mut tui = Tui::new().map_err(TuiError::TerminalInit)?;
    let mut app = BoardApp::new(board, Theme::from_env());

    app.busy = Some("Restoring session...");
    tui.draw(|frame| ui::render(frame, &app))
        .map_err(TuiError::Render)?;
    app.board.restore_session().await;
    app.busy = None;

    let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let event_task = tokio::spawn(EventHandler::new(event_tx, shutdown_rx).run());

    while !app.should_quit() {
        tui.draw(|frame| ui::render(frame, &app))
            .map_err(TuiError::Render)?;

        // The handler only drops its sender when terminal polling fails
        let Some(event) = event_rx.recv().await else {
            return Err(TuiError::Event("terminal event stream ended".to_string()).into());
        };

        match event {
            TuiEvent::Key(key) => {
                if let Some(action) = app.on_key(key) {
                    app.busy = Some(action.progress_label());
                    tui.draw(|frame| ui::render(frame, &app))
                        .map_err(TuiError::Render)?;
                    app.perform(action).await;
                    app.busy = None;
                }
            }
            TuiEvent::Tick | TuiEvent::Resize(..) => {}
        }
    }

    let _ = shutdown_tx.send(());
    match event_task.await {
        Ok(Err(e)) => warn!(error = %e, "Terminal event loop failed"),
        Err(e) => warn!(error = %e, "Terminal event task panicked"),
        Ok(Ok(())) => {}
    }

    tui.restore().map_err(TuiError::Render)?;
    Ok(())
}
