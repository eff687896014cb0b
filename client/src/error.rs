//! Error types for the Taskdeck client.
//!
//! Each module owns its error enum; [`ClientError`] gathers them for callers
//! that drive several modules at once, such as the board controller.

use thiserror::Error;

use crate::api::ApiError;
use crate::session::SessionError;
use crate::validation::ValidationError;

/// Errors that can occur while driving the board.
///
/// API and validation errors display as their bare message, since that is
/// what gets shown to the user.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A remote call failed.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// A form value was rejected before any request was made.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The token store could not be read or written.
    #[error("session storage error: {0}")]
    Session(#[from] SessionError),

    /// The referenced task is not in the local cache.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// TUI-related error.
    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),
}

/// Errors that can occur during TUI operation.
#[derive(Error, Debug)]
pub enum TuiError {
    /// Terminal initialization failed.
    #[error("failed to initialize terminal: {0}")]
    TerminalInit(#[source] std::io::Error),

    /// Terminal rendering failed.
    #[error("render error: {0}")]
    Render(#[source] std::io::Error),

    /// Event handling error.
    #[error("event error: {0}")]
    Event(String),
}

/// A specialized `Result` type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
