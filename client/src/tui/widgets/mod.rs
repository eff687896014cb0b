//! Widgets that make up the board screens.
//!
//! - [`columns`]: The three task columns with the selection
//! - [`header`]: Signed-in user, filter and search summary
//! - [`login_form`]: Sign-in and registration panel
//! - [`status_line`]: Progress, errors, input prompts and key help
//!
//! Widgets borrow what they draw; all state lives in
//! [`BoardApp`](crate::tui::app::BoardApp).

pub mod columns;
pub mod header;
pub mod login_form;
pub mod status_line;

pub use columns::BoardColumnsWidget;
pub use header::{HeaderWidget, HEADER_HEIGHT};
pub use login_form::LoginFormWidget;
pub use status_line::{StatusLineWidget, STATUS_LINE_HEIGHT};
