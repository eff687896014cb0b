//! Terminal setup and teardown for the interactive board.
//!
//! [`Tui`] puts the terminal into raw mode on the alternate screen and puts it
//! back when dropped or when [`Tui::restore`] is called. Call
//! [`install_panic_hook`] before creating one so a panic leaves the shell
//! usable and its message visible.
//!
//! ```ignore
//! use taskdeck_client::tui::{install_panic_hook, Tui};
//!
//! install_panic_hook();
//! let mut tui = Tui::new()?;
//! tui.draw(|frame| { /* render */ })?;
//! tui.restore()?;
//! ```

use std::io::{self, Stdout};
use std::panic;

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

/// Best-effort return to the normal screen. Errors are ignored.
fn leave_terminal() {
    let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Chains a panic hook that restores the terminal before the previous hook
/// prints the panic message.
///
/// Intended to be called once, before [`Tui::new`].
pub fn install_panic_hook() {
    let previous_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        leave_terminal();
        previous_hook(panic_info);
    }));
}

/// A ratatui terminal on the alternate screen, restored on drop.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Set once the terminal has been handed back.
    restored: bool,
}

impl Tui {
    /// Enables raw mode, enters the alternate screen and hides the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. Steps already taken are undone.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                leave_terminal();
                return Err(e);
            }
        };

        Ok(Self {
            terminal,
            restored: false,
        })
    }

    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }

    /// Hands the terminal back to the shell. Later calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be restored. Unlike the
    /// [`Drop`] implementation, failures are reported.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        execute!(io::stdout(), Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if !self.restored {
            leave_terminal();
        }
    }
}
