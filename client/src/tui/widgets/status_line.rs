//! Bottom status line.
//!
//! Shows, in order of precedence: the running operation, the last error, the
//! prompt of the current input mode, or the key bindings.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::app::{InputMode, Theme};

pub const STATUS_LINE_HEIGHT: u16 = 1;

/// Key bindings shown when nothing else needs the line.
const KEY_HELP: &str =
    "h/l column  j/k move  space done  </> status  n new  d delete  / search  f filter  r refresh  L logout  q quit";

#[derive(Debug)]
pub struct StatusLineWidget<'a> {
    mode: &'a InputMode,
    search: &'a str,
    draft: &'a str,
    error: Option<&'a str>,
    busy: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusLineWidget<'a> {
    #[must_use]
    pub fn new(mode: &'a InputMode, theme: &'a Theme) -> Self {
        Self {
            mode,
            search: "",
            draft: "",
            error: None,
            busy: None,
            theme,
        }
    }

    #[must_use]
    pub fn search(mut self, search: &'a str) -> Self {
        self.search = search;
        self
    }

    #[must_use]
    pub fn draft(mut self, draft: &'a str) -> Self {
        self.draft = draft;
        self
    }

    #[must_use]
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    #[must_use]
    pub fn busy(mut self, busy: Option<&'a str>) -> Self {
        self.busy = busy;
        self
    }

    fn line(&self) -> Line<'a> {
        if let Some(busy) = self.busy {
            return Line::from(Span::styled(busy, self.theme.status_busy));
        }

        match self.mode {
            InputMode::Search => Line::from(vec![
                Span::styled("Search: ", self.theme.label),
                Span::styled(format!("{}_", self.search), self.theme.input_focused),
                Span::styled("  (Enter keep, Esc clear)", self.theme.text_muted),
            ]),
            InputMode::NewTask => Line::from(vec![
                Span::styled("New task: ", self.theme.label),
                Span::styled(format!("{}_", self.draft), self.theme.input_focused),
                Span::styled("  (Enter add, Esc cancel)", self.theme.text_muted),
            ]),
            InputMode::ConfirmDelete(_) => Line::from(Span::styled(
                "Delete the selected task? (y/n)",
                self.theme.input_error,
            )),
            InputMode::Normal => match self.error {
                Some(error) => Line::from(vec![
                    Span::styled(error, self.theme.input_error),
                    Span::styled("  (Esc dismiss)", self.theme.text_muted),
                ]),
                None => Line::from(Span::styled(KEY_HELP, self.theme.text_muted)),
            },
        }
    }
}

impl Widget for StatusLineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        Paragraph::new(self.line()).render(area, buf);
    }
}
