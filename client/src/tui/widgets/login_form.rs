//! Sign-in and registration form.
//!
//! Rendered as a centered panel. The password is masked, and the last
//! authentication error (or the running operation) is shown under the fields.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::app::{LoginField, LoginForm, LoginMode, Theme};

/// Width of the form panel, including borders.
const FORM_WIDTH: u16 = 56;

/// Width reserved for field labels.
const LABEL_WIDTH: usize = 10;

#[derive(Debug)]
pub struct LoginFormWidget<'a> {
    form: &'a LoginForm,
    error: Option<&'a str>,
    busy: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> LoginFormWidget<'a> {
    #[must_use]
    pub fn new(
        form: &'a LoginForm,
        error: Option<&'a str>,
        busy: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            form,
            error,
            busy,
            theme,
        }
    }

    /// Rows needed for the current mode, including borders.
    #[must_use]
    pub fn height(&self) -> u16 {
        // fields + blank + message + blank + hint + borders
        self.form.fields().len() as u16 + 6
    }

    fn field_line(&self, field: LoginField) -> Line<'a> {
        let focused = field == self.form.focused;
        let value = self.form.value(field);
        let shown = if field == LoginField::Password {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let cursor = if focused { "_" } else { "" };

        Line::from(vec![
            Span::styled(
                format!("{:<width$}", format!("{}:", field.label()), width = LABEL_WIDTH),
                self.theme.label,
            ),
            Span::styled(
                format!("{shown}{cursor}"),
                if focused {
                    self.theme.input_focused
                } else {
                    self.theme.input_unfocused
                },
            ),
        ])
    }

    fn message_line(&self) -> Line<'a> {
        if let Some(busy) = self.busy {
            Line::from(Span::styled(busy, self.theme.status_busy))
        } else if let Some(error) = self.error {
            Line::from(Span::styled(error, self.theme.input_error))
        } else {
            Line::default()
        }
    }

    fn hint_line(&self) -> Line<'a> {
        let switch = match self.form.mode {
            LoginMode::SignIn => "Ctrl+R register",
            LoginMode::Register => "Ctrl+R sign in",
        };
        Line::from(Span::styled(
            format!("Tab next  Enter submit  {switch}  Esc quit"),
            self.theme.text_muted,
        ))
    }
}

impl Widget for LoginFormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let [row] = Layout::vertical([Constraint::Length(self.height())])
            .flex(Flex::Center)
            .areas(area);
        let [panel] = Layout::horizontal([Constraint::Length(FORM_WIDTH)])
            .flex(Flex::Center)
            .areas(row);

        let title = match self.form.mode {
            LoginMode::SignIn => " Taskdeck: Sign in ",
            LoginMode::Register => " Taskdeck: Create account ",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_focused)
            .title(title)
            .title_style(self.theme.title)
            .title_alignment(Alignment::Center);

        let mut lines: Vec<Line<'_>> = self
            .form
            .fields()
            .iter()
            .map(|field| self.field_line(*field))
            .collect();
        lines.push(Line::default());
        lines.push(self.message_line());
        lines.push(Line::default());
        lines.push(self.hint_line());

        Clear.render(panel, buf);
        Paragraph::new(lines).block(block).render(panel, buf);
    }
}
