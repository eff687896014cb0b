//! One-line header: signed-in user, active filter and search term.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::app::Theme;
use crate::types::User;
use crate::view::StatusFilter;

pub const HEADER_HEIGHT: u16 = 1;

#[derive(Debug)]
pub struct HeaderWidget<'a> {
    user: Option<&'a User>,
    filter: &'a StatusFilter,
    search: &'a str,
    /// Number of tasks passing the filter and search.
    shown: usize,
    theme: &'a Theme,
}

impl<'a> HeaderWidget<'a> {
    #[must_use]
    pub fn new(
        user: Option<&'a User>,
        filter: &'a StatusFilter,
        search: &'a str,
        shown: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            user,
            filter,
            search,
            shown,
            theme,
        }
    }
}

impl Widget for HeaderWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let mut spans = vec![Span::styled(" Taskdeck ", self.theme.title)];
        if let Some(user) = self.user {
            spans.push(Span::styled(
                format!(" {} ", user.display_name()),
                self.theme.text_primary,
            ));
        }
        spans.push(Span::styled(
            format!(" filter: {} ", self.filter),
            self.theme.text_muted,
        ));
        if !self.search.is_empty() {
            spans.push(Span::styled(
                format!(" search: {} ", self.search),
                self.theme.text_muted,
            ));
        }
        spans.push(Span::styled(
            format!(" {} shown", self.shown),
            self.theme.text_muted,
        ));

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(widget: HeaderWidget<'_>) -> String {
        let area = Rect::new(0, 0, 100, HEADER_HEIGHT);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn shows_user_filter_and_count() {
        let user = User {
            id: "u1".to_string(),
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
        };
        let theme = Theme::default();
        let filter = StatusFilter::All;

        let content = render_to_string(HeaderWidget::new(Some(&user), &filter, "", 3, &theme));

        assert!(content.contains("Ada"));
        assert!(content.contains("filter: all"));
        assert!(content.contains("3 shown"));
        assert!(!content.contains("search:"));
    }

    #[test]
    fn shows_search_term_when_set() {
        let theme = Theme::default();
        let filter = StatusFilter::Only(crate::types::TaskStatus::Done);

        let content = render_to_string(HeaderWidget::new(None, &filter, "milk", 0, &theme));

        assert!(content.contains("filter: done"));
        assert!(content.contains("search: milk"));
    }
}
