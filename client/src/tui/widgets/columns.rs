//! The three board columns.
//!
//! ```text
//! ┌ To Do (2) ─────────┐┌ In Progress (1) ───┐┌ Done (0) ──────────┐
//! │[ ] Buy milk      ! ││[ ] Write report !!!││                    │
//! │[ ] Walk dog     !! ││                    ││                    │
//! └────────────────────┘└────────────────────┘└────────────────────┘
//! ```
//!
//! Only the focused column shows a selection; the list scrolls to keep it
//! visible.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::tui::app::Theme;
use crate::types::{Column, Priority, Task};
use crate::view::GroupedTasks;

/// Renders one bordered list per [`Column`].
#[derive(Debug)]
pub struct BoardColumnsWidget<'a> {
    grouped: &'a GroupedTasks<'a>,
    focused: Column,
    /// Selected row within the focused column.
    selected: Option<usize>,
    theme: &'a Theme,
}

impl<'a> BoardColumnsWidget<'a> {
    #[must_use]
    pub fn new(
        grouped: &'a GroupedTasks<'a>,
        focused: Column,
        selected: Option<usize>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            grouped,
            focused,
            selected,
            theme,
        }
    }

    fn priority_marker(&self, priority: Priority) -> Span<'static> {
        match priority {
            Priority::High => Span::styled(" !!!", self.theme.priority_high),
            Priority::Medium => Span::styled(" !!", self.theme.priority_medium),
            Priority::Low => Span::styled(" !", self.theme.priority_low),
        }
    }

    fn task_item(&self, task: &'a Task) -> ListItem<'a> {
        let (checkbox, title_style) = if task.completed {
            ("[x] ", self.theme.task_done)
        } else {
            ("[ ] ", self.theme.text_primary)
        };

        let mut spans = vec![
            Span::styled(checkbox, self.theme.text_muted),
            Span::styled(task.title.as_str(), title_style),
            self.priority_marker(task.priority),
        ];
        if let Some(due) = task.due_date.as_deref() {
            spans.push(Span::styled(format!(" due {}", due_day(due)), self.theme.text_muted));
        }

        ListItem::new(Line::from(spans))
    }

    fn render_column(&self, column: Column, area: Rect, buf: &mut Buffer) {
        let tasks = self.grouped.column(column);
        let is_focused = column == self.focused;

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if is_focused {
                self.theme.border_focused
            } else {
                self.theme.border
            })
            .title(format!(" {} ({}) ", column.title(), tasks.len()))
            .title_style(self.theme.title);

        let items: Vec<ListItem<'a>> = tasks.iter().map(|task| self.task_item(*task)).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(self.theme.selected);

        let mut state = ListState::default();
        if is_focused {
            state.select(self.selected);
        }
        StatefulWidget::render(list, area, buf, &mut state);
    }
}

/// Date part of a due date, dropping any time component the server added.
fn due_day(due: &str) -> &str {
    due.split('T').next().unwrap_or(due)
}

impl Widget for BoardColumnsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
        for (column, column_area) in Column::ALL.into_iter().zip(areas.iter()) {
            self.render_column(column, *column_area, buf);
        }
    }
}
