//! Screen composition for the interactive board.
//!
//! ```text
//! render() --> signed in?
//!     no  --> render_login_screen()
//!     yes --> render_board_screen()
//! ```

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::tui::app::BoardApp;
use crate::tui::widgets::{
    BoardColumnsWidget, HeaderWidget, LoginFormWidget, StatusLineWidget, HEADER_HEIGHT,
    STATUS_LINE_HEIGHT,
};

/// Renders the screen matching the board's authentication state.
pub fn render(frame: &mut Frame, app: &BoardApp) {
    if app.board.is_authenticated() {
        render_board_screen(frame, app);
    } else {
        render_login_screen(frame, app);
    }
}

/// Renders the sign-in or registration form.
pub fn render_login_screen(frame: &mut Frame, app: &BoardApp) {
    let widget = LoginFormWidget::new(&app.login, app.board.error(), app.busy, &app.theme);
    frame.render_widget(widget, frame.area());
}

/// Renders the header, the three columns and the status line.
pub fn render_board_screen(frame: &mut Frame, app: &BoardApp) {
    let [header_area, columns_area, status_area] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(STATUS_LINE_HEIGHT),
    ])
    .areas(frame.area());

    let board = &app.board;
    let view = board.view();

    frame.render_widget(
        HeaderWidget::new(
            board.user(),
            board.filter(),
            board.search(),
            view.filtered.len(),
            &app.theme,
        ),
        header_area,
    );

    frame.render_widget(
        BoardColumnsWidget::new(&view.grouped, app.column, app.selected_row(), &app.theme),
        columns_area,
    );

    frame.render_widget(
        StatusLineWidget::new(&app.mode, &app.theme)
            .search(board.search())
            .draft(&app.draft)
            .error(board.error())
            .busy(app.busy),
        status_area,
    );
}
