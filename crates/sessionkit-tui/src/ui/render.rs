use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState};
use crate::navigation::Route;

use super::screens::{home, layout, login, signup, welcome};
use super::styles;

/// Width of the centered column the form screens render into.
const FORM_WIDTH: u16 = 60;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  KLOUDIUS";
    let screen = format!("{} ", app.current_route().title());

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + screen.chars().count()),
        )),
        Span::styled(screen, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_route() {
        Route::Layout => layout::render(frame, app, area),
        Route::Welcome => welcome::render(frame, app, area),
        Route::Login => login::render(frame, app, centered_column(FORM_WIDTH, area)),
        Route::Signup => signup::render(frame, app, centered_column(FORM_WIDTH, area)),
        Route::Home => home::render(frame, app, area),
    }
}

fn shortcuts(app: &App) -> &'static str {
    match app.current_route() {
        Route::Layout => "[Ctrl+C] quit",
        Route::Welcome => "[←/→] select | [Enter] open | [q]uit",
        Route::Login | Route::Signup if app.navigator.can_go_back() => {
            "[Tab] next | [Enter] submit | [F2] show password | [Esc] back"
        }
        Route::Login | Route::Signup => "[Tab] next | [Enter] submit | [F2] show password | [Esc] quit",
        Route::Home => "[↑/↓] browse | [l]ogout | [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match (&app.status_message, app.current_user()) {
        (Some(msg), _) => format!(" {} ", msg),
        (None, Some(user)) => format!(" Signed in as {} ", user.email),
        (None, None) => " Not signed in ".to_string(),
    };
    let right_text = format!(" {} ", shortcuts(app));

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

/// Full-height column of fixed width, centered horizontally.
fn centered_column(width: u16, r: Rect) -> Rect {
    centered_rect_fixed(width, r.height, r)
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
