use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use sessionkit_core::auth::validation::{error_for, Field};

use super::{button_line, field_error_line, field_line, link_line};
use crate::app::{App, LoginFocus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.login;
    let errors = &form.field_errors;

    let mut lines = vec![
        Line::from(Span::styled("  Hello", styles::title_style())),
        Line::from(Span::styled("  Sign in!", styles::title_style())),
        Line::from(""),
        field_line("Email", &form.email, form.focus == LoginFocus::Email, false, false),
        field_error_line(error_for(errors, Field::Email)),
        field_line(
            "Password",
            &form.secret,
            form.focus == LoginFocus::Secret,
            true,
            form.show_secret,
        ),
        field_error_line(error_for(errors, Field::Secret)),
    ];

    if let Some(ref error) = form.error {
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    } else {
        lines.push(Line::from(""));
    }

    let label = if form.submitting { "Logging in..." } else { "Login" };
    lines.push(button_line(label, form.focus == LoginFocus::Button));
    lines.push(Line::from(""));
    lines.push(link_line(
        "Don't have account?",
        "Sign up",
        form.focus == LoginFocus::SignupLink,
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(!form.submitting));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
