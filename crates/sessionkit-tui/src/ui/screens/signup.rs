use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use sessionkit_core::auth::validation::{error_for, Field};

use super::{button_line, field_error_line, field_line, link_line};
use crate::app::{App, SignupFocus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.signup;
    let errors = &form.field_errors;

    let mut lines = vec![
        Line::from(Span::styled("  Create Your", styles::title_style())),
        Line::from(Span::styled("  Account", styles::title_style())),
        Line::from(""),
        field_line("Full Name", &form.name, form.focus == SignupFocus::Name, false, false),
        field_error_line(error_for(errors, Field::Name)),
        field_line("Email", &form.email, form.focus == SignupFocus::Email, false, false),
        field_error_line(error_for(errors, Field::Email)),
        field_line(
            "Password",
            &form.secret,
            form.focus == SignupFocus::Secret,
            true,
            form.show_secret,
        ),
        field_error_line(error_for(errors, Field::Secret)),
        field_line(
            "Confirm Password",
            &form.confirm,
            form.focus == SignupFocus::Confirm,
            true,
            form.show_secret,
        ),
        field_error_line(error_for(errors, Field::ConfirmSecret)),
    ];

    if let Some(ref error) = form.error {
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    } else {
        lines.push(Line::from(""));
    }

    let label = if form.submitting { "Signing up..." } else { "Sign up" };
    lines.push(button_line(label, form.focus == SignupFocus::Button));
    lines.push(Line::from(""));
    lines.push(link_line(
        "Already have an account?",
        "Sign in",
        form.focus == SignupFocus::LoginLink,
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(!form.submitting));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
