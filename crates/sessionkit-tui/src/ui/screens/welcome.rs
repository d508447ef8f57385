use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, WelcomeFocus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let button = |label: &str, focused: bool| {
        let text = if focused {
            format!(" ▶ {} ◀ ", label)
        } else {
            format!("   {}   ", label)
        };
        Span::styled(text, styles::field_style(focused))
    };

    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("Cloud Storage Simplified", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Join 1 Million+ users worldwide that trust KLOUDIUS",
            styles::muted_style(),
        )),
        Line::from(Span::styled(
            "for their cloud storage needs",
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::raw("["),
            button("SIGN IN", app.welcome_focus == WelcomeFocus::SignIn),
            Span::raw("]   ["),
            button("SIGN UP", app.welcome_focus == WelcomeFocus::SignUp),
            Span::raw("]"),
        ]),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
