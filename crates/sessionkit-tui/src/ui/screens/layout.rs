use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::ui::styles;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

/// Shown until the stored session has been read.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let top = area.height.saturating_sub(1) / 2;
    let mut lines: Vec<Line> = (0..top).map(|_| Line::from("")).collect();
    lines.push(Line::from(vec![
        Span::styled(spinner_frame(app.spinner_tick), styles::highlight_style()),
        Span::styled(" Loading session...", styles::muted_style()),
    ]));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
