//! Per-route content, rendered into the main area between the title and
//! status bars.

pub mod home;
pub mod layout;
pub mod login;
pub mod signup;
pub mod welcome;

use ratatui::text::{Line, Span};

use super::styles;

/// Visible width of a form field.
pub(crate) const FIELD_WIDTH: usize = 30;

/// One labelled input row. Secrets render as `*` unless `reveal` is set.
pub(crate) fn field_line(
    label: &str,
    value: &str,
    focused: bool,
    secret: bool,
    reveal: bool,
) -> Line<'static> {
    let shown: String = if secret && !reveal {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    // Keep the tail visible once the value outgrows the box
    let count = shown.chars().count();
    let visible: String = shown
        .chars()
        .skip(count.saturating_sub(FIELD_WIDTH - 1))
        .collect();
    let cursor = if focused { "▌" } else { "" };
    let display = format!("{:<width$}", format!("{}{}", visible, cursor), width = FIELD_WIDTH);

    Line::from(vec![
        Span::styled(format!("  {:<18}", label), styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(display, styles::field_style(focused)),
        Span::styled("]", styles::muted_style()),
    ])
}

/// Error text shown under a field, or a blank spacer line.
pub(crate) fn field_error_line(message: Option<&str>) -> Line<'static> {
    match message {
        Some(msg) => Line::from(Span::styled(
            format!("  {:<18} {}", "", msg),
            styles::error_style(),
        )),
        None => Line::from(""),
    }
}

pub(crate) fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw(format!("  {:<18}", "")),
        Span::raw("["),
        Span::styled(text, styles::field_style(focused)),
        Span::raw("]"),
    ])
}

pub(crate) fn link_line(prompt: &str, link: &str, focused: bool) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("  {:<18}", "")),
        Span::styled(format!("{} ", prompt), styles::muted_style()),
        Span::styled(link.to_string(), styles::link_style(focused)),
    ])
}
