//! Signed-in landing screen: greeting, storage usage and the quick-access
//! folder list. Folder data is static demo content.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

/// Storage quota shown on the home screen, in GB.
pub const TOTAL_STORAGE_GB: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Folder {
    pub name: &'static str,
    pub files: u32,
    pub size_gb: f64,
}

pub const FOLDERS: [Folder; 4] = [
    Folder { name: "Documents", files: 128, size_gb: 1.2 },
    Folder { name: "Images", files: 53, size_gb: 0.4 },
    Folder { name: "Videos", files: 12, size_gb: 2.1 },
    Folder { name: "Music", files: 32, size_gb: 0.3 },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageInfo {
    pub used_gb: f64,
    pub total_gb: f64,
    /// Rounded and capped at 100
    pub percent_used: u16,
}

pub fn storage_info(folders: &[Folder], total_gb: f64) -> StorageInfo {
    let used_gb: f64 = folders.iter().map(|f| f.size_gb).sum();
    let percent = if total_gb > 0.0 {
        (used_gb / total_gb * 100.0).round().min(100.0)
    } else {
        100.0
    };
    StorageInfo {
        used_gb,
        total_gb,
        percent_used: percent as u16,
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Greeting
            Constraint::Length(4), // Storage
            Constraint::Min(4),    // Quick access
        ])
        .split(area);

    render_greeting(frame, app, chunks[0]);
    render_storage(frame, chunks[1]);
    render_quick_access(frame, app, chunks[2]);
}

fn render_greeting(frame: &mut Frame, app: &App, area: Rect) {
    let (name, email) = match app.current_user() {
        Some(user) => (user.name.as_str(), user.email.as_str()),
        None => ("User", "user@example.com"),
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  Hi, {}", name), styles::title_style())),
        Line::from(Span::styled(format!("  {}", email), styles::muted_style())),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_storage(frame: &mut Frame, area: Rect) {
    let info = storage_info(&FOLDERS, TOTAL_STORAGE_GB);
    let label = format!("{:.1} GB of {} GB used", info.used_gb, info.total_gb);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Storage ")
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        )
        .gauge_style(styles::gauge_style())
        .percent(info.percent_used)
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_quick_access(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = FOLDERS
        .iter()
        .map(|folder| {
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {:<12}", folder.name)),
                Span::styled(
                    format!("{} files, {:.1} GB", folder.files, folder.size_gb),
                    styles::muted_style(),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Quick Access ")
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .highlight_style(styles::selected_style())
        .highlight_symbol("▶");

    let mut state = ListState::default();
    state.select(Some(app.home_selection.min(FOLDERS.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}
