use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

const FEATURES: [&str; 4] = [
    "Voice Cloning",
    "Video Generation",
    "Image Creation",
    "Auto Scheduling",
];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "The Future of Content Creation",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Clone Your Voice, Face & Style with AI",
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Generate unlimited content automatically. Scale your presence across all platforms while you sleep.",
            styles::list_item_style(),
        )),
        Line::from(""),
    ];

    let mut pills = Vec::new();
    for (i, feature) in FEATURES.iter().enumerate() {
        if i > 0 {
            pills.push(Span::raw("  "));
        }
        pills.push(Span::styled(format!("[ {} ]", feature), styles::muted_style()));
    }
    lines.push(Line::from(pills));
    lines.push(Line::from(""));
    lines.push(Line::from(""));

    match app.session() {
        Some(session) => {
            lines.push(Line::from(Span::styled(
                format!("Welcome back, {}!", session.display_name()),
                styles::success_style(),
            )));
            lines.push(Line::from(vec![
                Span::styled("Press ", styles::muted_style()),
                Span::styled("4", styles::help_key_style()),
                Span::styled(" to open your dashboard", styles::muted_style()),
            ]));
        }
        None => {
            lines.push(Line::from(vec![
                Span::styled("Press ", styles::muted_style()),
                Span::styled("3", styles::help_key_style()),
                Span::styled(" to sign in and start creating", styles::muted_style()),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
