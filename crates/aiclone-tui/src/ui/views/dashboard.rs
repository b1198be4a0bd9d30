use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use aiclone_core::{GuardState, Session};

use crate::app::App;
use crate::ui::styles;
use crate::utils::format_credits;

const QUICK_ACTIONS: [(&str, &str); 3] = [
    ("Clone Your Voice", "Create a digital clone of your voice for content generation"),
    ("Generate Videos", "Create AI-powered videos with your cloned avatar"),
    ("Generate Images", "Create stunning AI-generated images for your content"),
];

/// Protected view. Renders nothing unless the guard has authorized a session.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(GuardState::Authorized(session)) = app.guard_state() {
        render_authorized(frame, session, area);
    }
}

fn render_authorized(frame: &mut Frame, session: &Session, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Welcome
            Constraint::Length(5), // Quick actions
            Constraint::Length(4), // Stats
            Constraint::Min(3),    // Recent activity
        ])
        .split(area);

    let welcome = vec![
        Line::from(Span::styled(
            format!(" Welcome back, {}!", session.display_name()),
            styles::heading_style(),
        )),
        Line::from(Span::styled(
            " Create and manage your AI clones",
            styles::muted_style(),
        )),
    ];
    frame.render_widget(Paragraph::new(welcome), chunks[0]);

    render_quick_actions(frame, chunks[1]);
    render_stats(frame, session, chunks[2]);

    let activity = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  No activity yet. Start by creating your first AI clone!",
            styles::muted_style(),
        )),
    ];
    let block = Block::default()
        .title(" Recent Activity ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(activity).block(block), chunks[3]);
}

fn render_quick_actions(frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    for ((title, desc), column) in QUICK_ACTIONS.iter().zip(columns.iter()) {
        let block = Block::default()
            .title(Span::styled(format!(" {} ", title), styles::link_style()))
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        let paragraph = Paragraph::new(Span::styled(*desc, styles::list_item_style()))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, *column);
    }
}

fn render_stats(frame: &mut Frame, session: &Session, area: Rect) {
    let credits = format_credits(session.credits);
    let stats = [
        ("0", "Voice Models"),
        ("0", "Videos Generated"),
        ("0", "Images Created"),
        (credits.as_str(), "Credits Remaining"),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((value, label), column) in stats.iter().zip(columns.iter()) {
        let lines = vec![
            Line::from(Span::styled(format!(" {}", value), styles::credits_style())),
            Line::from(Span::styled(format!(" {}", label), styles::muted_style())),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        frame.render_widget(Paragraph::new(lines).block(block), *column);
    }
}
