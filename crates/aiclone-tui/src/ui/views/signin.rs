use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, SignInFocus};
use crate::ui::render::{centered_rect_fixed, LOGO};
use crate::ui::styles;
use crate::utils::truncate_string;

/// Visible width of the text fields
const FIELD_WIDTH: usize = 24;

fn field_line<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    // Keep the tail visible while typing
    let shown: String = if value.chars().count() > FIELD_WIDTH {
        let skip = value.chars().count() - FIELD_WIDTH;
        value.chars().skip(skip).collect()
    } else {
        value.to_string()
    };
    Line::from(vec![
        Span::raw("   "),
        Span::styled(label, styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH), style),
        Span::styled("]", styles::muted_style()),
    ])
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let height = if app.signin_error.is_some() { 16 } else { 14 };
    let area = centered_rect_fixed(48, height, area);

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|row| Line::from(Span::styled(format!("       {}", row), styles::title_style())))
        .collect();
    lines.push(Line::from(""));

    if let Some(session) = app.session() {
        lines.push(Line::from(Span::styled(
            format!("   Signed in as {}", truncate_string(&session.email, 30)),
            styles::success_style(),
        )));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(field_line(
        "Email: [",
        &app.signin_email,
        app.signin_focus == SignInFocus::Email,
    ));
    lines.push(field_line(
        "Name:  [",
        &app.signin_name,
        app.signin_focus == SignInFocus::Name,
    ));

    // Plan selector
    let plan_focused = app.signin_focus == SignInFocus::Plan;
    let plan_style = if plan_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Plan:  ", styles::muted_style()),
        Span::styled(
            format!("◀ {:^10} ▶", app.signin_plan.label()),
            plan_style,
        ),
    ]));

    // Sign-in button
    let button_focused = app.signin_focus == SignInFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let button_label = if button_focused { " ▶ Sign In ◀ " } else { "   Sign In   " };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("              ["),
        Span::styled(button_label, button_style),
        Span::raw("]"),
    ]));

    // Error message
    if let Some(ref error) = app.signin_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Sign In ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
