use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use aiclone_core::Plan;

use crate::ui::styles;

/// Short pitch for each plan
fn plan_blurb(plan: Plan) -> &'static str {
    match plan {
        Plan::Free => "Try every tool with a starter credit balance",
        Plan::Pro => "More credits and priority generation for creators",
        Plan::Enterprise => "Team seats, custom models and volume pricing",
    }
}

pub fn render(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(" Features", styles::highlight_style())),
        Line::from(""),
        Line::from(Span::styled(
            "  Clone your voice from a few minutes of clear audio, generate videos with your avatar,",
            styles::list_item_style(),
        )),
        Line::from(Span::styled(
            "  and create images for every platform. Generation runs in parallel across providers.",
            styles::list_item_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Pricing", styles::highlight_style())),
        Line::from(""),
    ];

    for plan in Plan::ALL {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", plan.label()), styles::heading_style()),
            Span::styled(plan_blurb(plan), styles::muted_style()),
        ]));
    }

    let block = Block::default()
        .title(" About ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
