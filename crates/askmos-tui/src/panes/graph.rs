//! Knowledge graph pane.

use crate::app::{App, Focus};
use crate::ui::theme::{Palette, Styles, Symbols};
use askmos_engine::{ArtifactRef, PanelStatus};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Render the graph pane. Returns the artifact it displayed, if any.
pub fn render(app: &App, area: Rect, buf: &mut Buffer) -> Option<ArtifactRef> {
    let border = if app.focus == Focus::Graph {
        Style::default().fg(Palette::GRAPH)
    } else {
        Styles::border()
    };
    let block = Block::default()
        .title(" Knowledge Graph ")
        .title_style(Styles::graph().add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(border)
        .style(Styles::default());
    let inner = block.inner(area);
    block.render(area, buf);

    let (lines, shown) = body(app);
    Paragraph::new(lines)
        .style(Styles::default())
        .wrap(Wrap { trim: false })
        .render(inner, buf);
    shown
}

fn body(app: &App) -> (Vec<Line<'static>>, Option<ArtifactRef>) {
    let panel = &app.panel;
    match panel.status() {
        PanelStatus::Loading => {
            let spinner = Symbols::SPINNER[app.tick % Symbols::SPINNER.len()];
            let lines = vec![
                Line::default(),
                Line::from(Span::styled(
                    format!(" {spinner} Loading knowledge graph..."),
                    Styles::graph(),
                )),
            ];
            (lines, None)
        }
        PanelStatus::Ready => {
            let Some(artifact) = panel.artifact() else {
                return (Vec::new(), None);
            };
            let mut lines = vec![
                Line::default(),
                Line::from(Span::styled(
                    format!(" {} Knowledge graph ready", Symbols::READY),
                    Styles::success(),
                )),
                Line::default(),
                Line::from(Span::styled(" Location", Styles::dim())),
                Line::from(Span::styled(
                    format!("   {}", artifact.locator),
                    Styles::highlight(),
                )),
            ];
            if let Some(content_type) = &artifact.content_type {
                lines.push(Line::from(Span::styled(" Type", Styles::dim())));
                lines.push(Line::from(format!("   {content_type}")));
            }
            lines.push(Line::default());
            lines.push(Line::from(" Open the location in a browser to explore"));
            lines.push(Line::from(" datasets, missions and instruments."));
            lines.push(Line::from(Span::styled(
                " Ctrl+Y copies the link.",
                Styles::dim(),
            )));
            (lines, Some(artifact.clone()))
        }
        PanelStatus::Idle => {
            let mut lines = vec![Line::default()];
            if let Some(error) = panel.error() {
                lines.push(Line::from(Span::styled(
                    format!(" {} Could not load the knowledge graph", Symbols::ERROR),
                    Styles::error(),
                )));
                lines.push(Line::from(Span::styled(format!("   {error}"), Styles::error())));
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    " Press Ctrl+G to try again.",
                    Styles::dim(),
                )));
            } else {
                lines.push(Line::from(" Visualize how MOSDAC datasets,"));
                lines.push(Line::from(" missions and instruments connect."));
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    " Press Ctrl+G to load the graph.",
                    Styles::dim(),
                )));
            }
            (lines, None)
        }
    }
}
