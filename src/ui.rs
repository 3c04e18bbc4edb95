//! The UI renders the application state into something visible and vim-able.
//!
//! The draw function dispatches on the current view. The sitemap tree draws
//! two terminal lines per section (title + URL) with box-drawing characters;
//! rendering also refreshes the row hit map the mouse handler reads, but the
//! rows themselves are always derived from the model, never scraped back out
//! of the screen.

use crate::app_state::{App, ParentSelect, RowHit, View};
use crate::drag::DropIntent;
use crate::wizard::FieldKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &mut App) {
    match app.view {
        View::Sitemap => draw_sitemap(f, app, false),
        View::Wizard => draw_wizard(f, app, false),
        View::ParentSelect => {
            draw_sitemap(f, app, false);
            if let Some(select) = &app.parent_select {
                draw_parent_select(f, select);
            }
        }
        View::Command => match app.command_return {
            View::Wizard => draw_wizard(f, app, true),
            _ => draw_sitemap(f, app, true),
        },
    }
}

/// Generate box-drawing prefix for tree structure.
fn tree_prefix(depth: usize, is_last: bool, parent_states: &[bool]) -> String {
    if depth == 0 {
        return String::new();
    }
    let mut prefix = String::new();
    for i in 0..depth.saturating_sub(1) {
        if i < parent_states.len() && parent_states[i] {
            prefix.push_str("│   ");
        } else {
            prefix.push_str("    ");
        }
    }
    if is_last {
        prefix.push_str("└── ");
    } else {
        prefix.push_str("├── ");
    }
    prefix
}

/// Which rows are the last of their sibling run, for box-drawing.
fn last_at_depth(depths: &[usize]) -> Vec<bool> {
    let mut result = vec![false; depths.len()];
    for (i, &depth) in depths.iter().enumerate() {
        let mut found_next = false;
        for &later in &depths[i + 1..] {
            if later < depth {
                break;
            }
            if later == depth {
                found_next = true;
                break;
            }
        }
        result[i] = !found_next;
    }
    result
}

#[allow(clippy::too_many_lines)]
fn draw_sitemap(f: &mut Frame, app: &mut App, command_bar: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let title = format!(
        "Sitemap ({} sections){}",
        app.sitemap.sections().len(),
        if app.sitemap.dirty { " [unsaved]" } else { "" }
    );
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);

    app.sitemap_hits.clear();
    let depths: Vec<usize> = app.sitemap.rows.iter().map(|r| r.depth).collect();
    let is_last = last_at_depth(&depths);
    let mut parent_states: Vec<bool> = Vec::new();

    // Two lines per row; scroll to keep the cursor visible.
    let visible = usize::from(inner.height / 2);
    let first = if visible == 0 {
        0
    } else if app.sitemap.cursor >= visible {
        app.sitemap.cursor + 1 - visible
    } else {
        0
    };

    let dragged = app.sitemap.drag.dragged();
    let over = app.sitemap.drag.over();
    let mut y = inner.y;

    for (i, row) in app.sitemap.rows.iter().enumerate() {
        while parent_states.len() > row.depth {
            parent_states.pop();
        }
        while parent_states.len() < row.depth {
            parent_states.push(false);
        }
        if row.depth > 0 {
            let idx = parent_states.len() - 1;
            parent_states[idx] = !is_last[i];
        }
        if i < first || i >= first + visible {
            continue;
        }

        let Some(section) = app.sitemap.section_by_id(row.id) else {
            continue;
        };
        let prefix = tree_prefix(row.depth, is_last[i], &parent_states);
        let pad = " ".repeat(prefix.chars().count());

        let mut title_style = Style::default();
        let mut url_style = Style::default().fg(Color::DarkGray);
        if dragged == Some(row.id) {
            title_style = Style::default()
                .fg(Color::Rgb(255, 165, 0))
                .add_modifier(Modifier::BOLD);
        } else if let Some((target, intent)) = over {
            // The two affordances are mutually exclusive: the upper half
            // marks an insertion point, the lower half marks adoption.
            if target == row.id {
                match intent {
                    DropIntent::InsertBefore => {
                        title_style = Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::UNDERLINED);
                    }
                    DropIntent::BecomeChild => {
                        url_style = Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD);
                    }
                }
            }
        }
        if i == app.sitemap.cursor && dragged.is_none() {
            title_style = title_style.add_modifier(Modifier::REVERSED);
        }

        let area = Rect {
            x: inner.x,
            y,
            width: inner.width,
            height: 2.min(inner.bottom().saturating_sub(y)),
        };
        app.sitemap_hits.push(RowHit { id: row.id, area });

        let lines = vec![
            Line::from(vec![
                Span::raw(prefix),
                Span::styled(section.title.clone(), title_style),
            ]),
            Line::from(vec![
                Span::raw(pad),
                Span::styled(section.page_url(), url_style),
            ]),
        ];
        f.render_widget(Paragraph::new(lines), area);
        y += 2;
    }

    draw_bottom_bar(
        f,
        app,
        chunks[1],
        command_bar,
        "↑/↓: Navigate | drag: Move | p: Parent | Ctrl+↑/↓: Reorder | Tab: Wizard | :w Save | :q Quit",
    );
}

fn draw_wizard(f: &mut Frame, app: &mut App, command_bar: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[0]);

    let rows = app.wizard.accordion_rows();
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let marker = if row.has_children {
                if row.expanded {
                    "▼ "
                } else {
                    "▶ "
                }
            } else {
                "  "
            };
            let indent = "  ".repeat(row.depth);
            let mut spans = vec![
                Span::raw(indent),
                Span::raw(marker.to_string()),
                Span::raw(format!("{}. {}", row.number, row.title)),
            ];
            if row.deletable {
                spans.push(Span::styled(" ×", Style::default().fg(Color::DarkGray)));
            }
            let mut style = Style::default();
            if i == app.wizard_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            } else if app.wizard.selected.as_deref() == Some(row.endpoint.as_str()) {
                style = style.add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Steps ({})", rows.len())),
    );
    f.render_widget(list, panes[0]);

    draw_step_detail(f, app, panes[1]);
    draw_bottom_bar(
        f,
        app,
        chunks[1],
        command_bar,
        "↑/↓: Navigate | Enter: Open | Space: Fold | Ctrl+↑/↓: Reorder | Tab: Sitemap | :sub :del! :q",
    );
}

fn draw_step_detail(f: &mut Frame, app: &App, area: Rect) {
    let Some(step) = app
        .wizard
        .selected
        .as_deref()
        .and_then(|ep| app.wizard.step(ep))
    else {
        let empty = Paragraph::new("Select a step to inspect its form")
            .block(Block::default().borders(Borders::ALL).title("Step"));
        f.render_widget(empty, area);
        return;
    };

    let data = app.wizard.data.get(&step.endpoint);
    let mut lines = vec![Line::from(Span::styled(
        step.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::from(Span::styled(
        format!("/sidebar/{}", step.endpoint),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::default());
    for field in &step.fields {
        let kind = match field.kind {
            FieldKind::Text => "text",
            FieldKind::TextArea => "textarea",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Select => "select",
            FieldKind::Images => "images",
            FieldKind::Documents => "documents",
            FieldKind::FileOrText => "file/text",
        };
        let required = if field.required { " *" } else { "" };
        lines.push(Line::from(format!(
            "  {} [{kind}]{required}",
            field.label
        )));
    }
    if let Some(data) = data {
        lines.push(Line::default());
        if data.loaded {
            lines.push(Line::from(format!(
                "Show in menu: {}",
                if data.show_in_menu { "yes" } else { "no" }
            )));
            if let Some(menu_parent) = &data.menu_parent {
                lines.push(Line::from(format!("Menu placement: {menu_parent}")));
            }
            lines.push(Line::from(format!("Blocks: {}", data.blocks.len())));
            for block in &data.blocks {
                lines.push(Line::from(Span::styled(
                    format!("  [{}] {}", block.kind(), block.title()),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        } else {
            lines.push(Line::from(Span::styled(
                "(content not loaded)",
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let detail = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(if step.deletable { "Step" } else { "Step (protected)" }),
    );
    f.render_widget(detail, area);
}

fn draw_parent_select(f: &mut Frame, select: &ParentSelect) {
    let area = centered_rect(50, 60, f.area());
    f.render_widget(Clear, area);
    let items: Vec<ListItem> = select
        .options
        .iter()
        .enumerate()
        .map(|(i, (_, label))| {
            let style = if i == select.cursor {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(label.clone()).style(style)
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Move to parent (Enter: apply, Esc: cancel)"),
    );
    f.render_widget(list, area);
}

fn draw_bottom_bar(f: &mut Frame, app: &App, area: Rect, command_bar: bool, help: &str) {
    let text = if command_bar {
        format!(":{}", app.command_buffer)
    } else if let Some(message) = &app.message {
        message.clone()
    } else {
        help.to_string()
    };
    let widget = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
