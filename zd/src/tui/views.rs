//! TUI views and rendering

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap};

use super::state::{AppState, InteractionMode};
use crate::controller::Review;
use crate::domain::Filter;
use crate::view::{TaskRow, priority_style, task_rows};

/// Main render function
pub fn render(state: &AppState, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + progress
            Constraint::Length(3), // Draft input
            Constraint::Length(1), // Filter tabs
            Constraint::Min(3),    // Task list
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);
    render_input(state, frame, chunks[1]);
    render_filter_tabs(state, frame, chunks[2]);
    render_task_list(state, frame, chunks[3]);
    render_footer(state, frame, chunks[4]);

    if let Some(review) = state.controller.review() {
        render_review_modal(state, review, frame, chunks[3]);
    } else if state.mode == InteractionMode::Help {
        render_help_overlay(frame, frame.area());
    }
}

/// Stats line and progress gauge
fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    let stats = state.controller.stats();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(10)])
        .split(area);

    let summary = Paragraph::new(Line::from(vec![
        Span::styled("ZenDo ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{} tasks", stats.total), Style::default().fg(Color::White)),
        Span::raw(" │ "),
        Span::styled(format!("{} done", stats.completed), Style::default().fg(Color::Green)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(summary, chunks[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(u16::from(stats.progress_percent))
        .label(format!("{}%", stats.progress_percent));
    frame.render_widget(gauge, chunks[1]);
}

/// Draft line with the priority selector in the title
fn render_input(state: &AppState, frame: &mut Frame, area: Rect) {
    let draft = state.controller.draft();
    let editing = state.mode == InteractionMode::Editing && state.controller.review().is_none();

    let mut title = vec![
        Span::raw(" New task "),
        Span::raw("│ priority: "),
        Span::styled(draft.priority.as_str(), priority_style(draft.priority)),
        Span::raw(" "),
    ];
    if state.controller.is_loading() {
        title.push(Span::styled(
            format!("│ {} breaking down... ", state.spinner()),
            Style::default().fg(Color::Magenta),
        ));
    }

    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let content = if draft.text.is_empty() && !editing {
        Line::from(Span::styled(
            "Press i to type a task, Ctrl-D to break it down",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(draft.text.as_str())
    };

    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Line::from(title)),
    );
    frame.render_widget(input, area);

    if editing {
        let width = u16::try_from(draft.text.chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(width).min(area.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn render_filter_tabs(state: &AppState, frame: &mut Frame, area: Rect) {
    let titles: Vec<Line> = Filter::ALL
        .iter()
        .enumerate()
        .map(|(i, f)| Line::from(format!("{} {}", i + 1, f.as_str())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.controller.filter().index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider("│");
    frame.render_widget(tabs, area);
}

fn render_task_list(state: &AppState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Tasks ({}) ", state.controller.filter()));

    let rows = task_rows(state.controller.visible_tasks(), &state.date_format);
    if rows.is_empty() {
        let placeholder = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No tasks found", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(
                "Enjoy your productivity!",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = rows.iter().map(task_item).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default().with_selected(Some(state.selection.selected_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn task_item(row: &TaskRow) -> ListItem<'static> {
    let checkbox = if row.completed { "[x] " } else { "[ ] " };
    ListItem::new(Line::from(vec![
        Span::styled(checkbox, Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{:<6} ", row.priority.as_str()), row.priority_style()),
        Span::styled(row.text.clone(), row.text_style()),
        Span::styled(format!("  {}", row.date), Style::default().fg(Color::DarkGray)),
    ]))
}

fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    let line = match state.controller.status() {
        Some(status) => Line::from(Span::styled(status, Style::default().fg(Color::Yellow))),
        None => {
            let hints = match state.mode {
                InteractionMode::Editing => "Enter add │ Tab priority │ Ctrl-D break down │ Esc done",
                _ => "i type │ space toggle │ d delete │ 1-3 filter │ C clear done │ ? help │ q quit",
            };
            Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Suggestions waiting for accept/cancel
fn render_review_modal(state: &AppState, review: &Review, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup_area);

    let priority = state.controller.draft().priority;
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Breakdown of "),
            Span::styled(
                format!("\"{}\"", review.source_text),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];
    for (i, suggestion) in review.suggestions.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::Cyan)),
            Span::raw(suggestion.clone()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Enter/y ", Style::default().fg(Color::Cyan)),
        Span::raw("add all as "),
        Span::styled(priority.as_str(), priority_style(priority)),
        Span::raw("   "),
        Span::styled("Esc/n ", Style::default().fg(Color::Cyan)),
        Span::raw("cancel"),
    ]));

    let modal = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" Suggested subtasks "),
    );
    frame.render_widget(modal, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("{:<14}", k), Style::default().fg(Color::Cyan)),
            Span::raw(what),
        ])
    };
    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)));

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
        heading("List"),
        key("↑/↓, j/k", "Move selection"),
        key("space, x", "Toggle completed"),
        key("d, Delete", "Delete task"),
        key("1 2 3, f", "Filter all / active / completed"),
        key("C", "Clear completed"),
        Line::from(""),
        heading("New task"),
        key("i, a", "Edit the draft"),
        key("Enter", "Add the draft"),
        key("Tab", "Cycle priority"),
        key("Ctrl-D, F2", "Break the draft into subtasks"),
        key("Esc", "Stop editing / cancel breakdown"),
        Line::from(""),
        key("?, F1", "Toggle help"),
        key("q, Ctrl-C", "Quit"),
    ];

    let help = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL).title(" Help "));
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}
