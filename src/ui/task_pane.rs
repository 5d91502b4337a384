use crate::app::AppState;
use crate::domain::{due_label, views, Task};
use crate::persistence::KvStore;
use crate::ui::styles::{parse_hex, Theme};
use chrono::Local;
use ratatui::{
    layout::Rect,
    style::Color,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Render the header: active list name, pending counter, current filter
pub fn render_task_header<S: KvStore>(
    f: &mut Frame,
    app: &AppState<S>,
    theme: &Theme,
    area: Rect,
) {
    let list = app.board.active_list();
    let pending = app.board.pending_in_active();
    let list_color = parse_hex(&list.color)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(theme.accent);

    let line = Line::from(vec![
        Span::styled("● ", ratatui::style::Style::default().fg(list_color)),
        Span::styled(list.name.clone(), theme.title()),
        Span::raw("   "),
        Span::styled(
            format!("{} item{} left", pending, if pending == 1 { "" } else { "s" }),
            theme.dim(),
        ),
        Span::raw("   "),
        Span::styled(format!("[{}]", app.board.filter().label()), theme.text()),
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border()),
    );
    f.render_widget(paragraph, area);
}

/// Render the filtered, sorted task list
pub fn render_task_pane<S: KvStore>(
    f: &mut Frame,
    app: &AppState<S>,
    theme: &Theme,
    area: Rect,
) {
    let visible = app.board.visible_tasks();
    let today = Local::now().date_naive();

    let items: Vec<ListItem> = if visible.is_empty() {
        vec![
            ListItem::new(Line::raw("")),
            ListItem::new(Line::styled("  No tasks found", theme.dim())),
            ListItem::new(Line::styled(
                "  Press a to add a task",
                theme.dim(),
            )),
        ]
    } else {
        visible
            .iter()
            .enumerate()
            .map(|(index, task)| {
                let selected = index == app.selected_index;
                ListItem::new(task_row(task, selected, theme, today))
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(" Tasks ", theme.title()))
            .border_style(theme.border()),
    );
    f.render_widget(list, area);
}

fn task_row<'a>(
    task: &'a Task,
    selected: bool,
    theme: &Theme,
    today: chrono::NaiveDate,
) -> Line<'a> {
    let checkbox = if task.completed { "[x] " } else { "[ ] " };
    let title_style = if selected {
        theme.selected()
    } else if task.completed {
        theme.done()
    } else {
        theme.text()
    };

    let mut spans = vec![
        Span::styled(checkbox, theme.dim()),
        Span::styled("● ", theme.priority(task.priority)),
        Span::styled(task.title.as_str(), title_style),
    ];

    if let Some(date) = task.due_date {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            due_label(date, task.due_time, today),
            theme.dim(),
        ));
    }

    Line::from(spans)
}

/// Render details of the selected task in the side pane
pub fn render_details_pane<S: KvStore>(
    f: &mut Frame,
    app: &AppState<S>,
    theme: &Theme,
    area: Rect,
) {
    let mut lines: Vec<Line> = Vec::new();

    let visible = app.board.visible_tasks();
    if let Some(task) = visible.get(app.selected_index) {
        lines.push(Line::raw(""));
        lines.push(Line::styled(format!(" {}", task.title), theme.title()));
        lines.push(Line::raw(""));

        if !task.description.is_empty() {
            for row in task.description.lines() {
                lines.push(Line::raw(format!(" {}", row)));
            }
            lines.push(Line::raw(""));
        }

        lines.push(Line::from(vec![
            Span::styled(" Priority: ", theme.dim()),
            Span::styled(task.priority.label(), theme.priority(task.priority)),
        ]));

        if let Some(date) = task.due_date {
            let today = Local::now().date_naive();
            lines.push(Line::from(vec![
                Span::styled(" Due: ", theme.dim()),
                Span::raw(due_label(date, task.due_time, today)),
            ]));
        }

        let status = if task.completed { "Completed" } else { "Open" };
        lines.push(Line::from(vec![
            Span::styled(" Status: ", theme.dim()),
            Span::raw(status),
        ]));
    } else {
        lines.push(Line::raw(""));
        lines.push(Line::styled(" Nothing selected", theme.dim()));
    }

    // Per-list totals at the bottom of the pane
    let all = views::pending_count(app.board.tasks(), app.board.active_list().id.as_str());
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!(" {} open in this list", all),
        theme.dim(),
    ));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(" Details ", theme.title()))
            .border_style(theme.border()),
    );
    f.render_widget(paragraph, area);
}
