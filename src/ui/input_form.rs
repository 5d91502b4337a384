use crate::app::AppState;
use crate::persistence::KvStore;
use crate::ui::{layout::create_modal_area, styles::Theme};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn field_line<'a>(label: &'a str, value: &'a str, editing: bool, theme: &Theme) -> Vec<Line<'a>> {
    let label_text = if editing {
        format!("{}: (editing)", label)
    } else {
        format!("{}:", label)
    };

    let mut value_spans = vec![
        Span::raw("> "),
        Span::styled(value, theme.modal_title()),
    ];
    if editing {
        value_spans.push(Span::styled("█", theme.modal_title())); // Cursor
    }

    vec![Line::raw(label_text), Line::from(value_spans), Line::raw("")]
}

/// Render the add/edit task form
pub fn render_task_form<S: KvStore>(f: &mut Frame, app: &AppState<S>, theme: &Theme, area: Rect) {
    let Some(form) = &app.task_form else {
        return;
    };
    let modal_area = create_modal_area(area);
    f.render_widget(Clear, modal_area);

    let title_text = if form.editing_id.is_some() {
        " Edit Task "
    } else {
        " Add Task "
    };

    let mut lines = vec![Line::raw("")];
    lines.extend(field_line("Title", &form.title, form.field == 0, theme));
    lines.extend(field_line(
        "Description",
        &form.description,
        form.field == 1,
        theme,
    ));
    lines.extend(field_line(
        "Due date (YYYY-MM-DD)",
        &form.due_date,
        form.field == 2,
        theme,
    ));
    lines.extend(field_line(
        "Due time (HH:MM)",
        &form.due_time,
        form.field == 3,
        theme,
    ));

    lines.push(Line::from(vec![
        Span::raw("Priority: "),
        Span::styled(form.priority.label(), theme.priority(form.priority)),
        Span::raw("  (↑/↓ to change)"),
    ]));
    lines.push(Line::raw(""));
    lines.push(Line::raw(
        "Tab to switch fields  ·  Enter to save  ·  Esc to cancel",
    ));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title_text, theme.modal_title()))
                .style(theme.modal_bg()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}

/// Render the timer duration configuration form
pub fn render_timer_form<S: KvStore>(f: &mut Frame, app: &AppState<S>, theme: &Theme, area: Rect) {
    let Some(form) = &app.timer_form else {
        return;
    };
    let modal_area = create_modal_area(area);
    f.render_widget(Clear, modal_area);

    let mut lines = vec![Line::raw("")];
    lines.extend(field_line(
        "Focus minutes",
        &form.pomodoro,
        form.field == 0,
        theme,
    ));
    lines.extend(field_line(
        "Short break minutes",
        &form.short_break,
        form.field == 1,
        theme,
    ));
    lines.extend(field_line(
        "Long break minutes",
        &form.long_break,
        form.field == 2,
        theme,
    ));

    let sound = if form.sound_enabled { "on" } else { "off" };
    lines.push(Line::from(vec![
        Span::raw("Completion sound: "),
        Span::styled(sound, theme.modal_title()),
        Span::raw("  (↑/↓ to toggle)"),
    ]));
    lines.push(Line::raw(""));
    lines.push(Line::raw(
        "Invalid numbers fall back to 25/5/15  ·  Enter to save  ·  Esc to cancel",
    ));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Timer Options ", theme.modal_title()))
                .style(theme.modal_bg()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
