use crate::app::AppState;
use crate::persistence::KvStore;
use crate::ui::{
    layout::create_modal_area,
    styles::{parse_hex, Theme},
};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the list manager modal
pub fn render_list_manager<S: KvStore>(f: &mut Frame, app: &AppState<S>, theme: &Theme, area: Rect) {
    let Some(state) = &app.list_manager else {
        return;
    };
    let modal_area = create_modal_area(area);
    f.render_widget(Clear, modal_area);

    let mut lines = Vec::new();
    lines.push(Line::raw(""));

    for (index, list) in app.board.lists().iter().enumerate() {
        let dot_color = parse_hex(&list.color)
            .map(|(r, g, b)| Color::Rgb(r, g, b))
            .unwrap_or(theme.accent);
        let is_active = list.id == app.board.active_list_id();
        let marker = if index == state.selected { "▶ " } else { "  " };

        let mut spans = vec![
            Span::raw(marker),
            Span::styled("● ", Style::default().fg(dot_color)),
            Span::raw(list.name.clone()),
        ];
        if is_active {
            spans.push(Span::styled("  (active)", theme.modal_title()));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::raw(""));

    match &state.new_name {
        Some(name) => {
            lines.push(Line::from(vec![
                Span::raw("  New list: "),
                Span::styled(name.clone(), theme.modal_title()),
                Span::styled("█", theme.modal_title()),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  Color: "),
                Span::styled(
                    "● ",
                    Style::default().fg(
                        parse_hex(crate::domain::ACCENT_PALETTE[state.color_index])
                            .map(|(r, g, b)| Color::Rgb(r, g, b))
                            .unwrap_or(theme.accent),
                    ),
                ),
                Span::raw("(c to cycle before typing)"),
            ]));
            lines.push(Line::raw(""));
            lines.push(Line::raw("  Enter to create  ·  Esc to cancel"));
        }
        None => {
            lines.push(Line::from(vec![
                Span::styled("  [Enter]", theme.modal_title()),
                Span::raw(" switch  "),
                Span::styled("[n]", theme.modal_title()),
                Span::raw(" new  "),
                Span::styled("[d]", theme.modal_title()),
                Span::raw(" delete  "),
                Span::styled("[Esc]", theme.modal_title()),
                Span::raw(" close"),
            ]));
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                "  Deleting a list moves its tasks to the first list.",
                theme.dim(),
            ));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Lists ", theme.modal_title()))
                .style(theme.modal_bg()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}

/// Render the clear-all-data confirmation modal
pub fn render_confirm_clear(f: &mut Frame, theme: &Theme, area: Rect) {
    let modal_area = create_modal_area(area);
    f.render_widget(Clear, modal_area);

    let lines = vec![
        Line::raw(""),
        Line::raw("  Clear all data?"),
        Line::raw(""),
        Line::raw("  Every task, list, setting and the timer state"),
        Line::raw("  will be deleted. This cannot be undone."),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  [y]", theme.modal_title()),
            Span::raw(" Yes, clear everything  "),
            Span::styled("[n]", theme.modal_title()),
            Span::raw(" Keep my data"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" ⚠ Clear Data ", theme.modal_title()))
                .style(theme.modal_bg()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
