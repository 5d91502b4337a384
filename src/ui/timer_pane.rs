use crate::app::AppState;
use crate::domain::TimerMode;
use crate::persistence::KvStore;
use crate::timer::format_clock;
use crate::ui::styles::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Tabs},
    Frame,
};

/// Render the mode tabs in the header
pub fn render_mode_tabs<S: KvStore>(f: &mut Frame, app: &AppState<S>, theme: &Theme, area: Rect) {
    let titles: Vec<Line> = TimerMode::all()
        .iter()
        .map(|mode| Line::from(mode.name()))
        .collect();
    let selected = TimerMode::all()
        .iter()
        .position(|m| *m == app.timer.mode())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(theme.dim())
        .highlight_style(theme.title())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border()),
        );
    f.render_widget(tabs, area);
}

/// Render the countdown pane: clock, progress, state badge
pub fn render_timer_pane<S: KvStore>(f: &mut Frame, app: &AppState<S>, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", app.timer.mode().name()),
            theme.title(),
        ))
        .border_style(theme.border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let badge = if app.timer.is_running() {
        Span::styled("⏱ RUNNING", theme.running())
    } else if app.timer.remaining_seconds() == 0 {
        Span::styled("✓ DONE", theme.title())
    } else if app.timer.remaining_seconds() < app.timer.session_length_secs() {
        Span::styled("⏸ PAUSED", theme.paused())
    } else {
        Span::styled("READY", theme.dim())
    };

    let settings = app.timer.settings();
    let sound = if settings.sound_enabled {
        format!("sound on ({})", settings.sound_theme)
    } else {
        "sound off".to_string()
    };

    let lines = vec![
        Line::raw(""),
        Line::raw(""),
        Line::from(Span::styled(
            big_clock(app.timer.remaining_seconds()),
            theme.title(),
        )),
        Line::raw(""),
        Line::from(badge),
        Line::raw(""),
        Line::from(Span::styled(
            format!(
                "{} / {} / {} min",
                settings.pomodoro, settings.short_break, settings.long_break
            ),
            theme.dim(),
        )),
        Line::from(Span::styled(sound, theme.dim())),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);

    // Clock above, gauge pinned to the bottom row
    if inner.height > 2 {
        let text_area = Rect::new(inner.x, inner.y, inner.width, inner.height - 2);
        let gauge_area = Rect::new(inner.x + 1, inner.y + inner.height - 2, inner.width.saturating_sub(2), 1);
        f.render_widget(paragraph, text_area);

        let gauge = Gauge::default()
            .gauge_style(theme.gauge())
            .ratio(app.timer.progress().clamp(0.0, 1.0))
            .label(format_clock(app.timer.remaining_seconds()));
        f.render_widget(gauge, gauge_area);
    } else {
        f.render_widget(paragraph, inner);
    }
}

/// Widened clock text so the countdown reads at a glance
fn big_clock(seconds: u32) -> String {
    let clock = format_clock(seconds);
    let mut wide = String::new();
    for (i, c) in clock.chars().enumerate() {
        if i > 0 {
            wide.push(' ');
        }
        wide.push(c);
    }
    wide
}
