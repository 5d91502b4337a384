use crate::app::AppState;
use crate::domain::ActiveView;
use crate::persistence::KvStore;
use crate::ui::styles::Theme;
use ratatui::{layout::Rect, text::Line, widgets::Paragraph, Frame};

/// Render the keybindings hint bar; a fresh status message takes its place
pub fn render_keybindings<S: KvStore>(
    f: &mut Frame,
    app: &AppState<S>,
    theme: &Theme,
    area: Rect,
) {
    if let Some(status) = app.status_text() {
        let paragraph = Paragraph::new(Line::raw(format!(" {}", status))).style(theme.title());
        f.render_widget(paragraph, area);
        return;
    }

    let hints = match app.view {
        ActiveView::Tasks => {
            " ↑/↓ select   Enter/x done   a add   e edit   d delete   f filter   l lists   c clear done   t theme   b bg   Tab timer   q quit"
        }
        ActiveView::Timer => {
            " Space start/pause   r reset   1/2/3 mode   o options   n channel   Tab tasks   q quit"
        }
    };

    let paragraph = Paragraph::new(Line::raw(hints)).style(theme.dim());
    f.render_widget(paragraph, area);
}
