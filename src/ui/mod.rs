pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod modal;
pub mod scene_pane;
pub mod styles;
pub mod task_pane;
pub mod timer_pane;

use crate::app::AppState;
use crate::domain::{ActiveView, UiMode};
use crate::persistence::KvStore;
use input_form::{render_task_form, render_timer_form};
use keybindings::render_keybindings;
use layout::create_layout;
use modal::{render_confirm_clear, render_list_manager};
use ratatui::Frame;
use scene_pane::render_scene_pane;
use styles::Theme;
use task_pane::{render_details_pane, render_task_header, render_task_pane};
use timer_pane::{render_mode_tabs, render_timer_pane};

/// Main render function - draws the entire UI
pub fn render<S: KvStore>(f: &mut Frame, app: &AppState<S>) {
    let size = f.size();
    let theme = Theme::from_settings(app.board.settings());
    let layout = create_layout(size);

    render_keybindings(f, app, &theme, layout.keybindings_area);

    match app.view {
        ActiveView::Tasks => {
            render_task_header(f, app, &theme, layout.header_area);
            render_task_pane(f, app, &theme, layout.main_area);
            render_details_pane(f, app, &theme, layout.side_area);
        }
        ActiveView::Timer => {
            render_mode_tabs(f, app, &theme, layout.header_area);
            render_timer_pane(f, app, &theme, layout.main_area);
            render_scene_pane(f, app, &theme, layout.side_area);
        }
    }

    match app.ui_mode {
        UiMode::TaskForm => render_task_form(f, app, &theme, size),
        UiMode::TimerConfig => render_timer_form(f, app, &theme, size),
        UiMode::ListManager => render_list_manager(f, app, &theme, size),
        UiMode::ConfirmClear => render_confirm_clear(f, &theme, size),
        UiMode::Normal => {}
    }
}
