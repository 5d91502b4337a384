use crate::board::TaskBoard;
use crate::domain::{
    now_millis, ActiveView, Priority, Task, TaskDraft, TaskPatch, TimerMode, UiMode,
    ACCENT_PALETTE,
};
use crate::notifications;
use crate::persistence::{clear_all, KvStore};
use crate::timer::{PomodoroTimer, TimerChange, TimerSettings};
use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use std::time::Instant;

/// How long a status line stays visible
const STATUS_SECS: u64 = 4;

/// Number of decorative scenes the timer view can cycle through
pub const SCENE_COUNT: usize = 4;

/// Input form for adding or editing a task
#[derive(Debug, Clone)]
pub struct TaskFormState {
    /// Task being edited, or None when adding
    pub editing_id: Option<String>,
    pub title: String,
    pub description: String,
    /// Raw "YYYY-MM-DD" input; anything unparseable means no due date
    pub due_date: String,
    /// Raw "HH:MM" input
    pub due_time: String,
    pub priority: Priority,
    pub field: usize, // 0 = title, 1 = description, 2 = due date, 3 = due time
}

impl TaskFormState {
    pub const FIELDS: usize = 4;

    pub fn blank() -> Self {
        Self {
            editing_id: None,
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            due_time: String::new(),
            priority: Priority::default(),
            field: 0,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            editing_id: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            due_time: task
                .due_time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            priority: task.priority,
            field: 0,
        }
    }

    pub fn next_field(&mut self) {
        self.field = (self.field + 1) % Self::FIELDS;
    }

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.title,
            1 => &mut self.description,
            2 => &mut self.due_date,
            _ => &mut self.due_time,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.field_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.field_mut().pop();
    }
}

/// Input form for the timer duration configuration
#[derive(Debug, Clone)]
pub struct TimerFormState {
    pub pomodoro: String,
    pub short_break: String,
    pub long_break: String,
    pub sound_enabled: bool,
    pub field: usize, // 0..=2 are the minute fields
}

impl TimerFormState {
    pub const FIELDS: usize = 3;

    pub fn from_settings(settings: &TimerSettings) -> Self {
        Self {
            pomodoro: settings.pomodoro.to_string(),
            short_break: settings.short_break.to_string(),
            long_break: settings.long_break.to_string(),
            sound_enabled: settings.sound_enabled,
            field: 0,
        }
    }

    pub fn next_field(&mut self) {
        self.field = (self.field + 1) % Self::FIELDS;
    }

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.pomodoro,
            1 => &mut self.short_break,
            _ => &mut self.long_break,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.field_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.field_mut().pop();
    }
}

/// State of the list manager modal
#[derive(Debug, Clone)]
pub struct ListManagerState {
    pub selected: usize,
    /// Name entry for a new list; None when browsing
    pub new_name: Option<String>,
    pub color_index: usize,
}

impl ListManagerState {
    pub fn new() -> Self {
        Self {
            selected: 0,
            new_name: None,
            color_index: 0,
        }
    }
}

/// Main application state
pub struct AppState<S: KvStore> {
    pub store: S,
    pub board: TaskBoard,
    pub timer: PomodoroTimer,
    pub view: ActiveView,
    pub ui_mode: UiMode,
    pub selected_index: usize,
    pub task_form: Option<TaskFormState>,
    pub timer_form: Option<TimerFormState>,
    pub list_manager: Option<ListManagerState>,
    /// Decorative scene channel on the timer view
    pub scene_index: usize,
    /// Frame counter for scene animation (increments every poll)
    pub animation_frame: u32,
    status: Option<(String, Instant)>,
}

impl<S: KvStore> AppState<S> {
    pub fn new(mut store: S) -> Result<Self> {
        let board = TaskBoard::load(&mut store)?;
        let timer = PomodoroTimer::load(&mut store, now_millis())?;

        Ok(Self {
            store,
            board,
            timer,
            view: ActiveView::Tasks,
            ui_mode: UiMode::Normal,
            selected_index: 0,
            task_form: None,
            timer_form: None,
            list_manager: None,
            scene_index: 0,
            animation_frame: 0,
            status: None,
        })
    }

    /// Advance the timer and expire stale status text; called every poll
    pub fn tick(&mut self) -> Result<()> {
        self.timer.tick(&mut self.store, now_millis())?;
        self.process_changes();

        if let Some((_, set_at)) = &self.status {
            if set_at.elapsed().as_secs() >= STATUS_SECS {
                self.status = None;
            }
        }

        self.animation_frame = self.animation_frame.wrapping_add(1);
        Ok(())
    }

    /// React to the change notifications the core queued up
    fn process_changes(&mut self) {
        for change in self.timer.drain_changes() {
            if let TimerChange::SessionFinished(mode) = change {
                if self.board.settings().notifications_enabled {
                    notifications::notify_session_complete(mode);
                }
                if self.timer.settings().sound_enabled {
                    notifications::terminal_bell();
                }
                self.set_status(format!("{} session complete", mode.name()));
            }
        }
        // Board changes need no side effects beyond the redraw the event
        // loop already performs; drain them so the queue stays bounded.
        self.board.drain_changes();
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some((text.into(), Instant::now()));
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|(text, _)| text.as_str())
    }

    // --- task view -------------------------------------------------------

    pub fn visible_len(&self) -> usize {
        self.board.visible_tasks().len()
    }

    pub fn selected_task_id(&self) -> Option<String> {
        self.board
            .visible_tasks()
            .get(self.selected_index)
            .map(|t| t.id.clone())
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.visible_len() {
            self.selected_index += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    pub fn toggle_selected_task(&mut self) -> Result<()> {
        if let Some(id) = self.selected_task_id() {
            self.board.toggle_completion(&mut self.store, &id)?;
            self.process_changes();
            self.clamp_selection();
        }
        Ok(())
    }

    pub fn delete_selected_task(&mut self) -> Result<()> {
        if let Some(id) = self.selected_task_id() {
            self.board.delete_task(&mut self.store, &id)?;
            self.process_changes();
            self.clamp_selection();
        }
        Ok(())
    }

    pub fn cycle_filter(&mut self) -> Result<()> {
        let next = self.board.filter().next();
        self.board.set_filter(&mut self.store, next)?;
        self.process_changes();
        self.clamp_selection();
        Ok(())
    }

    pub fn clear_completed(&mut self) -> Result<()> {
        let removed = self.board.clear_completed(&mut self.store)?;
        self.process_changes();
        self.clamp_selection();
        if removed > 0 {
            self.set_status(format!("Cleared {} completed", removed));
        }
        Ok(())
    }

    pub fn cycle_accent_color(&mut self) -> Result<()> {
        let mut settings = self.board.settings().clone();
        settings.cycle_accent();
        let color = settings.accent_color.clone();
        self.board.update_settings(&mut self.store, settings)?;
        self.process_changes();
        self.set_status(format!("Accent {}", color));
        Ok(())
    }

    pub fn toggle_dark_mode(&mut self) -> Result<()> {
        let mut settings = self.board.settings().clone();
        settings.dark_mode = !settings.dark_mode;
        self.board.update_settings(&mut self.store, settings)?;
        self.process_changes();
        Ok(())
    }

    // --- task form -------------------------------------------------------

    pub fn open_add_form(&mut self) {
        self.task_form = Some(TaskFormState::blank());
        self.ui_mode = UiMode::TaskForm;
    }

    pub fn open_edit_form(&mut self) {
        if let Some(id) = self.selected_task_id() {
            if let Some(task) = self.board.find_task(&id) {
                self.task_form = Some(TaskFormState::from_task(task));
                self.ui_mode = UiMode::TaskForm;
            }
        }
    }

    pub fn cancel_task_form(&mut self) {
        self.task_form = None;
        self.ui_mode = UiMode::Normal;
    }

    /// Submit the task form. An empty title cancels; unparseable date or
    /// time input simply means no due date, never an error.
    pub fn submit_task_form(&mut self) -> Result<()> {
        let Some(form) = self.task_form.take() else {
            return Ok(());
        };
        self.ui_mode = UiMode::Normal;

        if form.title.trim().is_empty() {
            return Ok(());
        }

        let due_date = NaiveDate::parse_from_str(form.due_date.trim(), "%Y-%m-%d").ok();
        let due_time = NaiveTime::parse_from_str(form.due_time.trim(), "%H:%M").ok();

        match form.editing_id {
            Some(id) => {
                self.board.update_task(
                    &mut self.store,
                    &id,
                    TaskPatch {
                        title: Some(form.title.trim().to_string()),
                        description: Some(form.description),
                        due_date: Some(due_date),
                        due_time: Some(due_time),
                        priority: Some(form.priority),
                        list_id: None,
                    },
                )?;
            }
            None => {
                self.board.add_task(
                    &mut self.store,
                    TaskDraft {
                        title: form.title.trim().to_string(),
                        description: form.description,
                        due_date,
                        due_time,
                        priority: form.priority,
                    },
                )?;
            }
        }
        self.process_changes();
        self.clamp_selection();
        Ok(())
    }

    // --- list manager ----------------------------------------------------

    pub fn open_list_manager(&mut self) {
        let mut state = ListManagerState::new();
        let active = self.board.active_list_id();
        state.selected = self
            .board
            .lists()
            .iter()
            .position(|l| l.id == active)
            .unwrap_or(0);
        self.list_manager = Some(state);
        self.ui_mode = UiMode::ListManager;
    }

    pub fn close_list_manager(&mut self) {
        self.list_manager = None;
        self.ui_mode = UiMode::Normal;
    }

    pub fn lists_move_up(&mut self) {
        if let Some(state) = &mut self.list_manager {
            state.selected = state.selected.saturating_sub(1);
        }
    }

    pub fn lists_move_down(&mut self) {
        let count = self.board.lists().len();
        if let Some(state) = &mut self.list_manager {
            if state.selected + 1 < count {
                state.selected += 1;
            }
        }
    }

    pub fn lists_activate_selected(&mut self) -> Result<()> {
        let id = match &self.list_manager {
            Some(state) => self
                .board
                .lists()
                .get(state.selected)
                .map(|l| l.id.clone()),
            None => None,
        };
        if let Some(id) = id {
            self.board.set_active_list(&mut self.store, &id)?;
            self.process_changes();
            self.selected_index = 0;
        }
        self.close_list_manager();
        Ok(())
    }

    pub fn lists_delete_selected(&mut self) -> Result<()> {
        let id = match &self.list_manager {
            Some(state) => self
                .board
                .lists()
                .get(state.selected)
                .map(|l| l.id.clone()),
            None => None,
        };
        if let Some(id) = id {
            if !self.board.delete_list(&mut self.store, &id)? {
                self.set_status("Cannot delete the last list");
            }
            self.process_changes();
            self.clamp_selection();
        }
        let count = self.board.lists().len();
        if let Some(state) = &mut self.list_manager {
            if state.selected >= count && count > 0 {
                state.selected = count - 1;
            }
        }
        Ok(())
    }

    pub fn lists_begin_add(&mut self) {
        if let Some(state) = &mut self.list_manager {
            state.new_name = Some(String::new());
        }
    }

    pub fn lists_cycle_color(&mut self) {
        if let Some(state) = &mut self.list_manager {
            state.color_index = (state.color_index + 1) % ACCENT_PALETTE.len();
        }
    }

    pub fn lists_input_char(&mut self, c: char) {
        if let Some(state) = &mut self.list_manager {
            if let Some(name) = &mut state.new_name {
                name.push(c);
            }
        }
    }

    pub fn lists_backspace(&mut self) {
        if let Some(state) = &mut self.list_manager {
            if let Some(name) = &mut state.new_name {
                name.pop();
            }
        }
    }

    pub fn lists_cancel_add(&mut self) {
        if let Some(state) = &mut self.list_manager {
            state.new_name = None;
        }
    }

    /// Create the list named in the entry field and switch to it
    pub fn lists_submit_new(&mut self) -> Result<()> {
        let (name, color) = match &mut self.list_manager {
            Some(state) => match state.new_name.take() {
                Some(name) => (name, ACCENT_PALETTE[state.color_index].to_string()),
                None => return Ok(()),
            },
            None => return Ok(()),
        };

        if name.trim().is_empty() {
            return Ok(());
        }

        let id = self
            .board
            .add_list(&mut self.store, name.trim().to_string(), color)?;
        self.board.set_active_list(&mut self.store, &id)?;
        self.process_changes();
        self.selected_index = 0;
        self.close_list_manager();
        Ok(())
    }

    // --- timer view ------------------------------------------------------

    /// Space bar semantics: start when idle, pause when running
    pub fn timer_toggle(&mut self) -> Result<()> {
        if self.timer.is_running() {
            self.timer.pause(&mut self.store)?;
        } else {
            self.timer.start(&mut self.store, now_millis())?;
        }
        self.process_changes();
        Ok(())
    }

    pub fn timer_reset(&mut self) -> Result<()> {
        self.timer.reset(&mut self.store)?;
        self.process_changes();
        Ok(())
    }

    pub fn timer_change_mode(&mut self, mode: TimerMode) -> Result<()> {
        self.timer.change_mode(&mut self.store, mode)?;
        self.process_changes();
        Ok(())
    }

    pub fn next_scene(&mut self) {
        self.scene_index = (self.scene_index + 1) % SCENE_COUNT;
    }

    pub fn open_timer_config(&mut self) {
        self.timer_form = Some(TimerFormState::from_settings(self.timer.settings()));
        self.ui_mode = UiMode::TimerConfig;
    }

    pub fn cancel_timer_config(&mut self) {
        self.timer_form = None;
        self.ui_mode = UiMode::Normal;
    }

    pub fn submit_timer_config(&mut self) -> Result<()> {
        let Some(form) = self.timer_form.take() else {
            return Ok(());
        };
        self.ui_mode = UiMode::Normal;

        let sound_theme = self.timer.settings().sound_theme.clone();
        let settings = TimerSettings::from_input(
            &form.pomodoro,
            &form.short_break,
            &form.long_break,
            form.sound_enabled,
            sound_theme,
        );
        self.timer.configure(&mut self.store, settings)?;
        self.process_changes();
        Ok(())
    }

    // --- destructive -----------------------------------------------------

    pub fn open_confirm_clear(&mut self) {
        self.ui_mode = UiMode::ConfirmClear;
    }

    pub fn cancel_confirm_clear(&mut self) {
        self.ui_mode = UiMode::Normal;
    }

    /// Wipe every persisted key and start over with defaults. Only reachable
    /// through the confirmation modal (or the CLI --yes flag).
    pub fn clear_all_data(&mut self) -> Result<()> {
        clear_all(&mut self.store)?;
        self.board = TaskBoard::load(&mut self.store)?;
        self.timer = PomodoroTimer::load(&mut self.store, now_millis())?;
        self.selected_index = 0;
        self.ui_mode = UiMode::Normal;
        self.set_status("All data cleared");
        Ok(())
    }

    // --- misc ------------------------------------------------------------

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            ActiveView::Tasks => ActiveView::Timer,
            ActiveView::Timer => ActiveView::Tasks,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn test_app() -> AppState<MemoryStore> {
        AppState::new(MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_new_app_has_seeded_board_and_idle_timer() {
        let app = test_app();
        assert_eq!(app.board.lists().len(), 1);
        assert_eq!(app.board.tasks().len(), 1);
        assert!(!app.timer.is_running());
        assert_eq!(app.view, ActiveView::Tasks);
        assert_eq!(app.ui_mode, UiMode::Normal);
    }

    #[test]
    fn test_submit_add_form_creates_task() {
        let mut app = test_app();
        app.open_add_form();
        for c in "Water plants".chars() {
            app.task_form.as_mut().unwrap().push_char(c);
        }
        app.submit_task_form().unwrap();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(app.board.tasks().iter().any(|t| t.title == "Water plants"));
    }

    #[test]
    fn test_submit_form_with_unparseable_date_means_no_due_date() {
        let mut app = test_app();
        app.open_add_form();
        {
            let form = app.task_form.as_mut().unwrap();
            form.title = "Dated".to_string();
            form.due_date = "next tuesday".to_string();
            form.due_time = "noon".to_string();
        }
        app.submit_task_form().unwrap();

        let task = app
            .board
            .tasks()
            .iter()
            .find(|t| t.title == "Dated")
            .unwrap();
        assert!(task.due_date.is_none());
        assert!(task.due_time.is_none());
    }

    #[test]
    fn test_submit_form_empty_title_is_cancel() {
        let mut app = test_app();
        let before = app.board.tasks().len();
        app.open_add_form();
        app.submit_task_form().unwrap();
        assert_eq!(app.board.tasks().len(), before);
    }

    #[test]
    fn test_edit_form_round_trips_existing_values() {
        let mut app = test_app();
        app.open_add_form();
        {
            let form = app.task_form.as_mut().unwrap();
            form.title = "Original".to_string();
            form.due_date = "2025-08-20".to_string();
        }
        app.submit_task_form().unwrap();

        app.selected_index = app
            .board
            .visible_tasks()
            .iter()
            .position(|t| t.title == "Original")
            .unwrap();
        app.open_edit_form();

        let form = app.task_form.as_ref().unwrap();
        assert_eq!(form.title, "Original");
        assert_eq!(form.due_date, "2025-08-20");
        assert!(form.editing_id.is_some());
    }

    #[test]
    fn test_selection_clamps_after_deletions() {
        let mut app = test_app();
        app.selected_index = 0;
        app.delete_selected_task().unwrap(); // removes the welcome task
        assert_eq!(app.visible_len(), 0);
        assert_eq!(app.selected_index, 0);

        // Deleting with nothing selected is a no-op
        app.delete_selected_task().unwrap();
    }

    #[test]
    fn test_timer_toggle_starts_and_pauses() {
        let mut app = test_app();
        app.timer_toggle().unwrap();
        assert!(app.timer.is_running());
        app.timer_toggle().unwrap();
        assert!(!app.timer.is_running());
    }

    #[test]
    fn test_timer_config_submit_applies_coerced_input() {
        let mut app = test_app();
        app.open_timer_config();
        {
            let form = app.timer_form.as_mut().unwrap();
            form.pomodoro = "52".to_string();
            form.short_break = "oops".to_string();
        }
        app.submit_timer_config().unwrap();

        assert_eq!(app.timer.settings().pomodoro, 52);
        assert_eq!(app.timer.settings().short_break, 5); // fallback
        assert_eq!(app.timer.remaining_seconds(), 52 * 60);
    }

    #[test]
    fn test_list_manager_add_and_activate() {
        let mut app = test_app();
        app.open_list_manager();
        app.lists_begin_add();
        for c in "Errands".chars() {
            app.lists_input_char(c);
        }
        app.lists_submit_new().unwrap();

        assert_eq!(app.board.lists().len(), 2);
        assert_eq!(app.board.active_list().name, "Errands");
        assert_eq!(app.ui_mode, UiMode::Normal);
    }

    #[test]
    fn test_clear_all_data_resets_to_defaults() {
        let mut app = test_app();
        app.open_add_form();
        app.task_form.as_mut().unwrap().title = "Doomed".to_string();
        app.submit_task_form().unwrap();
        app.timer_toggle().unwrap();

        app.clear_all_data().unwrap();

        assert_eq!(app.board.tasks().len(), 1); // just the reseeded welcome
        assert!(!app.timer.is_running());
        assert_eq!(app.timer.remaining_seconds(), 25 * 60);
        assert!(app.status_text().is_some());
    }

    #[test]
    fn test_cycle_accent_persists_setting() {
        let mut app = test_app();
        let before = app.board.settings().accent_color.clone();
        app.cycle_accent_color().unwrap();
        assert_ne!(app.board.settings().accent_color, before);
    }
}
