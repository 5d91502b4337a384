use crate::app::AppState;
use crate::domain::{ActiveView, TimerMode, UiMode};
use crate::persistence::KvStore;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

/// Handle a keyboard event; returns true when the app should quit
pub fn handle_key<S: KvStore>(app: &mut AppState<S>, key: KeyEvent) -> Result<bool> {
    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::TaskForm => handle_task_form(app, key),
        UiMode::TimerConfig => handle_timer_config(app, key),
        UiMode::ListManager => handle_list_manager(app, key),
        UiMode::ConfirmClear => handle_confirm_clear(app, key),
    }
}

fn handle_normal_mode<S: KvStore>(app: &mut AppState<S>, key: KeyEvent) -> Result<bool> {
    // Keys shared by both views
    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Tab => {
            app.toggle_view();
            return Ok(false);
        }
        // Wipe everything (asks for confirmation first)
        KeyCode::Char('!') => {
            app.open_confirm_clear();
            return Ok(false);
        }
        _ => {}
    }

    match app.view {
        ActiveView::Tasks => handle_tasks_view(app, key),
        ActiveView::Timer => handle_timer_view(app, key),
    }
}

fn handle_tasks_view<S: KvStore>(app: &mut AppState<S>, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),

        // Toggle completion
        KeyCode::Enter | KeyCode::Char('x') => app.toggle_selected_task()?,

        // Task CRUD
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_task()?,

        // View controls
        KeyCode::Char('f') => app.cycle_filter()?,
        KeyCode::Char('l') => app.open_list_manager(),
        KeyCode::Char('c') => app.clear_completed()?,

        // Appearance
        KeyCode::Char('t') => app.cycle_accent_color()?,
        KeyCode::Char('b') => app.toggle_dark_mode()?,

        _ => {}
    }
    Ok(false)
}

fn handle_timer_view<S: KvStore>(app: &mut AppState<S>, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Start / pause
        KeyCode::Char(' ') => app.timer_toggle()?,
        KeyCode::Char('r') => app.timer_reset()?,

        // Session modes
        KeyCode::Char('1') => app.timer_change_mode(TimerMode::Pomodoro)?,
        KeyCode::Char('2') => app.timer_change_mode(TimerMode::ShortBreak)?,
        KeyCode::Char('3') => app.timer_change_mode(TimerMode::LongBreak)?,

        // Configuration and decoration
        KeyCode::Char('o') => app.open_timer_config(),
        KeyCode::Char('n') => app.next_scene(),

        _ => {}
    }
    Ok(false)
}

fn handle_task_form<S: KvStore>(app: &mut AppState<S>, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.cancel_task_form(),
        KeyCode::Enter => app.submit_task_form()?,
        KeyCode::Tab => {
            if let Some(form) = &mut app.task_form {
                form.next_field();
            }
        }
        // Arrows cycle the priority; text fields don't need them
        KeyCode::Up | KeyCode::Down => {
            if let Some(form) = &mut app.task_form {
                form.priority = form.priority.next();
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = &mut app.task_form {
                form.backspace();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = &mut app.task_form {
                form.push_char(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_timer_config<S: KvStore>(app: &mut AppState<S>, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.cancel_timer_config(),
        KeyCode::Enter => app.submit_timer_config()?,
        KeyCode::Tab => {
            if let Some(form) = &mut app.timer_form {
                form.next_field();
            }
        }
        // Arrows toggle the completion sound
        KeyCode::Up | KeyCode::Down => {
            if let Some(form) = &mut app.timer_form {
                form.sound_enabled = !form.sound_enabled;
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = &mut app.timer_form {
                form.backspace();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = &mut app.timer_form {
                form.push_char(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_list_manager<S: KvStore>(app: &mut AppState<S>, key: KeyEvent) -> Result<bool> {
    let entering_name = app
        .list_manager
        .as_ref()
        .is_some_and(|s| s.new_name.is_some());

    if entering_name {
        match key.code {
            KeyCode::Esc => app.lists_cancel_add(),
            KeyCode::Enter => app.lists_submit_new()?,
            KeyCode::Backspace => app.lists_backspace(),
            KeyCode::Char(c) => app.lists_input_char(c),
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('l') => app.close_list_manager(),
        KeyCode::Up => app.lists_move_up(),
        KeyCode::Down => app.lists_move_down(),
        KeyCode::Enter => app.lists_activate_selected()?,
        KeyCode::Char('n') => app.lists_begin_add(),
        KeyCode::Char('c') => app.lists_cycle_color(),
        KeyCode::Char('d') | KeyCode::Delete => app.lists_delete_selected()?,
        _ => {}
    }
    Ok(false)
}

fn handle_confirm_clear<S: KvStore>(app: &mut AppState<S>, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') => app.clear_all_data()?,
        KeyCode::Char('n') | KeyCode::Esc => app.cancel_confirm_clear(),
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn create_test_app() -> AppState<MemoryStore> {
        AppState::new(MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_quit_key() {
        let mut app = create_test_app();
        assert!(handle_key(&mut app, key(KeyCode::Char('q'))).unwrap());
        assert!(!handle_key(&mut app, key(KeyCode::Char('z'))).unwrap());
    }

    #[test]
    fn test_tab_switches_views() {
        let mut app = create_test_app();
        assert_eq!(app.view, ActiveView::Tasks);

        handle_key(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.view, ActiveView::Timer);

        handle_key(&mut app, key(KeyCode::Tab)).unwrap();
        assert_eq!(app.view, ActiveView::Tasks);
    }

    #[test]
    fn test_add_task_through_form() {
        let mut app = create_test_app();
        let initial_count = app.board.tasks().len();

        handle_key(&mut app, key(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::TaskForm);

        for c in "Call dentist".chars() {
            handle_key(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.board.tasks().len(), initial_count + 1);
        assert!(app.board.tasks().iter().any(|t| t.title == "Call dentist"));
    }

    #[test]
    fn test_form_escape_cancels() {
        let mut app = create_test_app();
        let initial_count = app.board.tasks().len();

        handle_key(&mut app, key(KeyCode::Char('a'))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('x'))).unwrap();
        handle_key(&mut app, key(KeyCode::Esc)).unwrap();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.board.tasks().len(), initial_count);
    }

    #[test]
    fn test_toggle_completion_with_enter() {
        let mut app = create_test_app();
        assert!(!app.board.visible_tasks()[0].completed);

        handle_key(&mut app, key(KeyCode::Enter)).unwrap();

        // The welcome task is now completed (and sorted last)
        assert!(app.board.tasks()[0].completed);
    }

    #[test]
    fn test_timer_keys_only_work_on_timer_view() {
        let mut app = create_test_app();

        // Space on the tasks view does not start the timer
        handle_key(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert!(!app.timer.is_running());

        handle_key(&mut app, key(KeyCode::Tab)).unwrap();
        handle_key(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert!(app.timer.is_running());

        handle_key(&mut app, key(KeyCode::Char('2'))).unwrap();
        assert_eq!(app.timer.mode(), TimerMode::ShortBreak);
        assert!(!app.timer.is_running());
    }

    #[test]
    fn test_clear_data_requires_confirmation() {
        let mut app = create_test_app();
        handle_key(&mut app, key(KeyCode::Char('a'))).unwrap();
        for c in "Keep me".chars() {
            handle_key(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();

        handle_key(&mut app, key(KeyCode::Char('!'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::ConfirmClear);

        // Declining leaves everything in place
        handle_key(&mut app, key(KeyCode::Char('n'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(app.board.tasks().iter().any(|t| t.title == "Keep me"));

        // Confirming wipes the board back to the seeded default
        handle_key(&mut app, key(KeyCode::Char('!'))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('y'))).unwrap();
        assert!(app.board.tasks().iter().all(|t| t.title != "Keep me"));
    }

    #[test]
    fn test_list_manager_flow() {
        let mut app = create_test_app();

        handle_key(&mut app, key(KeyCode::Char('l'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::ListManager);

        handle_key(&mut app, key(KeyCode::Char('n'))).unwrap();
        for c in "Side projects".chars() {
            handle_key(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.board.active_list().name, "Side projects");
    }

    #[test]
    fn test_deleting_last_list_is_rejected_via_keys() {
        let mut app = create_test_app();

        handle_key(&mut app, key(KeyCode::Char('l'))).unwrap();
        handle_key(&mut app, key(KeyCode::Char('d'))).unwrap();

        assert_eq!(app.board.lists().len(), 1);
    }
}
