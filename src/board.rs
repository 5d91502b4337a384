use crate::domain::{
    filtered_and_sorted, pending_count, AppSettings, Filter, List, Task, TaskDraft, TaskPatch,
    ACCENT_PALETTE,
};
use crate::persistence::{keys, read_json, write_json, KvStore};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Change notification emitted by every state-changing board operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardChange {
    Tasks,
    Lists,
    Settings,
    ActiveList,
    Filter,
    Imported,
}

/// Why an imported backup was rejected. Rejection is whole-document: no
/// partial state is ever applied.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`tasks` is missing or not an array")]
    TasksNotArray,
    #[error("`lists` is missing or not an array")]
    ListsNotArray,
    #[error("`settings` is missing or not an object")]
    SettingsNotObject,
    #[error("backup contains no lists")]
    NoLists,
}

/// The bulk export/import document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub tasks: Vec<Task>,
    pub lists: Vec<List>,
    pub settings: AppSettings,
    #[serde(default)]
    pub active_list: Option<String>,
    #[serde(default)]
    pub filter: Option<Filter>,
}

/// Validate and parse a backup document
pub fn parse_backup(text: &str) -> Result<BackupDocument, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    if !value.get("tasks").is_some_and(|v| v.is_array()) {
        return Err(ImportError::TasksNotArray);
    }
    if !value.get("lists").is_some_and(|v| v.is_array()) {
        return Err(ImportError::ListsNotArray);
    }
    if !value.get("settings").is_some_and(|v| v.is_object()) {
        return Err(ImportError::SettingsNotObject);
    }

    let document: BackupDocument = serde_json::from_value(value)?;
    if document.lists.is_empty() {
        return Err(ImportError::NoLists);
    }
    Ok(document)
}

/// Tasks grouped into lists, with the active list, filter, and display
/// settings. Every mutation persists the affected slices immediately.
#[derive(Debug)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    lists: Vec<List>,
    settings: AppSettings,
    active_list_id: String,
    filter: Filter,
    changes: Vec<BoardChange>,
}

impl TaskBoard {
    /// Restore the board from the store, seeding a default list and a
    /// welcome task on first run
    pub fn load(store: &mut dyn KvStore) -> Result<Self> {
        let stored_lists: Option<Vec<List>> = read_json(store, keys::LISTS)?;
        let stored_tasks: Option<Vec<Task>> = read_json(store, keys::TASKS)?;
        let settings: AppSettings = read_json(store, keys::SETTINGS)?.unwrap_or_default();
        let stored_active: Option<String> = read_json(store, keys::ACTIVE_LIST)?;
        let filter: Filter = read_json(store, keys::FILTER)?.unwrap_or_default();

        let mut seeded_lists = false;
        let lists = match stored_lists {
            Some(lists) if !lists.is_empty() => lists,
            _ => {
                seeded_lists = true;
                vec![List {
                    id: "default".to_string(),
                    name: "Default List".to_string(),
                    color: ACCENT_PALETTE[0].to_string(),
                }]
            }
        };

        let mut seeded_tasks = false;
        let tasks = match stored_tasks {
            Some(tasks) => tasks,
            None => {
                seeded_tasks = true;
                let mut welcome = Task::new("Welcome to your todo list", lists[0].id.clone());
                welcome.description =
                    "This is your first task. Press e to edit or d to delete.".to_string();
                vec![welcome]
            }
        };

        let active_list_id = stored_active.unwrap_or_else(|| lists[0].id.clone());

        let mut board = Self {
            tasks,
            lists,
            settings,
            active_list_id,
            filter,
            changes: Vec::new(),
        };

        let repaired = board.repair_references();
        if seeded_lists {
            board.persist_lists(store)?;
        }
        if seeded_tasks || repaired {
            board.persist_tasks(store)?;
        }
        if seeded_lists || repaired {
            board.persist_active(store)?;
        }

        Ok(board)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn active_list_id(&self) -> &str {
        &self.active_list_id
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// The active list; the at-least-one-list invariant makes this total
    pub fn active_list(&self) -> &List {
        self.lists
            .iter()
            .find(|l| l.id == self.active_list_id)
            .unwrap_or(&self.lists[0])
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks of the active list under the current filter, in display order
    pub fn visible_tasks(&self) -> Vec<&Task> {
        filtered_and_sorted(&self.tasks, &self.active_list_id, self.filter)
    }

    /// Incomplete tasks in the active list (the "items left" counter)
    pub fn pending_in_active(&self) -> usize {
        pending_count(&self.tasks, &self.active_list_id)
    }

    /// Create a task in the active list; returns its id
    pub fn add_task(&mut self, store: &mut dyn KvStore, draft: TaskDraft) -> Result<String> {
        let mut task = Task::new(draft.title, self.active_list_id.clone());
        task.description = draft.description;
        task.due_date = draft.due_date;
        task.due_time = draft.due_time;
        task.priority = draft.priority;
        let id = task.id.clone();

        self.tasks.push(task);
        self.changes.push(BoardChange::Tasks);
        self.persist_tasks(store)?;
        Ok(id)
    }

    /// Apply a partial update; returns false for an unknown id
    pub fn update_task(
        &mut self,
        store: &mut dyn KvStore,
        id: &str,
        mut patch: TaskPatch,
    ) -> Result<bool> {
        // Reassignment targets must exist; a stale list id is dropped
        if let Some(list_id) = patch.list_id.take() {
            if self.lists.iter().any(|l| l.id == list_id) {
                patch.list_id = Some(list_id);
            }
        }

        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if let Some(list_id) = patch.list_id.take() {
            task.list_id = list_id;
        }
        task.apply(patch);

        self.changes.push(BoardChange::Tasks);
        self.persist_tasks(store)?;
        Ok(true)
    }

    /// Remove a task; returns false for an unknown id
    pub fn delete_task(&mut self, store: &mut dyn KvStore, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.changes.push(BoardChange::Tasks);
        self.persist_tasks(store)?;
        Ok(true)
    }

    /// Flip a task's completed flag; returns false for an unknown id
    pub fn toggle_completion(&mut self, store: &mut dyn KvStore, id: &str) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.completed = !task.completed;
        self.changes.push(BoardChange::Tasks);
        self.persist_tasks(store)?;
        Ok(true)
    }

    /// Remove completed tasks from the active list; returns how many went
    pub fn clear_completed(&mut self, store: &mut dyn KvStore) -> Result<usize> {
        let before = self.tasks.len();
        let active = self.active_list_id.clone();
        self.tasks
            .retain(|t| t.list_id != active || !t.completed);
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.changes.push(BoardChange::Tasks);
            self.persist_tasks(store)?;
        }
        Ok(removed)
    }

    /// Create a list; returns its id
    pub fn add_list(
        &mut self,
        store: &mut dyn KvStore,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<String> {
        let list = List::new(name, color);
        let id = list.id.clone();
        self.lists.push(list);
        self.changes.push(BoardChange::Lists);
        self.persist_lists(store)?;
        Ok(id)
    }

    /// Rename or recolor a list; returns false for an unknown id
    pub fn update_list(
        &mut self,
        store: &mut dyn KvStore,
        id: &str,
        name: Option<String>,
        color: Option<String>,
    ) -> Result<bool> {
        let Some(list) = self.lists.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        if let Some(name) = name {
            list.name = name;
        }
        if let Some(color) = color {
            list.color = color;
        }
        self.changes.push(BoardChange::Lists);
        self.persist_lists(store)?;
        Ok(true)
    }

    /// Delete a list, reassigning its tasks to the first remaining list.
    /// Deleting the sole remaining list is rejected (returns false), which
    /// keeps the at-least-one-list invariant.
    pub fn delete_list(&mut self, store: &mut dyn KvStore, id: &str) -> Result<bool> {
        if self.lists.len() <= 1 || !self.lists.iter().any(|l| l.id == id) {
            return Ok(false);
        }

        self.lists.retain(|l| l.id != id);
        self.changes.push(BoardChange::Lists);

        let fallback = self.lists[0].id.clone();
        let mut tasks_moved = false;
        for task in &mut self.tasks {
            if task.list_id == id {
                task.list_id = fallback.clone();
                tasks_moved = true;
            }
        }
        if tasks_moved {
            self.changes.push(BoardChange::Tasks);
        }

        if self.active_list_id == id {
            self.active_list_id = fallback;
            self.changes.push(BoardChange::ActiveList);
            self.persist_active(store)?;
        }

        self.persist_lists(store)?;
        self.persist_tasks(store)?;
        Ok(true)
    }

    /// Switch the displayed list; returns false for an unknown id
    pub fn set_active_list(&mut self, store: &mut dyn KvStore, id: &str) -> Result<bool> {
        if !self.lists.iter().any(|l| l.id == id) {
            return Ok(false);
        }
        self.active_list_id = id.to_string();
        self.changes.push(BoardChange::ActiveList);
        self.persist_active(store)?;
        Ok(true)
    }

    /// Switch the task visibility filter
    pub fn set_filter(&mut self, store: &mut dyn KvStore, filter: Filter) -> Result<()> {
        if filter == self.filter {
            return Ok(());
        }
        self.filter = filter;
        self.changes.push(BoardChange::Filter);
        write_json(store, keys::FILTER, &self.filter)
    }

    /// Replace the display settings
    pub fn update_settings(
        &mut self,
        store: &mut dyn KvStore,
        settings: AppSettings,
    ) -> Result<()> {
        self.settings = settings;
        self.changes.push(BoardChange::Settings);
        write_json(store, keys::SETTINGS, &self.settings)
    }

    /// Serialize the full board as a pretty-printed backup document
    pub fn export_document(&self) -> Result<String> {
        let document = BackupDocument {
            tasks: self.tasks.clone(),
            lists: self.lists.clone(),
            settings: self.settings.clone(),
            active_list: Some(self.active_list_id.clone()),
            filter: Some(self.filter),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Replace the whole board from a backup document. Validation happens
    /// before any state is touched; a rejected import leaves both memory
    /// and the store exactly as they were.
    pub fn import_document(&mut self, store: &mut dyn KvStore, text: &str) -> Result<()> {
        let document = parse_backup(text)?;

        self.tasks = document.tasks;
        self.lists = document.lists;
        self.settings = document.settings;
        if let Some(active) = document.active_list {
            self.active_list_id = active;
        }
        if let Some(filter) = document.filter {
            self.filter = filter;
        }
        self.repair_references();

        self.persist_all(store)?;
        self.changes.push(BoardChange::Imported);
        Ok(())
    }

    /// Take the change notifications accumulated since the last drain
    pub fn drain_changes(&mut self) -> Vec<BoardChange> {
        std::mem::take(&mut self.changes)
    }

    /// Point the active list and any dangling task references at the first
    /// list. Returns whether anything had to change.
    fn repair_references(&mut self) -> bool {
        let mut changed = false;

        if !self.lists.iter().any(|l| l.id == self.active_list_id) {
            self.active_list_id = self.lists[0].id.clone();
            changed = true;
        }

        let fallback = self.lists[0].id.clone();
        for task in &mut self.tasks {
            if !self.lists.iter().any(|l| l.id == task.list_id) {
                task.list_id = fallback.clone();
                changed = true;
            }
        }

        changed
    }

    fn persist_tasks(&self, store: &mut dyn KvStore) -> Result<()> {
        write_json(store, keys::TASKS, &self.tasks)
    }

    fn persist_lists(&self, store: &mut dyn KvStore) -> Result<()> {
        write_json(store, keys::LISTS, &self.lists)
    }

    fn persist_active(&self, store: &mut dyn KvStore) -> Result<()> {
        write_json(store, keys::ACTIVE_LIST, &self.active_list_id)
    }

    fn persist_all(&self, store: &mut dyn KvStore) -> Result<()> {
        self.persist_tasks(store)?;
        self.persist_lists(store)?;
        write_json(store, keys::SETTINGS, &self.settings)?;
        self.persist_active(store)?;
        write_json(store, keys::FILTER, &self.filter)
    }
}
