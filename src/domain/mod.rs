pub mod enums;
pub mod settings;
pub mod task;
pub mod views;

pub use enums::{ActiveView, Filter, Priority, TimerMode, UiMode};
pub use settings::{AppSettings, ACCENT_PALETTE};
pub use task::{new_id, now_millis, List, Task, TaskDraft, TaskPatch};
pub use views::{due_label, filtered_and_sorted, pending_count};
