use super::enums::Filter;
use super::task::Task;
use chrono::{Duration, NaiveDate, NaiveTime};
use std::cmp::Ordering;

/// Project the tasks of one list through a filter, in display order.
///
/// Ordering: incomplete before completed; among incomplete, higher priority
/// first; then by due timestamp when both sides have a due date; otherwise by
/// creation time. The sort is stable, so tasks nothing differentiates keep
/// their original relative order.
pub fn filtered_and_sorted<'a>(tasks: &'a [Task], list_id: &str, filter: Filter) -> Vec<&'a Task> {
    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.list_id == list_id && filter_matches(task, filter))
        .collect();
    visible.sort_by(|a, b| compare_tasks(a, b));
    visible
}

fn filter_matches(task: &Task, filter: Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Active => !task.completed,
        Filter::Completed => task.completed,
    }
}

fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    match (a.completed, b.completed) {
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }

    if !a.completed {
        let by_priority = a.priority.rank().cmp(&b.priority.rank());
        if by_priority != Ordering::Equal {
            return by_priority;
        }
    }

    if let (Some(a_due), Some(b_due)) = (a.due_at(), b.due_at()) {
        return a_due.cmp(&b_due);
    }

    a.created_at.cmp(&b.created_at)
}

/// Number of incomplete tasks in a list, regardless of the current filter
/// (the "N items left" counter)
pub fn pending_count(tasks: &[Task], list_id: &str) -> usize {
    tasks
        .iter()
        .filter(|task| task.list_id == list_id && !task.completed)
        .count()
}

/// Human label for a due date relative to `today`: "Today", "Tomorrow", or
/// a short month-day form, with the time appended when one is set
pub fn due_label(date: NaiveDate, time: Option<NaiveTime>, today: NaiveDate) -> String {
    let day = if date == today {
        "Today".to_string()
    } else if date == today + Duration::days(1) {
        "Tomorrow".to_string()
    } else {
        date.format("%b %-d").to_string()
    };

    match time {
        Some(t) => format!("{}, {}", day, t.format("%-I:%M %p")),
        None => day,
    }
}
