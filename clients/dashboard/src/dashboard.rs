//! Filtering, sorting and summary figures for the task list
//!
//! Everything here is a pure function over a slice of tasks, so the view can
//! recompute on every draw.

use chrono::NaiveDate;
use common::models::{Task, TaskPriority, TaskStatus};
use std::fmt;

/// Exact-match filter where `All` lets everything through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq + Copy> Filter<T> {
    pub fn matches(&self, value: T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => *wanted == value,
        }
    }

    /// Step to the next choice: All, then each of `choices`, then back to All
    pub fn next(self, choices: &[T]) -> Self {
        match self {
            Filter::All => choices.first().copied().map_or(Filter::All, Filter::Only),
            Filter::Only(current) => choices
                .iter()
                .position(|choice| *choice == current)
                .and_then(|index| choices.get(index + 1))
                .copied()
                .map_or(Filter::All, Filter::Only),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("All"),
            Filter::Only(value) => value.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// High before Medium before Low
    #[default]
    Priority,
    /// Earliest due date first, undated last
    Date,
}

impl SortBy {
    pub fn toggle(self) -> Self {
        match self {
            SortBy::Priority => SortBy::Date,
            SortBy::Date => SortBy::Priority,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Priority => f.write_str("Priority"),
            SortBy::Date => f.write_str("Date"),
        }
    }
}

/// Current filter and sort selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardView {
    pub status: Filter<TaskStatus>,
    pub priority: Filter<TaskPriority>,
    pub sort_by: SortBy,
}

impl DashboardView {
    /// Tasks that pass both filters, in display order
    pub fn visible<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let mut visible = filter_tasks(tasks, self.status, self.priority);
        sort_tasks(&mut visible, self.sort_by);
        visible
    }
}

/// Undated tasks sort as if due on this day
fn far_future() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

pub fn filter_tasks(
    tasks: &[Task],
    status: Filter<TaskStatus>,
    priority: Filter<TaskPriority>,
) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| status.matches(task.status) && priority.matches(task.priority))
        .collect()
}

/// Stable sort; ties keep their incoming order
pub fn sort_tasks(tasks: &mut [&Task], sort_by: SortBy) {
    match sort_by {
        SortBy::Priority => tasks.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
        SortBy::Date => {
            let last = far_future();
            tasks.sort_by_key(|task| task.due_date.unwrap_or(last));
        }
    }
}

/// Counts shown in the overview panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Todo => stats.todo += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
            stats
        })
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }
}

#[cfg(test)]
pub(crate) fn task(title: &str, status: TaskStatus, priority: TaskPriority, due: Option<&str>) -> Task {
    let now = chrono::Utc::now();
    Task {
        id: uuid::Uuid::new_v4(),
        title: title.to_string(),
        status,
        due_date: due.map(|d| d.parse().unwrap()),
        priority,
        user_id: uuid::Uuid::nil(),
        created_at: now,
        updated_at: now,
    }
}
