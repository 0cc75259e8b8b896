use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::models::{Task, Timestamp};
use crate::stats::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first; the default view. Missing `created_at` sorts as 0.
    #[default]
    CreatedDesc,
    NameAsc,
    /// Ascending by due date; tasks without one sort last.
    DueAsc,
    PriorityDesc,
}

/// Ephemeral view state; never persisted. The search query is stored
/// lowercased so matching stays case-insensitive without re-lowering per task
/// comparison it is checked against.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub filter: Filter,
    pub search: String,
    /// `None` means "all categories"; otherwise case-insensitive equality.
    pub category: Option<String>,
    pub sort: SortKey,
    pub bulk_mode: bool,
    pub selected: HashSet<String>,
}

/// The derivation pipeline: status filter, category filter, search, then a
/// stable sort. Pure; the raw collection is never mutated and unchanged inputs
/// always produce the same output.
pub fn visible_tasks(tasks: &[Task], view: &ViewState) -> Vec<Task> {
    let mut shown: Vec<Task> = tasks
        .iter()
        .filter(|t| match view.filter {
            Filter::All => true,
            Filter::Active => !t.completed,
            Filter::Completed => t.completed,
            Filter::High => t.priority == crate::models::Priority::High,
        })
        .filter(|t| match &view.category {
            None => true,
            Some(category) => t.category.to_lowercase() == category.to_lowercase(),
        })
        .filter(|t| {
            if view.search.is_empty() {
                return true;
            }
            let haystack =
                format!("{} {} {}", t.emoji, t.text, t.category).to_lowercase();
            haystack.contains(&view.search)
        })
        .cloned()
        .collect();
    shown.sort_by(|a, b| compare_tasks(a, b, view.sort));
    shown
}

fn compare_tasks(a: &Task, b: &Task, sort: SortKey) -> Ordering {
    match sort {
        SortKey::NameAsc => a.text.cmp(&b.text),
        SortKey::DueAsc => a
            .due_at
            .unwrap_or(i64::MAX)
            .cmp(&b.due_at.unwrap_or(i64::MAX)),
        SortKey::PriorityDesc => b.priority.rank().cmp(&a.priority.rank()),
        SortKey::CreatedDesc => b.created_at.cmp(&a.created_at),
    }
}

/// Due-date display classification, first threshold that fits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueInfo {
    pub label: String,
    pub overdue: bool,
}

pub fn due_info(due_at: Option<Timestamp>, now: Timestamp) -> DueInfo {
    let Some(due) = due_at else {
        return DueInfo {
            label: "No due date".to_string(),
            overdue: false,
        };
    };
    let diff = due - now;
    if diff < 0 {
        return DueInfo {
            label: "Overdue".to_string(),
            overdue: true,
        };
    }
    let minutes = diff / 60_000;
    if minutes < 60 {
        return DueInfo {
            label: format!("{minutes}m"),
            overdue: false,
        };
    }
    let hours = minutes / 60;
    if hours < 24 {
        return DueInfo {
            label: format!("{hours}h"),
            overdue: false,
        };
    }
    let days = hours / 24;
    DueInfo {
        label: format!("{days}d"),
        overdue: false,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub due: DueInfo,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Everything the rendering collaborator consumes: the ordered visible
/// sequence with per-task display fields, plus the sidebar/stat numbers.
#[derive(Debug, Clone, Serialize)]
pub struct ViewPayload {
    pub tasks: Vec<TaskView>,
    pub remaining: usize,
    pub stats: Stats,
    pub bulk_mode: bool,
    pub selected_count: usize,
    pub categories: Vec<CategoryCount>,
    pub all_done: bool,
}

pub fn build_payload(
    tasks: &[Task],
    view: &ViewState,
    stats: Stats,
    now: Timestamp,
) -> ViewPayload {
    let shown = visible_tasks(tasks, view)
        .into_iter()
        .map(|task| TaskView {
            due: due_info(task.due_at, now),
            selected: view.bulk_mode && view.selected.contains(&task.id),
            task,
        })
        .collect();
    let remaining = tasks.iter().filter(|t| !t.completed).count();
    ViewPayload {
        tasks: shown,
        remaining,
        stats,
        bulk_mode: view.bulk_mode,
        selected_count: if view.bulk_mode { view.selected.len() } else { 0 },
        categories: category_counts(tasks),
        all_done: !tasks.is_empty() && remaining == 0,
    }
}

fn category_counts(tasks: &[Task]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for task in tasks {
        let category = task.category.trim();
        if category.is_empty() {
            continue;
        }
        *counts.entry(category).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
        })
        .collect()
}
