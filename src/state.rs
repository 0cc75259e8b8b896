use std::sync::{Arc, Mutex};

use crate::models::{fresh_id, Subtask, Task, TaskDetails, Timestamp};
use crate::stats::Stats;
use crate::undo::{UndoAction, UndoSlot};
use crate::view::{Filter, SortKey, ViewState};

/// Owns the task collection plus the ephemeral view state, undo slot and
/// last-computed stats. Everything else reads clones and mutates through the
/// methods here; the handle is shared with the refresh loop, hence the mutex.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppData>>,
}

struct AppData {
    tasks: Vec<Task>,
    view: ViewState,
    undo: UndoSlot,
    stats: Stats,
}

impl AppState {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppData {
                tasks,
                view: ViewState::default(),
                undo: UndoSlot::default(),
                stats: Stats::default(),
            })),
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.clone()
    }

    pub fn view(&self) -> ViewState {
        let guard = self.inner.lock().expect("state poisoned");
        guard.view.clone()
    }

    pub fn stats(&self) -> Stats {
        let guard = self.inner.lock().expect("state poisoned");
        guard.stats
    }

    pub fn set_stats(&self, stats: Stats) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.stats = stats;
    }

    pub fn find(&self, task_id: &str) -> Option<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.iter().find(|t| t.id == task_id).cloned()
    }

    /// New tasks go to the front of the raw order (most-recent-first).
    pub fn insert_front(&self, task: Task) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks.insert(0, task);
    }

    /// Recurring clones go to the back.
    pub fn push_back(&self, task: Task) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks.push(task);
    }

    pub fn replace_all(&self, tasks: Vec<Task>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks = tasks;
    }

    /// Flips completion and returns the updated task.
    pub fn toggle_completed(&self, task_id: &str) -> Option<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let task = guard.tasks.iter_mut().find(|t| t.id == task_id)?;
        task.completed = !task.completed;
        Some(task.clone())
    }

    pub fn set_text(&self, task_id: &str, text: &str) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        match guard.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.text = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn apply_details(&self, task_id: &str, details: TaskDetails) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let Some(task) = guard.tasks.iter_mut().find(|t| t.id == task_id) else {
            return false;
        };
        let text = details.text.trim();
        if !text.is_empty() {
            task.text = text.to_string();
        }
        task.description = details.description;
        task.priority = details.priority;
        task.category = details.category;
        task.due_at = details.due_at;
        true
    }

    pub fn remove(&self, task_id: &str) -> Option<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let index = guard.tasks.iter().position(|t| t.id == task_id)?;
        Some(guard.tasks.remove(index))
    }

    /// Marks every bulk-selected task completed. Selection is cleared
    /// regardless of how many ids still resolved.
    pub fn complete_selected(&self) -> usize {
        let mut guard = self.inner.lock().expect("state poisoned");
        let selected = std::mem::take(&mut guard.view.selected);
        let mut completed = 0;
        for task in guard.tasks.iter_mut() {
            if selected.contains(&task.id) {
                task.completed = true;
                completed += 1;
            }
        }
        completed
    }

    /// Removes every bulk-selected task, returning the batch in raw order.
    /// Selection is cleared regardless of outcome.
    pub fn remove_selected(&self) -> Vec<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let selected = std::mem::take(&mut guard.view.selected);
        let mut removed = Vec::new();
        guard.tasks.retain(|task| {
            if selected.contains(&task.id) {
                removed.push(task.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Reinserts a batch at the front of the raw order, preserving its
    /// relative order (undo restore).
    pub fn restore_front(&self, batch: Vec<Task>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks.splice(0..0, batch);
    }

    /// Moves `moved_id` to the index `target_id` occupied before the removal.
    /// No-op when either id is missing or they are the same task. This mutates
    /// raw order only; a non-default sort will still reorder the view.
    pub fn reorder(&self, moved_id: &str, target_id: &str) -> bool {
        if moved_id == target_id {
            return false;
        }
        let mut guard = self.inner.lock().expect("state poisoned");
        let from = guard.tasks.iter().position(|t| t.id == moved_id);
        let to = guard.tasks.iter().position(|t| t.id == target_id);
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };
        let moved = guard.tasks.remove(from);
        guard.tasks.insert(to, moved);
        true
    }

    pub fn add_subtask(&self, task_id: &str, text: String) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        match guard.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.subtasks.push(Subtask {
                    id: fresh_id(),
                    text,
                    completed: false,
                });
                true
            }
            None => false,
        }
    }

    pub fn toggle_subtask(&self, task_id: &str, subtask_id: &str) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let Some(task) = guard.tasks.iter_mut().find(|t| t.id == task_id) else {
            return false;
        };
        match task.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            Some(subtask) => {
                subtask.completed = !subtask.completed;
                true
            }
            None => false,
        }
    }

    pub fn remove_subtask(&self, task_id: &str, subtask_id: &str) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let Some(task) = guard.tasks.iter_mut().find(|t| t.id == task_id) else {
            return false;
        };
        let before = task.subtasks.len();
        task.subtasks.retain(|s| s.id != subtask_id);
        task.subtasks.len() != before
    }

    pub fn set_filter(&self, filter: Filter) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.view.filter = filter;
    }

    pub fn set_search(&self, query: &str) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.view.search = query.to_lowercase();
    }

    pub fn set_sort(&self, sort: SortKey) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.view.sort = sort;
    }

    pub fn set_category(&self, category: Option<String>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.view.category = category;
    }

    /// Entering or leaving bulk mode always drops the selection.
    pub fn set_bulk_mode(&self, enabled: bool) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.view.bulk_mode = enabled;
        guard.view.selected.clear();
    }

    pub fn toggle_select(&self, task_id: &str, selected: bool) {
        let mut guard = self.inner.lock().expect("state poisoned");
        if selected {
            guard.view.selected.insert(task_id.to_string());
        } else {
            guard.view.selected.remove(task_id);
        }
    }

    pub fn capture_undo(&self, action: UndoAction, now: Timestamp) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.undo.capture(action, now);
    }

    pub fn take_undo(&self, now: Timestamp) -> Option<UndoAction> {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.undo.take(now)
    }

    pub fn clear_expired_undo(&self, now: Timestamp) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.undo.clear_expired(now);
    }
}
