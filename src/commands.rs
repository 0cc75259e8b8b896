use chrono::Utc;

use crate::models::{Task, TaskDetails, TaskExtras, Timestamp};
use crate::repeat::spawn_next;
use crate::state::AppState;
use crate::stats;
use crate::storage::{BlobStore, FileStore, StorageError, STORAGE_KEY};
use crate::undo::UndoAction;
use crate::view::{self, Filter, SortKey, ViewPayload};

/// Seam to the world outside the engine: the key/value persistence
/// collaborator, the rendering collaborator, non-fatal user notification and
/// the clock. Production wires a [`ShellCtx`]; tests swap in a mock.
pub trait EngineCtx {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn render(&self, payload: ViewPayload);
    fn notify(&self, message: &str);
    fn now_ms(&self) -> Timestamp;
}

/// Default glue: file-backed store, caller-supplied render callback, warn-level
/// notifications, wall clock.
pub struct ShellCtx<R: Fn(ViewPayload)> {
    store: FileStore,
    render: R,
}

impl<R: Fn(ViewPayload)> ShellCtx<R> {
    pub fn new(store: FileStore, render: R) -> Self {
        Self { store, render }
    }
}

impl<R: Fn(ViewPayload)> EngineCtx for ShellCtx<R> {
    fn get_item(&self, key: &str) -> Option<String> {
        self.store.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set_item(key, value)
    }

    fn render(&self, payload: ViewPayload) {
        (self.render)(payload);
    }

    fn notify(&self, message: &str) {
        log::warn!("{message}");
    }

    fn now_ms(&self) -> Timestamp {
        Utc::now().timestamp_millis()
    }
}

/// Full-collection overwrite under the fixed key. A write failure is never
/// fatal: the in-memory state stays authoritative, the user gets a non-fatal
/// notification, and the next successful write heals the blob.
fn persist(ctx: &impl EngineCtx, state: &AppState) {
    let tasks = state.tasks();
    let json = match serde_json::to_string(&tasks) {
        Ok(json) => json,
        Err(error) => {
            log::error!("task serialization failed: {error}");
            ctx.notify("Could not save your tasks");
            return;
        }
    };
    if let Err(error) = ctx.set_item(STORAGE_KEY, &json) {
        log::warn!("task save failed, keeping in-memory state: {error}");
        ctx.notify("Could not save your tasks");
    }
}

/// Recomputes stats, sweeps the expired undo slot, re-derives the visible set
/// and pushes it to the renderer.
pub(crate) fn refresh(ctx: &impl EngineCtx, state: &AppState) {
    let now = ctx.now_ms();
    state.clear_expired_undo(now);
    let tasks = state.tasks();
    let computed = stats::compute(&tasks, stats::local_day_start_ms(now));
    state.set_stats(computed);
    ctx.render(view::build_payload(&tasks, &state.view(), computed, now));
}

fn commit(ctx: &impl EngineCtx, state: &AppState) {
    persist(ctx, state);
    refresh(ctx, state);
}

/// Restores the persisted collection, or starts empty when the blob is missing
/// or corrupt. Never errors outward.
pub fn load_state(ctx: &impl EngineCtx, state: &AppState) {
    let tasks = match ctx.get_item(STORAGE_KEY) {
        Some(raw) => match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => tasks,
            Err(error) => {
                log::warn!("persisted tasks unreadable, starting empty: {error}");
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    state.replace_all(tasks);
    refresh(ctx, state);
}

/// No-op when the trimmed text is empty. New tasks land at raw index 0.
pub fn add_task(
    ctx: &impl EngineCtx,
    state: &AppState,
    text: &str,
    extras: TaskExtras,
) -> Option<Task> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let task = Task::new(text.to_string(), ctx.now_ms(), extras);
    state.insert_front(task.clone());
    commit(ctx, state);
    Some(task)
}

/// Flips completion. Completing a recurring task appends its next instance to
/// the back of the raw order; the completed original stays in place.
pub fn toggle_task(ctx: &impl EngineCtx, state: &AppState, task_id: &str) -> Option<Task> {
    let task = state.toggle_completed(task_id)?;
    if task.completed {
        if let Some(next) = spawn_next(&task) {
            state.push_back(next);
        }
    }
    commit(ctx, state);
    Some(task)
}

/// Removes the task and makes it reversible for the undo window.
pub fn delete_task(ctx: &impl EngineCtx, state: &AppState, task_id: &str) -> bool {
    let Some(removed) = state.remove(task_id) else {
        return false;
    };
    state.capture_undo(UndoAction::Delete(removed), ctx.now_ms());
    commit(ctx, state);
    true
}

/// Emptying the text deletes the task instead of erroring; otherwise the text
/// is updated in place. Missing id is a silent no-op.
pub fn edit_task(ctx: &impl EngineCtx, state: &AppState, task_id: &str, new_text: &str) {
    let text = new_text.trim();
    if text.is_empty() {
        delete_task(ctx, state, task_id);
        return;
    }
    if state.set_text(task_id, text) {
        commit(ctx, state);
    }
}

/// Modal save: description, priority, category and due date; a blank new title
/// keeps the old text.
pub fn edit_details(
    ctx: &impl EngineCtx,
    state: &AppState,
    task_id: &str,
    details: TaskDetails,
) -> bool {
    if !state.apply_details(task_id, details) {
        return false;
    }
    commit(ctx, state);
    true
}

/// Marks the bulk selection completed. No recurring spawn here; selection is
/// cleared regardless of how many ids resolved.
pub fn bulk_complete(ctx: &impl EngineCtx, state: &AppState) {
    state.complete_selected();
    commit(ctx, state);
}

/// Removes the bulk selection and captures the whole batch as one undo action.
pub fn bulk_delete(ctx: &impl EngineCtx, state: &AppState) {
    let removed = state.remove_selected();
    if !removed.is_empty() {
        state.capture_undo(UndoAction::BulkDelete(removed), ctx.now_ms());
    }
    commit(ctx, state);
}

pub fn add_subtask(ctx: &impl EngineCtx, state: &AppState, task_id: &str, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if state.add_subtask(task_id, text.to_string()) {
        commit(ctx, state);
    }
}

pub fn toggle_subtask(ctx: &impl EngineCtx, state: &AppState, task_id: &str, subtask_id: &str) {
    if state.toggle_subtask(task_id, subtask_id) {
        commit(ctx, state);
    }
}

pub fn delete_subtask(ctx: &impl EngineCtx, state: &AppState, task_id: &str, subtask_id: &str) {
    if state.remove_subtask(task_id, subtask_id) {
        commit(ctx, state);
    }
}

/// Mutates raw (persisted) order only. Under the default newest-first sort the
/// view does not change; raw order is the pre-sort input to the pipeline.
pub fn reorder_tasks(ctx: &impl EngineCtx, state: &AppState, moved_id: &str, target_id: &str) {
    if state.reorder(moved_id, target_id) {
        commit(ctx, state);
    }
}

/// Reverses the pending destructive action while its window is open. A single
/// delete returns to raw index 0; a bulk batch returns to the front as a block
/// in its original relative order.
pub fn undo_last(ctx: &impl EngineCtx, state: &AppState) -> bool {
    let Some(action) = state.take_undo(ctx.now_ms()) else {
        return false;
    };
    match action {
        UndoAction::Delete(task) => state.restore_front(vec![task]),
        UndoAction::BulkDelete(batch) => state.restore_front(batch),
    }
    commit(ctx, state);
    true
}

pub fn set_filter(ctx: &impl EngineCtx, state: &AppState, filter: Filter) {
    state.set_filter(filter);
    refresh(ctx, state);
}

pub fn set_search(ctx: &impl EngineCtx, state: &AppState, query: &str) {
    state.set_search(query);
    refresh(ctx, state);
}

pub fn set_sort(ctx: &impl EngineCtx, state: &AppState, sort: SortKey) {
    state.set_sort(sort);
    refresh(ctx, state);
}

pub fn set_category(ctx: &impl EngineCtx, state: &AppState, category: Option<String>) {
    state.set_category(category);
    refresh(ctx, state);
}

pub fn set_bulk_mode(ctx: &impl EngineCtx, state: &AppState, enabled: bool) {
    state.set_bulk_mode(enabled);
    refresh(ctx, state);
}

pub fn toggle_select(ctx: &impl EngineCtx, state: &AppState, task_id: &str, selected: bool) {
    state.toggle_select(task_id, selected);
    refresh(ctx, state);
}

/// A JSON array fully replaces the collection and persists immediately; any
/// other payload is discarded with a warning and leaves the state untouched.
pub fn import_tasks(ctx: &impl EngineCtx, state: &AppState, raw: &str) -> bool {
    match serde_json::from_str::<Vec<Task>>(raw) {
        Ok(tasks) => {
            state.replace_all(tasks);
            commit(ctx, state);
            true
        }
        Err(error) => {
            log::warn!("import discarded, payload is not a task array: {error}");
            false
        }
    }
}

/// Pretty-printed JSON of the full raw collection; the active view state never
/// filters an export.
pub fn export_tasks(state: &AppState) -> String {
    let tasks = state.tasks();
    match serde_json::to_string_pretty(&tasks) {
        Ok(json) => json,
        Err(error) => {
            log::error!("export serialization failed: {error}");
            String::new()
        }
    }
}
