//! Taskdeck core: the task model, mutation operations, derivation pipeline,
//! single-slot undo and today/streak stats behind a small collaborator seam.
//! The visual shell (widgets, theme, gestures, dialogs) lives outside and
//! talks to the engine through [`commands::EngineCtx`].

pub mod commands;
pub mod logging;
pub mod models;
pub mod repeat;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod storage;
pub mod undo;
pub mod view;

pub use commands::{EngineCtx, ShellCtx};
pub use models::{Priority, Recurring, Subtask, Task, TaskDetails, TaskExtras, Timestamp};
pub use state::AppState;
pub use stats::{Stats, TodayStats};
pub use storage::{BlobStore, FileStore, StorageError, STORAGE_KEY};
pub use undo::{UndoAction, UNDO_WINDOW_MS};
pub use view::{Filter, SortKey, ViewPayload, ViewState};
