// tasklist - Local task list manager with filtered views, batch edits and JSON import/export

pub mod app;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod jsonl;
pub mod lock;
pub mod models;
pub mod notify;
pub mod persistence;
pub mod render;
pub mod selection;
pub mod sort;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod view;

// Re-export main types for convenience
pub use app::App;
pub use config::Config;
pub use dispatch::{ContactMessage, MessageDispatcher, OutboxDispatcher};
pub use error::{TaskError, TaskResult};
pub use filter::FilterMode;
pub use models::{Priority, Task, TaskDraft, TaskId, now_ms};
pub use sort::SortMode;
pub use storage::{KeyValueStore, MemoryStorage, SqliteStorage};
pub use store::TaskStore;
