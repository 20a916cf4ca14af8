// Error types for task list operations

use thiserror::Error;

/// Errors raised by task list operations
///
/// Every variant is local to the command that triggered it; none of them
/// leave the session unusable.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A required field was empty or whitespace-only
    #[error("{0}")]
    Validation(String),

    /// An operation referenced a position outside the store
    #[error("Task index {index} out of bounds (store has {len} tasks)")]
    Index { index: usize, len: usize },

    /// An id or id prefix matched no task (or more than one)
    #[error("No unique task matches '{0}'")]
    UnknownTask(String),

    /// Reading or writing the storage backend failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// An import payload did not have the expected shape
    #[error("Invalid import file: {0}")]
    ImportFormat(String),

    /// The message dispatcher could not deliver a contact message
    #[error("Failed to dispatch message: {0}")]
    Dispatch(String),
}

impl TaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TaskError::Validation(msg.into())
    }

    pub fn import_format(msg: impl Into<String>) -> Self {
        TaskError::ImportFormat(msg.into())
    }
}

impl From<rusqlite::Error> for TaskError {
    fn from(e: rusqlite::Error) -> Self {
        TaskError::Storage(e.to_string())
    }
}

pub type TaskResult<T> = std::result::Result<T, TaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_display() {
        let err = TaskError::Index { index: 5, len: 2 };
        assert_eq!(err.to_string(), "Task index 5 out of bounds (store has 2 tasks)");
    }

    #[test]
    fn test_validation_display_is_message() {
        let err = TaskError::validation("Task cannot be empty!");
        assert_eq!(err.to_string(), "Task cannot be empty!");
    }
}
