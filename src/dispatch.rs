// Contact message dispatch

use crate::error::{TaskError, TaskResult};
use crate::jsonl;
use crate::models::now_ms;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// A message submitted through the contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Presence checks only; all three fields are required
    pub fn validate(&self) -> TaskResult<()> {
        for (field, value) in [("name", &self.name), ("email", &self.email), ("message", &self.message)] {
            if value.trim().is_empty() {
                return Err(TaskError::validation(format!("Contact {} cannot be empty!", field)));
            }
        }
        Ok(())
    }
}

/// Delivers contact messages somewhere outside the task list
///
/// Outcomes only ever change what the user is told; they never touch tasks.
pub trait MessageDispatcher {
    fn send(&self, message: &ContactMessage) -> TaskResult<()>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutboxEntry {
    #[serde(flatten)]
    pub message: ContactMessage,
    pub queued_at: i64,
}

/// Appends messages to an `outbox.jsonl` file for an external sender to pick up
#[derive(Debug, Clone)]
pub struct OutboxDispatcher {
    path: PathBuf,
}

impl OutboxDispatcher {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join("outbox.jsonl"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Everything queued so far, oldest first
    pub fn pending(&self) -> TaskResult<Vec<OutboxEntry>> {
        jsonl::read_jsonl(&self.path).map_err(|e| TaskError::Dispatch(format!("{:#}", e)))
    }
}

impl MessageDispatcher for OutboxDispatcher {
    fn send(&self, message: &ContactMessage) -> TaskResult<()> {
        let entry = OutboxEntry {
            message: message.clone(),
            queued_at: now_ms(),
        };

        jsonl::append_jsonl(&self.path, &entry).map_err(|e| {
            error!(file = ?self.path, error = %e, "Failed to queue contact message");
            TaskError::Dispatch(format!("{:#}", e))
        })?;

        info!(file = ?self.path, "Queued contact message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_requires_every_field() {
        assert!(ContactMessage::new("Ana", "ana@example.com", "Hi").validate().is_ok());

        let err = ContactMessage::new("Ana", " ", "Hi").validate().unwrap_err();
        assert_eq!(err.to_string(), "Contact email cannot be empty!");
        assert!(ContactMessage::new("", "a@b.c", "Hi").validate().is_err());
        assert!(ContactMessage::new("Ana", "a@b.c", "\n").validate().is_err());
    }

    #[test]
    fn test_outbox_appends_messages() {
        let temp = TempDir::new().unwrap();
        let outbox = OutboxDispatcher::new(temp.path());

        outbox.send(&ContactMessage::new("Ana", "ana@example.com", "First")).unwrap();
        outbox.send(&ContactMessage::new("Bo", "bo@example.com", "Second")).unwrap();

        let pending = outbox.pending().unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].message.message, "First");
        assert_eq!(pending[1].message.name, "Bo");
        assert!(pending[0].queued_at > 0);
    }

    #[test]
    fn test_outbox_send_fails_when_dir_missing() {
        let temp = TempDir::new().unwrap();
        let outbox = OutboxDispatcher::new(temp.path().join("missing"));

        let err = outbox.send(&ContactMessage::new("Ana", "a@b.c", "Hi")).unwrap_err();
        assert!(matches!(err, TaskError::Dispatch(_)));
    }
}
