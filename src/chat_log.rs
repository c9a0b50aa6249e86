//! Per-user conversation logs.
//!
//! One append-only text file per user under `<root>/users/<user_id>.txt`.
//! Entry format: `[YYYY-MM-DD HH:MM:SS] [context-label] SENDER: message`
//! followed by a blank line. The log is opaque to the rest of the system;
//! the chat responder feeds it back to the model as plain context.

use chrono::Local;
use derive_more::{Display, Error};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Who produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LogSender {
    /// The human user.
    User,
    /// The bot's reply.
    Bot,
}

/// Chat-log I/O failure.
#[derive(Debug, Display, Error)]
#[display("Chat log error: {message}")]
pub struct ChatLogError {
    /// What went wrong.
    pub message: String,
}

impl ChatLogError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Append/read access to per-user conversation logs.
#[derive(Debug, Clone)]
pub struct ChatLog {
    root: PathBuf,
}

impl ChatLog {
    /// Creates a log store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.root.join("users").join(format!("{user_id}.txt"))
    }

    /// Appends one entry to a user's log, creating the file as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ChatLogError`] on filesystem failure.
    #[instrument(skip(self, message))]
    pub fn append(
        &self,
        user_id: &str,
        context_label: &str,
        sender: LogSender,
        message: &str,
    ) -> Result<(), ChatLogError> {
        let path = self.path_for(user_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ChatLogError::new(format!("Failed to create log dir: {e}")))?;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let entry = format!("[{timestamp}] [{context_label}] {sender}: {message}\n\n");

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ChatLogError::new(format!("Failed to open log file: {e}")))?;
        file.write_all(entry.as_bytes())
            .map_err(|e| ChatLogError::new(format!("Failed to append log entry: {e}")))?;

        debug!(user_id, path = %path.display(), "Appended log entry");
        Ok(())
    }

    /// Loads a user's full conversation history.
    ///
    /// A missing file is an empty history, not an error; unreadable files
    /// are logged and also treated as empty so chat keeps working.
    #[instrument(skip(self))]
    pub fn load(&self, user_id: &str) -> String {
        let path = self.path_for(user_id);
        if !path.exists() {
            return String::new();
        }
        match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(user_id, error = %e, "Failed to read conversation history");
                String::new()
            }
        }
    }

    /// Returns the root directory of the log store.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_history_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = ChatLog::new(dir.path());
        assert_eq!(log.load("42"), "");
    }

    #[test]
    fn append_then_load_round_trips_entry_format() {
        let dir = tempfile::tempdir().unwrap();
        let log = ChatLog::new(dir.path());

        log.append("42", "Direct Message", LogSender::User, "hi there")
            .unwrap();
        log.append("42", "Direct Message", LogSender::Bot, "hey!")
            .unwrap();

        let history = log.load("42");
        assert!(history.contains("] [Direct Message] USER: hi there\n\n"));
        assert!(history.contains("] [Direct Message] BOT: hey!\n\n"));
        assert!(history.starts_with('['));
    }

    #[test]
    fn logs_are_keyed_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let log = ChatLog::new(dir.path());

        log.append("1", "dm", LogSender::User, "one").unwrap();
        log.append("2", "dm", LogSender::User, "two").unwrap();

        assert!(log.load("1").contains("one"));
        assert!(!log.load("1").contains("two"));
        assert!(log.load("2").contains("two"));
    }
}
