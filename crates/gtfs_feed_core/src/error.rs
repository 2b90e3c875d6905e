use std::io;
use std::path::PathBuf;

use serde::Serialize;

/// Category of a [`FeedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    FileAbsent,
    InvalidFormat,
    RequiredFieldAbsent,
    InvalidPath,
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("table {0} could not be opened")]
    FileAbsent(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("required field absent: {0}")]
    RequiredFieldAbsent(String),
    #[error("feed directory not found: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("failed to read {table}: {source}")]
    Io {
        table: String,
        #[source]
        source: io::Error,
    },
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedError::FileAbsent(_) => ErrorKind::FileAbsent,
            FeedError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            FeedError::RequiredFieldAbsent(_) => ErrorKind::RequiredFieldAbsent,
            FeedError::InvalidPath(_) => ErrorKind::InvalidPath,
            FeedError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Prefixes the message with the table and line it came from.
    pub(crate) fn at_line(self, table: &str, line: usize) -> Self {
        match self {
            FeedError::InvalidFormat(message) => {
                FeedError::InvalidFormat(format!("{}:{}: {}", table, line, message))
            }
            FeedError::RequiredFieldAbsent(message) => {
                FeedError::RequiredFieldAbsent(format!("{}:{}: {}", table, line, message))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn located_errors_keep_their_kind() {
        let error = FeedError::RequiredFieldAbsent("stop_id".into()).at_line("stops", 4);
        assert_eq!(error.kind(), ErrorKind::RequiredFieldAbsent);
        assert_eq!(error.to_string(), "required field absent: stops:4: stop_id");

        let absent = FeedError::FileAbsent("shapes".into()).at_line("shapes", 1);
        assert_eq!(absent.kind(), ErrorKind::FileAbsent);
    }
}
