use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::FeedError;

/// Resolves a table name such as `stops` to a readable stream.
pub trait FeedSource {
    /// Opens `table`; any stream that cannot be opened is `FileAbsent`.
    fn open(&self, table: &str) -> Result<Box<dyn BufRead + '_>, FeedError>;
}

/// Unpacked feed directory holding `<table>.txt` files.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, FeedError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(FeedError::InvalidPath(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.txt", table))
    }
}

impl FeedSource for DirectorySource {
    fn open(&self, table: &str) -> Result<Box<dyn BufRead + '_>, FeedError> {
        if !self.root.is_dir() {
            return Err(FeedError::InvalidPath(self.root.clone()));
        }
        match File::open(self.table_path(table)) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(table, error = %err, "cannot open table file");
                }
                Err(FeedError::FileAbsent(table.to_string()))
            }
        }
    }
}

/// Tables held in memory, keyed by table name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(table, contents);
        self
    }

    pub fn insert(&mut self, table: impl Into<String>, contents: impl Into<String>) {
        self.tables.insert(table.into(), contents.into());
    }
}

impl FeedSource for MemorySource {
    fn open(&self, table: &str) -> Result<Box<dyn BufRead + '_>, FeedError> {
        self.tables
            .get(table)
            .map(|contents| Box::new(Cursor::new(contents.as_bytes())) as Box<dyn BufRead + '_>)
            .ok_or_else(|| FeedError::FileAbsent(table.to_string()))
    }
}
