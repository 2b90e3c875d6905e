use serde::Serialize;

/// Outcome of loading one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Ok,
    MissingFile,
    ParseError,
    /// Not read because of the load options.
    Skipped,
}
