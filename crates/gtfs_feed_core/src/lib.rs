//! Loading of GTFS feeds into typed, queryable tables.
//!
//! Text is split by [`tokenizer::split_record`], mapped row by row through
//! [`FromCsvRow`], read table by table with [`read_table`] and stored in a
//! [`Feed`]. [`FeedLoader`] sequences all tables of a [`FeedSource`].

mod error;
pub mod feed;
pub mod loader;
pub mod mapping;
mod row;
pub mod source;
mod table;
pub mod table_reader;
mod table_status;
pub mod tokenizer;

pub use error::{ErrorKind, FeedError};
pub use feed::Feed;
pub use loader::{FeedLoader, LoadError, LoadOptions, LoadReport, TableLoad};
pub use mapping::{FromCsvRow, GtfsRecord};
pub use row::CsvRow;
pub use source::{DirectorySource, FeedSource, MemorySource};
pub use table::CsvTable;
pub use table_reader::{read_table, TableReader, TableReport};
pub use table_status::TableStatus;

pub use gtfs_feed_model as model;
