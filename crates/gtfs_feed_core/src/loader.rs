use std::io::BufRead;

use gtfs_feed_model::{
    Agency, Attribution, Calendar, CalendarDate, FareAttribute, FareRule, FeedInfo, Frequency,
    Level, Pathway, Route, ShapePoint, Stop, StopTime, Transfer, Translation, Trip,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::feed::*;
use crate::mapping::FromCsvRow;
use crate::table_reader::{read_table, TableReport};
use crate::{ErrorKind, Feed, FeedError, FeedSource, TableStatus};

/// Which tables a [`FeedLoader`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    read_stop_times: bool,
    read_optional_tables: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            read_stop_times: true,
            read_optional_tables: true,
        }
    }
}

impl LoadOptions {
    pub fn read_stop_times(mut self, enabled: bool) -> Self {
        self.read_stop_times = enabled;
        self
    }

    pub fn read_optional_tables(mut self, enabled: bool) -> Self {
        self.read_optional_tables = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLoad {
    pub table: String,
    pub status: TableStatus,
    pub rows_read: usize,
    pub records_added: usize,
    pub blank_lines_skipped: usize,
}

impl TableLoad {
    fn without_rows(table: &str, status: TableStatus) -> Self {
        Self {
            table: table.to_string(),
            status,
            rows_read: 0,
            records_added: 0,
            blank_lines_skipped: 0,
        }
    }

    fn from_report(report: TableReport) -> Self {
        Self {
            table: report.table,
            status: TableStatus::Ok,
            rows_read: report.rows_read,
            records_added: report.records_added,
            blank_lines_skipped: report.blank_lines_skipped,
        }
    }
}

/// Per table outcome of a load, in load order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LoadReport {
    pub tables: Vec<TableLoad>,
}

impl LoadReport {
    pub fn status(&self, table: &str) -> Option<TableStatus> {
        self.tables
            .iter()
            .find(|load| load.table == table)
            .map(|load| load.status)
    }

    pub fn total_records(&self) -> usize {
        self.tables.iter().map(|load| load.records_added).sum()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to load table {table}")]
pub struct LoadError {
    pub table: String,
    /// Tables processed up to and including the failing one.
    pub report: LoadReport,
    #[source]
    pub source: FeedError,
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Reads required tables, then optional ones, from a [`FeedSource`].
#[derive(Debug, Clone, Default)]
pub struct FeedLoader {
    options: LoadOptions,
}

impl FeedLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn load(&self, source: &dyn FeedSource) -> Result<(Feed, LoadReport), LoadError> {
        let mut feed = Feed::new();
        let report = self.load_into(source, &mut feed)?;
        Ok((feed, report))
    }

    /// Loads into an existing feed. On error the rows read so far stay in `feed`.
    pub fn load_into(
        &self,
        source: &dyn FeedSource,
        feed: &mut Feed,
    ) -> Result<LoadReport, LoadError> {
        let mut report = LoadReport::default();

        for &table in REQUIRED_TABLES {
            if table == STOP_TIMES_TABLE && !self.options.read_stop_times {
                report
                    .tables
                    .push(TableLoad::without_rows(table, TableStatus::Skipped));
                continue;
            }
            load_table(source, table, true, feed, &mut report)?;
        }

        for &table in OPTIONAL_TABLES {
            if !self.options.read_optional_tables {
                report
                    .tables
                    .push(TableLoad::without_rows(table, TableStatus::Skipped));
                continue;
            }
            load_table(source, table, false, feed, &mut report)?;
        }

        info!(
            tables = report.tables.len(),
            records = report.total_records(),
            "feed loaded"
        );
        Ok(report)
    }
}

fn load_table(
    source: &dyn FeedSource,
    table: &str,
    required: bool,
    feed: &mut Feed,
    report: &mut LoadReport,
) -> Result<(), LoadError> {
    let outcome = source
        .open(table)
        .and_then(|reader| read_table_by_name(table, reader, feed));

    match outcome {
        Ok(table_report) => {
            report.tables.push(TableLoad::from_report(table_report));
            Ok(())
        }
        Err(FeedError::FileAbsent(_)) if !required => {
            warn!(table, "optional table not present");
            report
                .tables
                .push(TableLoad::without_rows(table, TableStatus::MissingFile));
            Ok(())
        }
        Err(err) => {
            let status = match err.kind() {
                ErrorKind::FileAbsent | ErrorKind::InvalidPath => TableStatus::MissingFile,
                _ => TableStatus::ParseError,
            };
            report.tables.push(TableLoad::without_rows(table, status));
            Err(LoadError {
                table: table.to_string(),
                report: report.clone(),
                source: err,
            })
        }
    }
}

/// Reads `reader` as the table called `table` (for example `stop_times`).
pub fn read_table_by_name<R: BufRead>(
    table: &str,
    reader: R,
    feed: &mut Feed,
) -> Result<TableReport, FeedError> {
    match table {
        Agency::TABLE => read_table::<Agency, _>(table, reader, feed),
        Stop::TABLE => read_table::<Stop, _>(table, reader, feed),
        Route::TABLE => read_table::<Route, _>(table, reader, feed),
        Trip::TABLE => read_table::<Trip, _>(table, reader, feed),
        StopTime::TABLE => read_table::<StopTime, _>(table, reader, feed),
        Calendar::TABLE => read_table::<Calendar, _>(table, reader, feed),
        CalendarDate::TABLE => read_table::<CalendarDate, _>(table, reader, feed),
        ShapePoint::TABLE => read_table::<ShapePoint, _>(table, reader, feed),
        Transfer::TABLE => read_table::<Transfer, _>(table, reader, feed),
        Frequency::TABLE => read_table::<Frequency, _>(table, reader, feed),
        FareAttribute::TABLE => read_table::<FareAttribute, _>(table, reader, feed),
        FareRule::TABLE => read_table::<FareRule, _>(table, reader, feed),
        Level::TABLE => read_table::<Level, _>(table, reader, feed),
        Pathway::TABLE => read_table::<Pathway, _>(table, reader, feed),
        Translation::TABLE => read_table::<Translation, _>(table, reader, feed),
        Attribution::TABLE => read_table::<Attribution, _>(table, reader, feed),
        FeedInfo::TABLE => read_table::<FeedInfo, _>(table, reader, feed),
        other => Err(FeedError::InvalidFormat(format!("unknown table {}", other))),
    }
}
