use std::io::BufRead;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::mapping::{FromCsvRow, GtfsRecord};
use crate::tokenizer::split_record;
use crate::{CsvRow, Feed, FeedError};

/// Counters of one completed table read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TableReport {
    pub table: String,
    pub rows_read: usize,
    pub records_added: usize,
    pub blank_lines_skipped: usize,
}

/// Line-oriented reader of one GTFS table.
pub struct TableReader<R> {
    table: String,
    reader: R,
    headers: Vec<String>,
    line: String,
    line_number: usize,
    rows_read: usize,
    blank_lines_skipped: usize,
}

impl<R: BufRead> TableReader<R> {
    pub fn new(table: impl Into<String>, reader: R) -> Self {
        Self {
            table: table.into(),
            reader,
            headers: Vec::new(),
            line: String::new(),
            line_number: 0,
            rows_read: 0,
            blank_lines_skipped: 0,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 1-based number of the last line read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn read_header(&mut self) -> Result<&[String], FeedError> {
        let has_line = self.read_line()?;
        if !has_line || self.line.trim_end_matches('\r').is_empty() {
            return Err(FeedError::InvalidFormat(format!(
                "{}: missing header line",
                self.table
            )));
        }
        self.headers = split_record(&self.line, true);
        Ok(&self.headers)
    }

    /// Maps the next non-blank row, or returns `None` at end of stream.
    ///
    /// A row whose field count differs from the header is mapped as if every
    /// field were absent.
    pub fn next_row<T: FromCsvRow>(&mut self) -> Result<Option<T>, FeedError> {
        loop {
            if !self.read_line()? {
                return Ok(None);
            }
            if self.line.is_empty() || self.line == "\r" {
                self.blank_lines_skipped += 1;
                debug!(table = %self.table, line = self.line_number, "skipping blank line");
                continue;
            }

            self.rows_read += 1;
            let values = split_record(&self.line, false);
            let row = if values.len() == self.headers.len() {
                CsvRow::new(&self.headers, &values)
            } else {
                warn!(
                    table = %self.table,
                    line = self.line_number,
                    expected = self.headers.len(),
                    found = values.len(),
                    "field count does not match header"
                );
                CsvRow::empty(&self.headers)
            };

            return T::from_row(&row)
                .map(Some)
                .map_err(|err| err.at_line(&self.table, self.line_number));
        }
    }

    fn read_line(&mut self) -> Result<bool, FeedError> {
        self.line.clear();
        let read = self
            .reader
            .read_line(&mut self.line)
            .map_err(|source| FeedError::Io {
                table: self.table.clone(),
                source,
            })?;
        if read == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        if self.line.ends_with('\n') {
            self.line.pop();
        }
        Ok(true)
    }
}

/// Reads a whole table into `feed`.
///
/// The first failing row aborts the read; rows stored before it are kept.
pub fn read_table<T: GtfsRecord, R: BufRead>(
    table: &str,
    reader: R,
    feed: &mut Feed,
) -> Result<TableReport, FeedError> {
    debug!(table, "reading table");
    let mut reader = TableReader::new(table, reader);
    T::set_headers(feed, reader.read_header()?);

    let mut records_added = 0;
    while let Some(record) = reader.next_row::<T>()? {
        record.store(feed, Some(reader.line_number()));
        records_added += 1;
    }

    info!(table, records = records_added, "table loaded");
    Ok(TableReport {
        table: table.to_string(),
        rows_read: reader.rows_read,
        records_added,
        blank_lines_skipped: reader.blank_lines_skipped,
    })
}
