use gtfs_feed_model::{parse_decimal, GtfsDate, GtfsEnum, GtfsParseError, GtfsTime};

use crate::FeedError;

/// Header-keyed view over one tokenized row.
///
/// A row without values behaves as if every field were absent; this is how
/// rows whose field count differs from the header are mapped.
#[derive(Debug, Clone, Copy)]
pub struct CsvRow<'a> {
    headers: &'a [String],
    values: Option<&'a [String]>,
}

impl<'a> CsvRow<'a> {
    pub fn new(headers: &'a [String], values: &'a [String]) -> Self {
        Self {
            headers,
            values: Some(values),
        }
    }

    pub fn empty(headers: &'a [String]) -> Self {
        Self {
            headers,
            values: None,
        }
    }

    /// Raw value of `key`, or `None` when the column is missing.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        let values = self.values?;
        let index = self.headers.iter().position(|header| header == key)?;
        values.get(index).map(String::as_str)
    }

    fn present(&self, key: &str) -> Option<&'a str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    fn require(&self, key: &str) -> Result<&'a str, FeedError> {
        self.present(key)
            .ok_or_else(|| FeedError::RequiredFieldAbsent(key.to_string()))
    }

    pub fn required_str(&self, key: &str) -> Result<String, FeedError> {
        self.require(key).map(str::to_string)
    }

    pub fn conditional_str(&self, key: &str) -> Option<String> {
        self.optional_str(key)
    }

    pub fn optional_str(&self, key: &str) -> Option<String> {
        self.present(key).map(str::to_string)
    }

    pub fn required_enum<E: GtfsEnum>(&self, key: &str) -> Result<E, FeedError> {
        let value = self.require(key)?;
        E::parse_code(value).map_err(|err| invalid(key, err))
    }

    /// Absent values take the enum's default.
    pub fn optional_enum<E: GtfsEnum>(&self, key: &str) -> Result<E, FeedError> {
        match self.present(key) {
            Some(value) => E::parse_code(value).map_err(|err| invalid(key, err)),
            None => Ok(E::default()),
        }
    }

    /// An empty value is `RequiredFieldAbsent`, even though
    /// [`GtfsTime::parse`] alone reads `""` as a time that is not provided.
    pub fn required_time(&self, key: &str) -> Result<GtfsTime, FeedError> {
        let value = self.require(key)?;
        GtfsTime::parse(value).map_err(|err| invalid(key, err))
    }

    /// Absent values yield a time that is not provided.
    pub fn conditional_time(&self, key: &str) -> Result<GtfsTime, FeedError> {
        match self.present(key) {
            Some(value) => GtfsTime::parse(value).map_err(|err| invalid(key, err)),
            None => Ok(GtfsTime::NOT_PROVIDED),
        }
    }

    /// Like [`CsvRow::required_time`], an empty value is `RequiredFieldAbsent`
    /// rather than a date that is not provided.
    pub fn required_date(&self, key: &str) -> Result<GtfsDate, FeedError> {
        let value = self.require(key)?;
        GtfsDate::parse(value).map_err(|err| invalid(key, err))
    }

    pub fn optional_date(&self, key: &str) -> Result<GtfsDate, FeedError> {
        match self.present(key) {
            Some(value) => GtfsDate::parse(value).map_err(|err| invalid(key, err)),
            None => Ok(GtfsDate::NOT_PROVIDED),
        }
    }

    pub fn required_u32(&self, key: &str) -> Result<u32, FeedError> {
        let value = self.require(key)?;
        parse_u32(key, value)
    }

    pub fn optional_u32(&self, key: &str) -> Result<Option<u32>, FeedError> {
        self.present(key)
            .map(|value| parse_u32(key, value))
            .transpose()
    }

    pub fn required_f64(&self, key: &str) -> Result<f64, FeedError> {
        let value = self.require(key)?;
        parse_decimal(value).map_err(|err| invalid(key, err))
    }

    pub fn optional_f64(&self, key: &str) -> Result<Option<f64>, FeedError> {
        self.present(key)
            .map(|value| parse_decimal(value).map_err(|err| invalid(key, err)))
            .transpose()
    }

    pub fn conditional_f64(&self, key: &str) -> Result<Option<f64>, FeedError> {
        self.optional_f64(key)
    }

    /// Optional non-negative decimal such as `shape_dist_traveled`.
    pub fn optional_distance(&self, key: &str) -> Result<Option<f64>, FeedError> {
        match self.optional_f64(key)? {
            Some(distance) if distance < 0.0 => Err(FeedError::InvalidFormat(format!(
                "{}: negative distance {}",
                key, distance
            ))),
            other => Ok(other),
        }
    }
}

fn invalid(key: &str, err: GtfsParseError) -> FeedError {
    FeedError::InvalidFormat(format!("{}: {}", key, err))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, FeedError> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(key, GtfsParseError::InvalidNumber(value.to_string())));
    }
    value
        .parse()
        .map_err(|_| invalid(key, GtfsParseError::InvalidNumber(value.to_string())))
}
