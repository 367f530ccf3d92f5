//! Event ingestion and monthly count series aggregation

use crate::error::{ForecastError, Result};
use crate::utils::{add_months, month_start, months_between};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// A single dated, categorized job posting record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Calendar date the posting was observed
    pub date: NaiveDate,
    /// Domain the posting is tagged with
    pub category: String,
}

impl Event {
    /// Create a new event record
    pub fn new(date: NaiveDate, category: impl Into<String>) -> Self {
        Self {
            date,
            category: category.into(),
        }
    }
}

/// One month of a count series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesEntry {
    /// First day of the month this entry covers
    pub period: NaiveDate,
    /// Number of events observed in that month
    pub count: u32,
}

/// A complete monthly count series for one category
///
/// Invariant: entries are ordered, periods are month-start dates, and every
/// consecutive pair is exactly one calendar month apart. Months with no
/// events carry a zero count, so the series has no gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSeries {
    entries: Vec<SeriesEntry>,
}

impl CountSeries {
    /// Build a series from pre-ordered entries, validating the invariant
    pub fn new(entries: Vec<SeriesEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ForecastError::Data(
                "a count series must contain at least one month".to_string(),
            ));
        }
        if let Some(entry) = entries.iter().find(|e| e.period.day() != 1) {
            return Err(ForecastError::Data(format!(
                "series period {} is not a month-start date",
                entry.period
            )));
        }
        for pair in entries.windows(2) {
            if add_months(pair[0].period, 1) != pair[1].period {
                return Err(ForecastError::Data(format!(
                    "series periods must advance by exactly one month, found {} after {}",
                    pair[1].period, pair[0].period
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Get the series entries in period order
    pub fn entries(&self) -> &[SeriesEntry] {
        &self.entries
    }

    /// Number of months covered by the series
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the series is empty (never true for a validly constructed series)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the counts as a float vector, in period order
    pub fn counts(&self) -> Vec<f64> {
        self.entries.iter().map(|e| f64::from(e.count)).collect()
    }

    /// First observed period
    pub fn first_period(&self) -> NaiveDate {
        self.entries[0].period
    }

    /// Last observed period
    pub fn last_period(&self) -> NaiveDate {
        self.entries[self.entries.len() - 1].period
    }

    /// Mean of the monthly counts
    pub fn mean(&self) -> f64 {
        let sum: f64 = self.entries.iter().map(|e| f64::from(e.count)).sum();
        sum / self.entries.len() as f64
    }

    /// Population standard deviation of the monthly counts
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let variance = self
            .entries
            .iter()
            .map(|e| (f64::from(e.count) - mean).powi(2))
            .sum::<f64>()
            / self.entries.len() as f64;
        variance.sqrt()
    }
}

/// Aggregates raw events into per-category monthly count series
#[derive(Debug)]
pub struct SeriesAggregator;

impl SeriesAggregator {
    /// Group events by (month, lower-cased category) and materialize one
    /// gap-free series per category.
    ///
    /// Each category's series spans the closed range from its first to its
    /// last observed month, with a zero count for months that saw no events.
    /// An empty input yields an empty map.
    pub fn aggregate(events: &[Event]) -> BTreeMap<String, CountSeries> {
        let mut buckets: BTreeMap<String, BTreeMap<NaiveDate, u32>> = BTreeMap::new();

        for event in events {
            let category = event.category.trim().to_lowercase();
            if category.is_empty() {
                continue;
            }
            let period = month_start(event.date);
            *buckets
                .entry(category)
                .or_default()
                .entry(period)
                .or_insert(0) += 1;
        }

        let mut series_by_category = BTreeMap::new();
        for (category, counts) in buckets {
            let first = *counts.keys().next().unwrap();
            let last = *counts.keys().next_back().unwrap();
            let span = months_between(first, last);

            let mut entries = Vec::with_capacity(span as usize + 1);
            let mut period = first;
            loop {
                entries.push(SeriesEntry {
                    period,
                    count: counts.get(&period).copied().unwrap_or(0),
                });
                if period == last {
                    break;
                }
                period = add_months(period, 1);
            }

            // The materialized range is already contiguous.
            series_by_category.insert(category, CountSeries { entries });
        }

        series_by_category
    }
}

/// Data loader for event records
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load event records from a CSV file
    ///
    /// The date column is the first whose name contains "date", "time" or
    /// "timestamp"; the category column is the first containing "domain" or
    /// "category". Rows with an unparseable date or a missing/"N/A" category
    /// are dropped; categories are lower-cased.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Event>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::events_from_dataframe(&df)
    }

    /// Build event records from an in-memory collection
    pub fn from_records<I>(records: I) -> Vec<Event>
    where
        I: IntoIterator<Item = (NaiveDate, String)>,
    {
        records
            .into_iter()
            .map(|(date, category)| Event::new(date, category))
            .collect()
    }

    /// Extract event records from an existing DataFrame
    pub fn events_from_dataframe(df: &DataFrame) -> Result<Vec<Event>> {
        let date_column = Self::detect_column(df, &["date", "time", "timestamp"])?;
        let category_column = Self::detect_column(df, &["domain", "category"])?;

        let dates = Self::column_as_dates(df, &date_column)?;
        let categories = df.column(&category_column)?.utf8().map_err(|_| {
            ForecastError::Data(format!(
                "category column '{}' does not contain strings",
                category_column
            ))
        })?;

        let mut events = Vec::with_capacity(df.height());
        for (date, category) in dates.iter().zip(categories.into_iter()) {
            let (Some(date), Some(category)) = (date, category) else {
                continue;
            };
            let category = category.trim().to_lowercase();
            if category.is_empty() || category == "n/a" {
                continue;
            }
            events.push(Event::new(*date, category));
        }

        Ok(events)
    }

    /// Detect a column whose lower-cased name contains one of the needles
    fn detect_column(df: &DataFrame, needles: &[&str]) -> Result<String> {
        for name in df.get_column_names() {
            let lower = name.to_lowercase();
            if needles.iter().any(|needle| lower.contains(needle)) {
                return Ok(name.to_string());
            }
        }

        Err(ForecastError::Data(format!(
            "no column matching any of {:?} found in data",
            needles
        )))
    }

    /// Read a column as calendar dates, `None` where a value does not parse
    fn column_as_dates(df: &DataFrame, column_name: &str) -> Result<Vec<Option<NaiveDate>>> {
        let col = df.column(column_name)?;

        match col.dtype() {
            DataType::Utf8 => Ok(col
                .utf8()
                .unwrap()
                .into_iter()
                .map(|opt| opt.and_then(Self::parse_event_date))
                .collect()),
            DataType::Date => Ok(col
                .date()
                .unwrap()
                .into_iter()
                .map(|opt| {
                    opt.map(|days| {
                        NaiveDate::from_ymd_opt(1970, 1, 1)
                            .unwrap()
                            .checked_add_days(chrono::Days::new(days as u64))
                            .unwrap()
                    })
                })
                .collect()),
            other => Err(ForecastError::Data(format!(
                "date column '{}' has unsupported type {}",
                column_name, other
            ))),
        }
    }

    /// Parse a raw date string in the formats the source data uses
    fn parse_event_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        for format in ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                return Some(date);
            }
        }
        None
    }
}
