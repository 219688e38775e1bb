//! Historical Weather Dataset

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];

/// Errors while parsing the dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("Row {row}: invalid date '{raw}'")]
    InvalidDate { row: usize, raw: String },
}

/// A single non-date cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Cell::Missing;
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Number(value),
            Ok(_) => Cell::Missing,
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// One day of observations
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Aligned with `HistoricalDataset::columns`
    pub cells: Vec<Cell>,
}

/// Headline numbers for the dataset view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    /// Column count including `date`
    pub total_features: usize,
}

/// Downsampled series for charting; missing values are 0
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub date: Vec<String>,
    pub tavg: Vec<f64>,
    pub rh_avg: Vec<f64>,
    pub rr: Vec<f64>,
}

/// Daily station records `{date, TAVG, RH_AVG, RR, ...}`, immutable once parsed
#[derive(Debug, Clone)]
pub struct HistoricalDataset {
    columns: Vec<String>,
    records: Vec<DailyRecord>,
    tavg_idx: usize,
    rh_avg_idx: usize,
    rr_idx: usize,
}

impl HistoricalDataset {
    /// Parse the CSV at `path`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let dataset = Self::from_reader(File::open(path)?)?;
        info!("Loaded {} records from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parse CSV with a header row and a `date` column
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let date_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("date"))
            .ok_or(DatasetError::MissingColumn("date"))?;
        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != date_idx)
            .map(|(_, h)| h.clone())
            .collect();

        let find = |name: &'static str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or(DatasetError::MissingColumn(name))
        };
        let tavg_idx = find("TAVG")?;
        let rh_avg_idx = find("RH_AVG")?;
        let rr_idx = find("RR")?;

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = parse_date(raw_date).ok_or_else(|| DatasetError::InvalidDate {
                row: row + 1,
                raw: raw_date.to_string(),
            })?;
            let cells = record
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != date_idx)
                .map(|(_, raw)| Cell::parse(raw))
                .collect();
            records.push(DailyRecord { date, cells });
        }

        Ok(Self {
            columns,
            records,
            tavg_idx,
            rh_avg_idx,
            rr_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Non-date column names in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    /// Numeric values of a named column
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.records.iter().map(|r| value_at(r, idx)).collect())
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            total_records: self.records.len(),
            start_year: self.records.iter().map(|r| r.date).min().map(|d| d.year()),
            end_year: self.records.iter().map(|r| r.date).max().map(|d| d.year()),
            total_features: self.columns.len() + 1,
        }
    }

    /// First `limit` rows as JSON objects keyed by column name
    pub fn table(&self, limit: usize) -> Vec<Map<String, Value>> {
        self.records
            .iter()
            .take(limit)
            .map(|record| {
                let mut row = Map::new();
                row.insert("date".to_string(), Value::String(format_date(record.date)));
                for (name, cell) in self.columns.iter().zip(&record.cells) {
                    row.insert(name.clone(), serde_json::to_value(cell).unwrap_or(Value::Null));
                }
                row
            })
            .collect()
    }

    /// Every `step`-th row of the chart columns
    pub fn chart(&self, step: usize) -> ChartSeries {
        let rows: Vec<&DailyRecord> = self.records.iter().step_by(step.max(1)).collect();
        let series = |idx: usize| -> Vec<f64> { rows.iter().map(|r| value_at(r, idx).unwrap_or(0.0)).collect() };
        ChartSeries {
            date: rows.iter().map(|r| format_date(r.date)).collect(),
            tavg: series(self.tavg_idx),
            rh_avg: series(self.rh_avg_idx),
            rr: series(self.rr_idx),
        }
    }
}

fn value_at(record: &DailyRecord, idx: usize) -> Option<f64> {
    record.cells.get(idx).and_then(Cell::as_f64)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
