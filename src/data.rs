//! Sales record model and CSV ingestion using Polars

use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use serde::Serialize;

/// A validated sales record, the input to every analytics function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub customer_id: String,
    pub order_date: DateTime<Utc>,
    pub total_price: f64,
    pub category: String,
    pub prefecture: String,
    pub age_range: String,
}

impl SalesRecord {
    /// Price used by the aggregations: non-finite or negative prices count as 0
    pub fn price(&self) -> f64 {
        if self.total_price.is_finite() && self.total_price >= 0.0 {
            self.total_price
        } else {
            0.0
        }
    }
}

/// Row counts gathered while validating a CSV feed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStats {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    /// Percentage of valid rows (0 when the feed had no rows)
    pub validation_rate: f64,
}

impl DataStats {
    fn new(valid_rows: usize, invalid_rows: usize) -> Self {
        let total_rows = valid_rows + invalid_rows;
        let validation_rate = if total_rows > 0 {
            valid_rows as f64 / total_rows as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_rows,
            valid_rows,
            invalid_rows,
            validation_rate,
        }
    }
}

/// A row that failed validation, with every reason it failed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRow {
    /// 1-based line in the source file (the header is line 1)
    pub line_number: usize,
    pub errors: Vec<String>,
}

/// Result of ingesting a CSV feed
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub records: Vec<SalesRecord>,
    pub rejected: Vec<RejectedRow>,
    pub stats: DataStats,
}

const COLUMNS: [&str; 6] = [
    "customer_id",
    "order_date",
    "total_price",
    "category",
    "prefecture",
    "age_range",
];

/// Load and validate a sales CSV file
pub fn load_sales_file<P: AsRef<Path>>(path: P) -> crate::Result<IngestReport> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read sales data from {}", path.display()))?;
    parse_sales_csv(&text)
}

/// Parse and validate sales CSV text
///
/// Every column is read as text so that validation can report the exact
/// reason a row was rejected instead of failing the whole file on a type error.
pub fn parse_sales_csv(text: &str) -> crate::Result<IngestReport> {
    if text.trim().is_empty() {
        anyhow::bail!("sales data is empty: a header row is required");
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()
        .context("failed to parse sales CSV")?;

    let line_numbers = record_start_lines(text);
    let cells = df
        .get_columns()
        .iter()
        .map(string_cells)
        .collect::<crate::Result<Vec<_>>>()?;
    let columns: Vec<Option<usize>> = COLUMNS
        .iter()
        .map(|name| {
            df.get_columns()
                .iter()
                .position(|c| c.name().as_str().trim() == *name)
        })
        .collect();

    let mut records = Vec::with_capacity(df.height());
    let mut rejected = Vec::new();

    // Blank rows are skipped on both sides, so the n-th non-blank row lines
    // up with the n-th non-blank record in the text.
    let rows = (0..df.height()).filter(|&row| {
        cells
            .iter()
            .any(|column| column[row].as_deref().is_some_and(|v| !v.is_empty()))
    });

    for (position, row) in rows.enumerate() {
        let cell = |idx: usize| {
            columns[idx]
                .and_then(|col| cells[col][row].as_deref())
                .unwrap_or("")
        };
        let line_number = line_numbers.get(position).copied().unwrap_or(row + 2);

        match validate_row(
            cell(0),
            cell(1),
            cell(2),
            cell(3),
            cell(4),
            cell(5),
        ) {
            Ok(record) => records.push(record),
            Err(errors) => rejected.push(RejectedRow {
                line_number,
                errors,
            }),
        }
    }

    let stats = DataStats::new(records.len(), rejected.len());

    if !rejected.is_empty() {
        log::warn!(
            "Data validation: {} invalid rows found ({:.2}% valid)",
            rejected.len(),
            stats.validation_rate
        );
        for row in &rejected {
            log::debug!("line {}: {}", row.line_number, row.errors.join(", "));
        }
    }
    log::debug!(
        "Ingested {} of {} rows",
        stats.valid_rows,
        stats.total_rows
    );

    Ok(IngestReport {
        records,
        rejected,
        stats,
    })
}

/// Check one row and build a record, or return every validation failure
fn validate_row(
    customer_id: &str,
    order_date: &str,
    total_price: &str,
    category: &str,
    prefecture: &str,
    age_range: &str,
) -> Result<SalesRecord, Vec<String>> {
    let mut errors = Vec::new();

    if customer_id.is_empty() {
        errors.push("Customer ID is missing".to_string());
    }
    let date = parse_order_date(order_date);
    if date.is_none() {
        errors.push("Invalid order date".to_string());
    }
    let price = total_price
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0);
    if price.is_none() {
        errors.push("Invalid total price".to_string());
    }
    if category.is_empty() {
        errors.push("Category is missing".to_string());
    }
    if prefecture.is_empty() {
        errors.push("Prefecture is missing".to_string());
    }

    match (date, price) {
        (Some(order_date), Some(total_price)) if errors.is_empty() => Ok(SalesRecord {
            customer_id: customer_id.to_string(),
            order_date,
            total_price,
            category: category.to_string(),
            prefecture: prefecture.to_string(),
            age_range: age_range.to_string(),
        }),
        _ => Err(errors),
    }
}

/// Parse an order date; timestamps without a zone are taken as UTC
pub fn parse_order_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Read a text column as trimmed optional strings
fn string_cells(column: &Column) -> crate::Result<Vec<Option<String>>> {
    Ok(column
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect())
}

/// Starting file line of every non-blank data record.
///
/// Record boundaries are newlines outside double quotes, so a quoted cell
/// spanning several lines belongs to one record. A record is blank when it
/// holds nothing but separators, quotes and whitespace.
fn record_start_lines(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut line = 1;
    let mut start = 1;
    let mut in_quotes = false;
    let mut has_content = false;

    for ch in text.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '\n' => {
                if !in_quotes {
                    if has_content {
                        starts.push(start);
                    }
                    has_content = false;
                    start = line + 1;
                }
                line += 1;
            }
            ',' => {}
            c if c.is_whitespace() => {}
            _ => has_content = true,
        }
    }
    if has_content {
        starts.push(start);
    }

    // The first non-blank record is the header
    starts.into_iter().skip(1).collect()
}
