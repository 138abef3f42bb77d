//! In-memory tabular view of a student's course history.
//!
//! One [`CourseRecord`] per course-grading-period entry. Columns are named at
//! runtime (`credits`, `grades.Q1`, `department`, ...), so a record is a map
//! from column name to [`Cell`] rather than a fixed struct.

mod flatten;
pub mod semester;

pub use flatten::load_transcript;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// A single non-null scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// `true` for values that behave like a missing cell (NaN).
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Number(n) if n.is_nan())
    }

    /// Numeric reading of the cell: numbers as-is, text if it parses.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Bool(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

/// One row of the transcript table.
///
/// A column present with a `None` value is an explicit null; it still counts
/// toward the table's column set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseRecord {
    cells: HashMap<String, Option<Cell>>,
}

impl CourseRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly for tests and hand-built tables.
    pub fn with(mut self, column: &str, value: impl Into<Cell>) -> Self {
        self.insert(column, Some(value.into()));
        self
    }

    /// Builder-style explicit null.
    pub fn with_null(mut self, column: &str) -> Self {
        self.insert(column, None);
        self
    }

    pub fn insert(&mut self, column: &str, value: Option<Cell>) {
        self.cells.insert(column.to_string(), value);
    }

    /// Returns the cell in `column`, or `None` if it is missing, null or NaN.
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .get(column)
            .and_then(Option::as_ref)
            .filter(|cell| !cell.is_null())
    }

    /// Returns the cell in `column`, falling back to `default`.
    pub fn get_or<'a>(&'a self, column: &str, default: &'a Cell) -> &'a Cell {
        self.get(column).unwrap_or(default)
    }

    /// Course name used in diagnostics.
    pub fn course_name(&self) -> String {
        self.get("course_name")
            .map(Cell::to_string)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

/// Course history as rows of named columns.
///
/// The column set is the union of every key seen across the source records.
#[derive(Debug, Clone, Default)]
pub struct TranscriptTable {
    columns: Vec<String>,
    rows: Vec<CourseRecord>,
}

impl TranscriptTable {
    pub fn from_records(records: impl IntoIterator<Item = CourseRecord>) -> Self {
        let mut columns = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut rows = Vec::new();

        for record in records {
            // Sort each record's new keys so column order is stable across runs.
            let mut fresh: Vec<&str> = record
                .columns()
                .filter(|c| !seen.contains(*c))
                .collect();
            fresh.sort_unstable();
            for column in fresh {
                seen.insert(column.to_string());
                columns.push(column.to_string());
            }
            rows.push(record);
        }

        debug!(rows = rows.len(), columns = columns.len(), "Transcript table built");
        Self { columns, rows }
    }

    /// Column names in first-seen order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &CourseRecord> {
        self.rows.iter()
    }

    /// Returns a new table without the rows whose `dimension` value is in
    /// `exclude_values`. Null cells are never excluded.
    pub fn filter_excluding(&self, dimension: Option<&str>, exclude_values: &[Cell]) -> Self {
        let Some(dimension) = dimension else {
            return self.clone();
        };
        if exclude_values.is_empty() {
            return self.clone();
        }
        if !self.has_column(dimension) {
            warn!(dimension, "Exclusion dimension not present in transcript; no rows dropped");
        }

        let rows: Vec<CourseRecord> = self
            .rows
            .iter()
            .filter(|row| match row.get(dimension) {
                Some(value) => !exclude_values.contains(value),
                None => true,
            })
            .cloned()
            .collect();

        debug!(
            dimension,
            dropped = self.rows.len() - rows.len(),
            "Applied course exclusion"
        );

        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}
