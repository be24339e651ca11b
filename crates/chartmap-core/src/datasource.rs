//! Row providers for dry runs.
//!
//! A [`DataSource`] answers `query(table, columns, filters)` with rows of
//! scalar cells. Filters use the engine's semantics, so pushing them down
//! never changes a result. Unknown tables yield no rows.

use std::path::{Path, PathBuf};

use chartmap_model::{CellValue, Filter, Row, TableRows};
use chartmap_transform::filter_matches;
use csv::{ReaderBuilder, Trim};

use crate::error::DataSourceError;

pub trait DataSource: Send + Sync {
    /// Rows of `table` passing every filter, projected onto `columns`
    /// (all columns when `columns` is empty).
    fn query(
        &self,
        table: &str,
        columns: &[String],
        filters: &[Filter],
    ) -> Result<Vec<Row>, DataSourceError>;
}

impl<T: DataSource + ?Sized> DataSource for &T {
    fn query(
        &self,
        table: &str,
        columns: &[String],
        filters: &[Filter],
    ) -> Result<Vec<Row>, DataSourceError> {
        (**self).query(table, columns, filters)
    }
}

impl<T: DataSource + ?Sized> DataSource for std::sync::Arc<T> {
    fn query(
        &self,
        table: &str,
        columns: &[String],
        filters: &[Filter],
    ) -> Result<Vec<Row>, DataSourceError> {
        (**self).query(table, columns, filters)
    }
}

fn select<'r>(
    rows: impl IntoIterator<Item = &'r Row>,
    columns: &[String],
    filters: &[Filter],
) -> Vec<Row> {
    rows.into_iter()
        .filter(|row| filters.iter().all(|f| filter_matches(row, f)))
        .map(|row| row.project(columns))
        .collect()
}

/// Tables held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    tables: TableRows,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    pub fn insert_table(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.tables.insert(name.into(), rows);
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl From<TableRows> for InMemoryDataSource {
    fn from(tables: TableRows) -> Self {
        Self { tables }
    }
}

impl DataSource for InMemoryDataSource {
    fn query(
        &self,
        table: &str,
        columns: &[String],
        filters: &[Filter],
    ) -> Result<Vec<Row>, DataSourceError> {
        let Some(rows) = self.tables.get(table) else {
            tracing::debug!(table, "table not found, returning no rows");
            return Ok(Vec::new());
        };
        Ok(select(rows, columns, filters))
    }
}

/// One `<table>.csv` per table inside a directory.
///
/// The first record is the header. Empty cells become null, `true`/`false`
/// become booleans and anything that parses as a finite number becomes a
/// number. Files are read on every query.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    dir: PathBuf,
}

impl CsvDataSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, table: &str) -> Result<PathBuf, DataSourceError> {
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !valid {
            return Err(DataSourceError::Query {
                table: table.to_string(),
                message: "table names may only contain letters, digits, '_' and '-'".to_string(),
            });
        }
        Ok(self.dir.join(format!("{table}.csv")))
    }
}

impl DataSource for CsvDataSource {
    fn query(
        &self,
        table: &str,
        columns: &[String],
        filters: &[Filter],
    ) -> Result<Vec<Row>, DataSourceError> {
        let path = self.table_path(table)?;
        if !path.is_file() {
            tracing::debug!(table, path = %path.display(), "no CSV file for table");
            return Ok(Vec::new());
        }
        let rows = read_csv_rows(&path)?;
        tracing::debug!(table, rows = rows.len(), "read CSV table");
        Ok(select(&rows, columns, filters))
    }
}

/// Reads a headed CSV file into rows.
pub fn read_csv_rows(path: &Path) -> Result<Vec<Row>, DataSourceError> {
    let file = std::fs::File::open(path).map_err(|e| DataSourceError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DataSourceError::csv(path, e))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataSourceError::csv(path, e))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row: Row = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(idx, header)| (header.clone(), infer_cell(record.get(idx).unwrap_or(""))))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn infer_cell(raw: &str) -> CellValue {
    let value = raw.trim().trim_matches('\u{feff}');
    if value.is_empty() {
        return CellValue::Null;
    }
    if value.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => CellValue::Number(number),
        _ => CellValue::Text(value.to_string()),
    }
}
