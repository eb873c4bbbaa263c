//! Flat CSV tables and whole-file atomic writes
//!
//! Every output file is header-first, comma-delimited UTF-8. Writes go to a
//! temporary file in the destination directory and are renamed into place, so
//! a crash mid-run leaves the previous run's file intact.

use crate::error::{PipelineError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Summary of a file written by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Destination path
    pub path: PathBuf,

    /// Number of data rows (header excluded)
    pub rows: usize,

    /// Hex SHA-256 of the file contents
    pub sha256: String,
}

/// A loosely typed table of string cells.
///
/// Raw and staging files have no fixed schema, so they are handled as text
/// and typed per column by the component that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given headers
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Read a table from a CSV file
    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
        Self::from_reader(file).map_err(|e| PipelineError::csv(path, e))
    }

    /// Read a table from any reader. Ragged rows are padded or truncated to
    /// the header width.
    pub fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column with this exact header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell value by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Iterate over one column's cells; `None` if the column is absent
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| r[idx].as_str()))
    }

    /// Rewrite every header through `f`
    pub fn rename_headers(&mut self, mut f: impl FnMut(&str) -> String) {
        for header in &mut self.headers {
            *header = f(header);
        }
    }

    /// Rewrite every cell in a column; no-op if the column is absent
    pub fn map_column(&mut self, name: &str, mut f: impl FnMut(&str) -> String) {
        if let Some(idx) = self.column_index(name) {
            for row in &mut self.rows {
                row[idx] = f(&row[idx]);
            }
        }
    }

    /// Set (or append) a column from per-row values computed by `f`
    pub fn set_column(&mut self, name: &str, mut f: impl FnMut(&Self, usize) -> String) {
        let values: Vec<String> = (0..self.rows.len()).map(|i| f(&*self, i)).collect();
        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.headers.push(name.to_string());
                for row in &mut self.rows {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
    }

    /// Append a row; it is padded or truncated to the header width
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Serialize to CSV bytes
    pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }

    /// Write the whole table to `path`, replacing any previous file
    pub fn write(&self, path: &Path) -> Result<WrittenFile> {
        let bytes = self.to_bytes().map_err(|e| PipelineError::csv(path, e))?;
        write_atomic(path, &bytes)?;
        Ok(WrittenFile {
            path: path.to_path_buf(),
            rows: self.rows.len(),
            sha256: sha256_hex(&bytes),
        })
    }
}

/// Read typed records from a headered CSV file
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| PipelineError::csv(path, e))
}

/// Write typed records under an explicit header row.
///
/// The header is written even when `records` is empty, so downstream
/// consumers always see the full column set.
pub fn write_records<T: Serialize>(
    path: &Path,
    columns: &[&str],
    records: &[T],
) -> Result<WrittenFile> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(columns)
        .map_err(|e| PipelineError::csv(path, e))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| PipelineError::csv(path, e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PipelineError::io(path, e.into_error()))?;
    write_atomic(path, &bytes)?;

    Ok(WrittenFile {
        path: path.to_path_buf(),
        rows: records.len(),
        sha256: sha256_hex(&bytes),
    })
}

/// Replace `path` with `bytes` via a temporary file and rename.
///
/// Creates the parent directory if needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| PipelineError::io(&dir, e))?;
    tmp.write_all(bytes).map_err(|e| PipelineError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| PipelineError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| PipelineError::io(path, e.error))?;

    Ok(())
}

/// Hex SHA-256 digest
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ragged_rows_are_squared_off() {
        let table = Table::from_reader("a,b,c\n1,2\n3,4,5,6\n".as_bytes()).unwrap();
        assert_eq!(table.rows(), &[
            vec!["1".to_string(), "2".to_string(), String::new()],
            vec!["3".to_string(), "4".to_string(), "5".to_string()],
        ]);
    }

    #[test]
    fn set_column_appends_and_overwrites() {
        let mut table = Table::from_reader("name\nx\ny\n".as_bytes()).unwrap();
        table.set_column("len", |t, i| t.rows()[i][0].len().to_string());
        assert_eq!(table.headers(), &["name".to_string(), "len".to_string()]);

        table.set_column("name", |_, _| "z".to_string());
        assert_eq!(table.get(1, "name"), Some("z"));
        assert_eq!(table.get(1, "len"), Some("1"));
    }

    #[test]
    fn empty_table_serializes_header() {
        let table = Table::new(vec!["year".to_string(), "team".to_string()]);
        assert_eq!(table.to_bytes().unwrap(), b"year,team\n".to_vec());
    }

    #[test]
    fn atomic_write_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        write_atomic(&path, b"first\n").unwrap();
        write_atomic(&path, b"second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn typed_records_always_have_header() {
        #[derive(Serialize)]
        struct Row {
            year: i32,
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let empty: Vec<Row> = Vec::new();
        let written = write_records(&path, &["year"], &empty).unwrap();

        assert_eq!(written.rows, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "year\n");
    }
}
