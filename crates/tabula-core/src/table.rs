//! Row/column table abstraction
//!
//! - [`ImportedDataTable`]: header names plus a forward-only cursor over rows
//!   of string cells, consumed by the import path
//! - [`DataTableBuilder`]: row sink fed by the export path
//! - [`MemoryDataTable`] and [`DelimitedTextBuilder`]: in-memory
//!   implementations for delimited text (CSV/TSV)

use std::collections::HashMap;

use csv::{ReaderBuilder, Trim};

use crate::column::DataTableColumn;
use crate::error::Result;

/// A single data row
pub trait DataRow {
    fn column_count(&self) -> usize;

    /// Cell text at `index`, or `""` when the row is shorter
    fn cell(&self, index: usize) -> &str;
}

/// A parsed table: a header row followed by data rows
pub trait ImportedDataTable {
    fn header_column_names(&self) -> &[String];

    fn data_row_count(&self) -> usize;

    /// Forward-only cursor over data rows
    fn data_rows<'a>(&'a self) -> Box<dyn Iterator<Item = &'a dyn DataRow> + 'a>;
}

/// Row sink for exported transactions
pub trait DataTableBuilder {
    fn append_row(&mut self, row: HashMap<DataTableColumn, String>);
}

impl DataRow for Vec<String> {
    fn column_count(&self) -> usize {
        self.len()
    }

    fn cell(&self, index: usize) -> &str {
        self.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Table held entirely in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDataTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MemoryDataTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Parse delimited text whose first record is the header row.
    ///
    /// Records may be shorter or longer than the header; column-count
    /// validation is left to the converter so it can report the row.
    pub fn from_delimited(content: &str, delimiter: u8, trim: bool) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .trim(if trim { Trim::All } else { Trim::None })
            .from_reader(content.as_bytes());

        let mut records = rdr.records();

        let header = match records.next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => Vec::new(),
        };

        let mut rows = Vec::new();
        for record in records {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        Ok(Self { header, rows })
    }
}

impl ImportedDataTable for MemoryDataTable {
    fn header_column_names(&self) -> &[String] {
        &self.header
    }

    fn data_row_count(&self) -> usize {
        self.rows.len()
    }

    fn data_rows<'a>(&'a self) -> Box<dyn Iterator<Item = &'a dyn DataRow> + 'a> {
        Box::new(self.rows.iter().map(|row| row as &dyn DataRow))
    }
}

/// Writes rows as delimited text: a header line, then one line per row.
///
/// Cells holding a quote, the column separator or a line break are quoted
/// with inner quotes doubled, matching what [`MemoryDataTable::from_delimited`]
/// reads back.
#[derive(Debug, Clone)]
pub struct DelimitedTextBuilder {
    columns: Vec<DataTableColumn>,
    column_separator: String,
    line_separator: String,
    content: String,
}

impl DelimitedTextBuilder {
    /// `columns` pairs each exported column with its header text, in order.
    pub fn new(
        columns: &[(DataTableColumn, &str)],
        column_separator: &str,
        line_separator: &str,
    ) -> Self {
        let header: Vec<&str> = columns.iter().map(|(_, name)| *name).collect();

        let mut content = header.join(column_separator);
        content.push_str(line_separator);

        Self {
            columns: columns.iter().map(|(column, _)| *column).collect(),
            column_separator: column_separator.to_string(),
            line_separator: line_separator.to_string(),
            content,
        }
    }

    pub fn into_string(self) -> String {
        self.content
    }
}

impl DataTableBuilder for DelimitedTextBuilder {
    fn append_row(&mut self, row: HashMap<DataTableColumn, String>) {
        let cells: Vec<String> = self
            .columns
            .iter()
            .map(|column| row.get(column).map(String::as_str).unwrap_or(""))
            .map(|cell| escape_field(cell, &self.column_separator))
            .collect();

        self.content.push_str(&cells.join(&self.column_separator));
        self.content.push_str(&self.line_separator);
    }
}

fn escape_field(field: &str, column_separator: &str) -> String {
    let needs_quoting = field.contains('"')
        || field.contains(['\r', '\n'])
        || (!column_separator.is_empty() && field.contains(column_separator));

    if needs_quoting {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Collects exported rows in memory
#[derive(Debug, Clone, Default)]
pub struct VecDataTableBuilder {
    pub rows: Vec<HashMap<DataTableColumn, String>>,
}

impl DataTableBuilder for VecDataTableBuilder {
    fn append_row(&mut self, row: HashMap<DataTableColumn, String>) {
        self.rows.push(row);
    }
}
