use std::fmt::Write;

use crate::DatabaseError;

pub mod column_def;
pub mod record;
pub mod schema;
pub mod writer;

use record::Record;
use schema::Schema;
use writer::TableWriter;

/// A named table held in memory.
///
/// Holds the records in insertion order, the schema they conform to, and the
/// append handle on the table's `data.csv`. Records are only ever added.
#[derive(Debug)]
pub struct Table {
    name: String,
    schema: Schema,
    records: Vec<Record>,
    writer: TableWriter,
}

impl Table {
    pub(crate) fn new(
        name: String,
        schema: Schema,
        records: Vec<Record>,
        writer: TableWriter,
    ) -> Self {
        Self {
            name,
            schema,
            records,
            writer,
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table's schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns every record in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record and mirrors it to the data file.
    ///
    /// The row is written and flushed first; the in-memory table only grows
    /// once the write succeeded, so a failed write leaves the table unchanged.
    pub(crate) fn insert(&mut self, record: Record) -> Result<(), DatabaseError> {
        let row = self.schema.encode_row(&record);
        self.writer.append(&[row])?;
        self.records.push(record);
        Ok(())
    }

    /// Renders the header and every record as an aligned text grid.
    pub fn describe(&self) -> String {
        let mut out = String::new();

        let _ = write!(out, "{: <8}", self.name);
        for column in &self.schema.columns {
            let _ = write!(out, " | {: <8}", column.name);
        }
        out.push('\n');

        for (idx, record) in self.records.iter().enumerate() {
            let _ = write!(out, "{: <8}", idx);
            for column in &self.schema.columns {
                let cell = record
                    .get(&column.name)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let _ = write!(out, " | {: <8}", cell);
            }
            out.push('\n');
        }

        out
    }
}
