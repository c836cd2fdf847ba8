use super::{column_def::ColumnDef, record::Record};
use crate::{DatabaseError, Value, core::types::DataType};

/// A table schema defining the structure of rows.
///
/// A schema is an ordered list of column definitions. A column's position in
/// the list is the position it takes when a row is written back to the data
/// file. The column set is fixed when the table is ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// The ordered list of column definitions.
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    /// Creates a new schema from a vector of column definitions.
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    /// Finds the index of a column by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    /// Finds a column definition by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|col| col.name == name)
    }

    /// Returns the declared type of a column.
    pub fn data_type(&self, name: &str) -> Option<DataType> {
        self.column(name).map(|col| col.data_type)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|col| col.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Decodes a raw data row into a record.
    ///
    /// Cells are coerced according to each column's type. `row` is the
    /// 1-based data row number used in error messages.
    pub(crate) fn decode_row(
        &self,
        table: &str,
        row: usize,
        cells: &[String],
    ) -> Result<Record, DatabaseError> {
        let mut record = Record::new();

        for (column, raw) in self.columns.iter().zip(cells) {
            let value = Value::parse(raw, column.data_type).map_err(|source| {
                DatabaseError::InvalidInteger {
                    table: table.to_owned(),
                    column: column.name.clone(),
                    row,
                    value: raw.clone(),
                    source,
                }
            })?;
            record.insert(column.name.as_str(), value);
        }

        Ok(record)
    }

    /// Encodes a record into a positional row for the data file.
    ///
    /// The row always has one cell per column. Columns absent from the
    /// record are left as empty cells.
    pub(crate) fn encode_row(&self, record: &Record) -> Vec<String> {
        let mut cells = vec![String::new(); self.columns.len()];

        for (column, value) in record.iter() {
            if let Some(index) = self.get_column_index(column) {
                cells[index] = value.to_string();
            }
        }

        cells
    }
}
