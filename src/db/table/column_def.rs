use crate::core::types::DataType;

/// Definition of a single column in a table schema.
///
/// Specifies the column name and the data type declared for it in `types.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// The column name.
    pub name: String,

    /// The data type for values in this column.
    pub data_type: DataType,
}

impl ColumnDef {
    /// Creates a new column definition.
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_owned(),
            data_type,
        }
    }
}
