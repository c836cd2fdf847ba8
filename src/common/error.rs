use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::types::DataType;

/// Errors returned by every fallible database operation.
#[derive(Debug, Error, Diagnostic)]
pub enum DatabaseError {
    /// Reading a directory or opening/writing a file failed.
    #[error("IO error on {path}: {source}")]
    #[diagnostic(code(dpool::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The CSV codec rejected a file, or writing a row failed.
    #[error("CSV error in {path}: {source}")]
    #[diagnostic(code(dpool::csv))]
    Csv { path: PathBuf, source: csv::Error },

    /// A table directory holds a file other than `data.csv` and `types.csv`.
    #[error("invalid file names in {dir}: unexpected file `{file}`")]
    #[diagnostic(
        code(dpool::ingest::unexpected_file),
        help("a table directory may only contain `data.csv` and `types.csv`")
    )]
    UnexpectedFile { dir: PathBuf, file: String },

    /// One of the two table files is absent.
    #[error("missing `{file}` in {dir}")]
    #[diagnostic(code(dpool::ingest::missing_file))]
    MissingFile { dir: PathBuf, file: &'static str },

    /// A file has no header row.
    #[error("no header row in {path}")]
    #[diagnostic(code(dpool::ingest::empty_header))]
    EmptyHeader { path: PathBuf },

    /// The types file has a header but no type row.
    #[error("no column types in {dir}")]
    #[diagnostic(
        code(dpool::ingest::missing_types),
        help("`types.csv` needs a header row followed by exactly one row of type names")
    )]
    MissingTypes { dir: PathBuf },

    /// The types file has more than one type row.
    #[error("expected one row of column types in {dir}, found {count}")]
    #[diagnostic(code(dpool::ingest::extra_type_rows))]
    ExtraTypeRows { dir: PathBuf, count: usize },

    /// The headers of `data.csv` and `types.csv` differ.
    #[error("column names dont match between files in {dir}: data has {data:?}, types has {types:?}")]
    #[diagnostic(code(dpool::ingest::column_mismatch))]
    ColumnMismatch {
        dir: PathBuf,
        data: Vec<String>,
        types: Vec<String>,
    },

    /// A cell in an `int64` column is not a decimal integer.
    #[error("invalid int64 `{value}` in column `{column}` of table `{table}` at row {row}")]
    #[diagnostic(code(dpool::ingest::invalid_integer))]
    InvalidInteger {
        table: String,
        column: String,
        row: usize,
        value: String,
        source: std::num::ParseIntError,
    },

    /// One or more tables failed to load.
    #[error("{} table(s) failed to ingest from {root}", .failures.len())]
    #[diagnostic(code(dpool::ingest::failed))]
    Ingest {
        root: PathBuf,
        #[related]
        failures: Vec<DatabaseError>,
    },

    #[error("Table not found: {0}")]
    #[diagnostic(code(dpool::table_not_found))]
    TableNotFound(String),

    #[error("Column not found: `{column}` in table `{table}`")]
    #[diagnostic(code(dpool::column_not_found))]
    ColumnNotFound { table: String, column: String },

    /// An inserted shape leaves an `int64` column without a value.
    #[error("Column `{column}` of table `{table}` is int64 and must be bound to insert")]
    #[diagnostic(
        code(dpool::unbound_int64_column),
        help("an empty cell cannot be read back as int64; bind the column in the shape")
    )]
    UnboundColumn { table: String, column: String },

    #[error("index {index} out of range for table `{table}` with {len} row(s)")]
    #[diagnostic(code(dpool::index_out_of_range))]
    IndexOutOfRange {
        table: String,
        index: usize,
        len: usize,
    },

    /// A field binding or predicate disagrees with a column's declared type.
    #[error("Type mismatch on `{table}.{column}`: column is {expected}, got {found}")]
    #[diagnostic(code(dpool::type_mismatch))]
    TypeMismatch {
        table: String,
        column: String,
        expected: DataType,
        found: DataType,
    },
}

impl DatabaseError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>) -> impl FnOnce(csv::Error) -> Self {
        let path = path.into();
        move |source| Self::Csv { path, source }
    }
}
