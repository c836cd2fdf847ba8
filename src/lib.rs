//! A small in-memory table store loaded from directories of CSV files.
//!
//! Each table is a directory holding `data.csv` and `types.csv`. Tables are
//! loaded with [`Database::ingest`], read and written through caller structs
//! implementing [`Entity`], and filtered with a typed [`Predicate`]. Inserted
//! records are appended to the table's `data.csv`.

pub(crate) mod binding;
pub(crate) mod common;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod query;

pub use binding::{Binding, Bindings, Entity};
pub use common::{
    config::{DATA_FILE, DatabaseConfig, LoadPolicy, TYPES_FILE},
    error::DatabaseError,
};
pub use crate::core::types::{DataType, Value};
pub use db::{
    database::Database,
    table::{Table, column_def::ColumnDef, record::Record, schema::Schema},
};
pub use query::predicate::Predicate;
