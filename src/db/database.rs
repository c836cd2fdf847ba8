use std::{collections::BTreeMap, path::Path};

use tracing::{debug, info, warn};

use crate::{
    DatabaseError,
    binding::Entity,
    common::config::{DatabaseConfig, LoadPolicy},
    core::types::DataType,
    db::{ingest, table::Table},
    query::{filter, predicate::Predicate},
};

/// The main database handle.
///
/// `Database` is the only entry point callers use. It owns every loaded
/// [`Table`], keyed by table name, and maps between them and caller structs
/// implementing [`Entity`].
///
/// # Layout
///
/// Tables are loaded by [`Database::ingest`] from a root directory holding
/// one subdirectory per table:
///
/// ```text
/// <root>/<table>/data.csv    header row, then one row per record
/// <root>/<table>/types.csv   same header row, then one row of type names
/// ```
///
/// The table name is the subdirectory name up to its first `.`. Records
/// inserted with [`Database::set`] are appended to the table's `data.csv`.
///
/// # Concurrency
///
/// Operations run to completion on the calling thread. Mutation requires
/// `&mut self`, so sharing a database across threads needs external locking.
#[derive(Debug, Default)]
pub struct Database {
    /// All tables currently loaded, by name.
    tables: BTreeMap<String, Table>,

    config: DatabaseConfig,
}

impl Database {
    /// Creates an empty database with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty database with the given configuration.
    pub fn with_config(config: DatabaseConfig) -> Self {
        Self {
            tables: BTreeMap::default(),
            config,
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Loads every table directory directly under `path`.
    ///
    /// Relative paths are resolved with [`DatabaseConfig::resolve`]. A table
    /// whose name is already registered is replaced. Tables loaded before a
    /// failure stay registered.
    ///
    /// With [`LoadPolicy::Abort`] the first failing table's error is
    /// returned. With [`LoadPolicy::Continue`] the remaining tables are still
    /// loaded and every failure is reported in one [`DatabaseError::Ingest`].
    pub fn ingest<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DatabaseError> {
        let root = self.config.resolve(path.as_ref());
        let mut failures = Vec::new();
        let mut loaded = 0;

        for dir in ingest::table_dirs(&root)? {
            match ingest::load_table(&dir) {
                Ok(table) => {
                    info!(
                        table = table.name(),
                        rows = table.len(),
                        columns = table.schema().len(),
                        "loaded table"
                    );
                    loaded += 1;
                    if let Some(previous) = self.tables.insert(table.name().to_owned(), table) {
                        debug!(table = previous.name(), "replaced existing table");
                    }
                }
                Err(err) => match self.config.load_policy {
                    LoadPolicy::Abort => {
                        warn!(dir = %dir.display(), error = %err, "table failed to load, aborting ingest");
                        return Err(err);
                    }
                    LoadPolicy::Continue => {
                        warn!(dir = %dir.display(), error = %err, "skipping table that failed to load");
                        failures.push(err);
                    }
                },
            }
        }

        info!(root = %root.display(), loaded, failed = failures.len(), "ingest finished");

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DatabaseError::Ingest { root, failures })
        }
    }

    /// Checks if a table is loaded.
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Gets an immutable reference to a table.
    pub fn get_table(&self, name: &str) -> Result<&Table, DatabaseError> {
        self.tables
            .get(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }

    /// Gets a mutable reference to a table.
    fn get_table_mut(&mut self, name: &str) -> Result<&mut Table, DatabaseError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }

    /// Names of all loaded tables, sorted.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of records in the table backing `T`.
    pub fn count<T: Entity>(&self) -> Result<usize, DatabaseError> {
        Ok(self.get_table(&T::table_name())?.len())
    }

    /// Reads the record at `index` of `T`'s table into `dst`.
    ///
    /// Bound fields whose column the table lacks are left as they were.
    pub fn get<T: Entity>(&self, dst: &mut T, index: usize) -> Result<(), DatabaseError> {
        let table = self.get_table(&T::table_name())?;

        let record = table
            .get(index)
            .ok_or_else(|| DatabaseError::IndexOutOfRange {
                table: table.name().to_owned(),
                index,
                len: table.len(),
            })?;

        let bindings = T::bindings();
        bindings.check(table.name(), table.schema())?;
        bindings.read(dst, record);

        Ok(())
    }

    /// Inserts `src` as a new record of `T`'s table.
    ///
    /// The table must already exist. The record is written to `data.csv`
    /// first and only added in memory once the write succeeded. Text columns
    /// that `T` does not bind are stored as empty text; an unbound `int64`
    /// column is an error.
    pub fn set<T: Entity>(&mut self, src: &T) -> Result<(), DatabaseError> {
        let table = self.get_table_mut(&T::table_name())?;

        let bindings = T::bindings();
        bindings.check(table.name(), table.schema())?;
        let mut record = bindings.write(src);

        if let Some((column, _)) = record
            .iter()
            .find(|(column, _)| table.schema().get_column_index(column).is_none())
        {
            return Err(DatabaseError::ColumnNotFound {
                table: table.name().to_owned(),
                column: column.to_owned(),
            });
        }

        let mut unbound = Vec::new();
        for column in &table.schema().columns {
            if record.contains(&column.name) {
                continue;
            }
            if column.data_type == DataType::Int64 {
                return Err(DatabaseError::UnboundColumn {
                    table: table.name().to_owned(),
                    column: column.name.clone(),
                });
            }
            unbound.push(column.name.clone());
        }

        // Memory holds the same empty text the data file gets for these cells.
        if !unbound.is_empty() {
            warn!(table = table.name(), ?unbound, "inserting record with unbound columns left empty");
            for column in unbound {
                record.insert(column, String::new());
            }
        }

        table.insert(record)?;
        debug!(table = table.name(), rows = table.len(), "inserted record");

        Ok(())
    }

    /// Appends every record of `T`'s table whose `column` satisfies
    /// `predicate` to `dst`, in table order.
    ///
    /// The column must exist and its declared type must match the
    /// predicate's input type; otherwise an error is returned and no record
    /// is examined. Existing contents of `dst` are kept.
    pub fn filter<T: Entity>(
        &self,
        dst: &mut Vec<T>,
        column: &str,
        predicate: Predicate<'_>,
    ) -> Result<(), DatabaseError> {
        let table = self.get_table(&T::table_name())?;
        filter::filter_into(table, column, &predicate, dst)?;
        Ok(())
    }

    /// Renders a table's current contents as text.
    pub fn describe_table(&self, name: &str) -> Result<String, DatabaseError> {
        let described = self.get_table(name)?.describe();
        debug!(table = name, "\n{described}");
        Ok(described)
    }
}
