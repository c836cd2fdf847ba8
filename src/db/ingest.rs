//! Loading tables from their directories.
//!
//! Each table lives in its own directory holding exactly two files:
//! `data.csv` (a header row followed by data rows) and `types.csv` (the same
//! header row followed by a single row of type names).

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    DatabaseError,
    common::config::{DATA_FILE, TYPES_FILE},
    core::types::DataType,
    db::table::{Table, column_def::ColumnDef, schema::Schema, writer::TableWriter},
};

/// The raw contents of a table directory after cross-validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableSource {
    pub column_names: Vec<String>,
    pub column_types: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub data_path: PathBuf,
}

/// Derives a table name from its directory name: everything before the first `.`.
pub(crate) fn table_name(dir_name: &str) -> &str {
    dir_name.split('.').next().unwrap_or(dir_name)
}

/// Lists the table directories directly under `root`, sorted by name.
pub(crate) fn table_dirs(root: &Path) -> Result<Vec<PathBuf>, DatabaseError> {
    let mut dirs = Vec::new();

    for entry in std::fs::read_dir(root).map_err(DatabaseError::io(root))? {
        let entry = entry.map_err(DatabaseError::io(root))?;
        let file_type = entry.file_type().map_err(DatabaseError::io(entry.path()))?;

        if file_type.is_dir() {
            dirs.push(entry.path());
        } else {
            debug!(path = %entry.path().display(), "skipping non-directory entry");
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Reads and cross-validates the two files of a table directory.
pub(crate) fn read_table_dir(dir: &Path) -> Result<TableSource, DatabaseError> {
    let mut data_path = None;
    let mut types_path = None;

    for entry in std::fs::read_dir(dir).map_err(DatabaseError::io(dir))? {
        let entry = entry.map_err(DatabaseError::io(dir))?;
        let file_name = entry.file_name().to_string_lossy().into_owned();

        match file_name.as_str() {
            DATA_FILE => data_path = Some(entry.path()),
            TYPES_FILE => types_path = Some(entry.path()),
            _ => {
                return Err(DatabaseError::UnexpectedFile {
                    dir: dir.to_path_buf(),
                    file: file_name,
                });
            }
        }
    }

    let data_path = data_path.ok_or_else(|| DatabaseError::MissingFile {
        dir: dir.to_path_buf(),
        file: DATA_FILE,
    })?;
    let types_path = types_path.ok_or_else(|| DatabaseError::MissingFile {
        dir: dir.to_path_buf(),
        file: TYPES_FILE,
    })?;

    let (column_names, rows) = read_csv(&data_path)?;
    let (type_header, mut type_rows) = read_csv(&types_path)?;

    let column_types = match type_rows.len() {
        0 => {
            return Err(DatabaseError::MissingTypes {
                dir: dir.to_path_buf(),
            });
        }
        1 => type_rows.remove(0),
        count => {
            return Err(DatabaseError::ExtraTypeRows {
                dir: dir.to_path_buf(),
                count,
            });
        }
    };

    if column_names != type_header {
        return Err(DatabaseError::ColumnMismatch {
            dir: dir.to_path_buf(),
            data: column_names,
            types: type_header,
        });
    }

    debug!(
        dir = %dir.display(),
        columns = column_names.len(),
        rows = rows.len(),
        "read table files"
    );

    Ok(TableSource {
        column_names,
        column_types,
        rows,
        data_path,
    })
}

/// Reads a CSV file into its header and remaining rows.
fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), DatabaseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(DatabaseError::csv(path))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(DatabaseError::csv(path))?
        .iter()
        .map(str::to_owned)
        .collect();

    if header.is_empty() {
        return Err(DatabaseError::EmptyHeader {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(DatabaseError::csv(path))?;
        rows.push(record.iter().map(str::to_owned).collect());
    }

    Ok((header, rows))
}

/// Builds a schema from parallel lists of column names and type names.
pub(crate) fn build_schema(table: &str, names: &[String], types: &[String]) -> Schema {
    let columns = names
        .iter()
        .zip(types)
        .map(|(name, type_name)| {
            let (data_type, fell_back) = DataType::from_type_name(type_name);
            if fell_back {
                warn!(table, column = %name, type_name = %type_name, "unknown column type, using text");
            }
            ColumnDef::new(name, data_type)
        })
        .collect();

    Schema::new(columns)
}

/// Runs the whole pipeline for one table directory.
pub(crate) fn load_table(dir: &Path) -> Result<Table, DatabaseError> {
    let dir_name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = table_name(&dir_name).to_owned();

    let source = read_table_dir(dir)?;
    let schema = build_schema(&name, &source.column_names, &source.column_types);

    let records = source
        .rows
        .iter()
        .enumerate()
        .map(|(idx, cells)| schema.decode_row(&name, idx + 1, cells))
        .collect::<Result<Vec<_>, _>>()?;

    let writer = TableWriter::open(&source.data_path)?;

    Ok(Table::new(name, schema, records, writer))
}
