use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use crate::DatabaseError;

/// Append handle on a table's backing data file.
///
/// Opened once when the table is ingested and held until the table is
/// dropped. Every call to [`TableWriter::append`] is flushed before it
/// returns.
pub struct TableWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl TableWriter {
    /// Opens `path` for appending.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(DatabaseError::io(path))?;

        // A data file whose last line has no terminator would glue the next
        // row onto it.
        if !ends_with_newline(path)? {
            file.write_all(b"\n").map_err(DatabaseError::io(path))?;
        }

        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Appends positional rows to the end of the file.
    pub fn append(&mut self, rows: &[Vec<String>]) -> Result<(), DatabaseError> {
        for row in rows {
            self.writer
                .write_record(row)
                .map_err(DatabaseError::csv(&self.path))?;
        }

        self.writer.flush().map_err(DatabaseError::io(&self.path))
    }
}

impl std::fmt::Debug for TableWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableWriter").field("path", &self.path).finish()
    }
}

/// Reads only the last byte of the file. An empty file counts as terminated.
fn ends_with_newline(path: &Path) -> Result<bool, DatabaseError> {
    let mut file = File::open(path).map_err(DatabaseError::io(path))?;
    let len = file.metadata().map_err(DatabaseError::io(path))?.len();
    if len == 0 {
        return Ok(true);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))
        .and_then(|_| file.read_exact(&mut last))
        .map_err(DatabaseError::io(path))?;

    Ok(last[0] == b'\n')
}
