//! Database configuration.

use std::path::{Path, PathBuf};

/// File holding a table's header row and data rows.
pub const DATA_FILE: &str = "data.csv";

/// File holding a table's header row and one row of column type names.
pub const TYPES_FILE: &str = "types.csv";

/// What [`Database::ingest`](crate::Database::ingest) does when a table fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Stop at the first failing table and return its error.
    ///
    /// Tables registered before the failure stay registered.
    Abort,

    /// Skip failing tables, load the rest, and report every failure together.
    #[default]
    Continue,
}

/// Configuration for a [`Database`](crate::Database).
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Directory that relative ingest paths are resolved against.
    ///
    /// `None` resolves them against the process working directory.
    pub base_dir: Option<PathBuf>,

    /// Recovery policy for table load failures.
    pub load_policy: LoadPolicy,
}

impl DatabaseConfig {
    pub fn with_base_dir<P: AsRef<Path>>(mut self, base_dir: P) -> Self {
        self.base_dir = Some(base_dir.as_ref().to_path_buf());
        self
    }

    pub fn with_load_policy(mut self, load_policy: LoadPolicy) -> Self {
        self.load_policy = load_policy;
        self
    }

    /// Resolves an ingest path against [`DatabaseConfig::base_dir`].
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
