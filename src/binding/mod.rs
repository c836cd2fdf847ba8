//! Mapping between in-memory records and caller-defined structs.
//!
//! A struct opts in by implementing [`Entity`], which names its table and
//! lists one [`Binding`] per field that corresponds to a column. Fields with
//! no binding are never read or written.
//!
//! ```
//! use dpool_csv::{Bindings, Entity};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     first_name: String,
//!     age: i64,
//!     nickname: String,
//! }
//!
//! impl Entity for User {
//!     fn bindings() -> Bindings<Self> {
//!         Bindings::<Self>::new()
//!             .text("firstname", |u| u.first_name.clone(), |u, v| u.first_name = v)
//!             .int64("age", |u| u.age, |u, v| u.age = v)
//!     }
//! }
//!
//! assert_eq!(User::table_name(), "user");
//! ```

use tracing::debug;

use crate::{
    DatabaseError, Value,
    core::types::DataType,
    db::table::{record::Record, schema::Schema},
};

/// A struct whose fields are bound to the columns of one table.
pub trait Entity: Default {
    /// Name of the table this struct maps to.
    ///
    /// Defaults to the struct's own name, lowercased, without its module path.
    fn table_name() -> String {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base).to_lowercase()
    }

    /// The field bindings for this struct.
    fn bindings() -> Bindings<Self>;
}

/// How one field is read from and written to its column.
pub enum Binding<T> {
    Int64 {
        column: &'static str,
        get: fn(&T) -> i64,
        set: fn(&mut T, i64),
    },
    Text {
        column: &'static str,
        get: fn(&T) -> String,
        set: fn(&mut T, String),
    },
}

impl<T> Binding<T> {
    pub fn column(&self) -> &'static str {
        match self {
            Binding::Int64 { column, .. } | Binding::Text { column, .. } => column,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Binding::Int64 { .. } => DataType::Int64,
            Binding::Text { .. } => DataType::Text,
        }
    }
}

/// The ordered set of field bindings for an [`Entity`].
pub struct Bindings<T> {
    fields: Vec<Binding<T>>,
}

impl<T> Default for Bindings<T> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<T> Bindings<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an integer field to `column`.
    pub fn int64(mut self, column: &'static str, get: fn(&T) -> i64, set: fn(&mut T, i64)) -> Self {
        self.fields.push(Binding::Int64 { column, get, set });
        self
    }

    /// Binds a text field to `column`.
    ///
    /// `get` produces the text stored for the field, so any field with a text
    /// form can be bound this way.
    pub fn text(
        mut self,
        column: &'static str,
        get: fn(&T) -> String,
        set: fn(&mut T, String),
    ) -> Self {
        self.fields.push(Binding::Text { column, get, set });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding<T>> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks every bound column that the schema knows against its declared type.
    ///
    /// Bound columns the schema lacks are allowed here; reading skips them.
    pub fn check(&self, table: &str, schema: &Schema) -> Result<(), DatabaseError> {
        for binding in &self.fields {
            let Some(expected) = schema.data_type(binding.column()) else {
                continue;
            };

            if expected != binding.data_type() {
                return Err(DatabaseError::TypeMismatch {
                    table: table.to_owned(),
                    column: binding.column().to_owned(),
                    expected,
                    found: binding.data_type(),
                });
            }
        }

        Ok(())
    }

    /// Copies the bound columns of `record` into `target`.
    ///
    /// Columns missing from the record, or holding a value of the other
    /// kind, leave their field untouched.
    pub fn read(&self, target: &mut T, record: &Record) {
        for binding in &self.fields {
            match (binding, record.get(binding.column())) {
                (Binding::Int64 { set, .. }, Some(Value::Int64(value))) => (*set)(target, *value),
                (Binding::Text { set, .. }, Some(Value::Text(value))) => {
                    (*set)(target, value.clone())
                }
                (_, None) => debug!(column = binding.column(), "column not in record"),
                (_, Some(_)) => {}
            }
        }
    }

    /// Flattens the bound fields of `source` into a record.
    pub fn write(&self, source: &T) -> Record {
        let mut record = Record::new();

        for binding in &self.fields {
            match binding {
                Binding::Int64 { column, get, .. } => record.insert(*column, (*get)(source)),
                Binding::Text { column, get, .. } => record.insert(*column, (*get)(source)),
            };
        }

        record
    }
}

/// Materializes a fresh `T` from a record.
pub(crate) fn materialize<T: Entity>(bindings: &Bindings<T>, record: &Record) -> T {
    let mut value = T::default();
    bindings.read(&mut value, record);
    value
}
