use std::fmt;

use crate::{Value, core::types::DataType};

/// A single-column filter condition supplied by the caller.
///
/// The variant fixes the input type the predicate accepts; it must match the
/// declared type of the column it is applied to. The output is always `bool`.
pub enum Predicate<'a> {
    Int64(Box<dyn Fn(i64) -> bool + 'a>),
    Text(Box<dyn Fn(&str) -> bool + 'a>),
}

impl<'a> Predicate<'a> {
    /// A predicate over an `int64` column.
    pub fn int64<F>(f: F) -> Self
    where
        F: Fn(i64) -> bool + 'a,
    {
        Predicate::Int64(Box::new(f))
    }

    /// A predicate over a text column.
    pub fn text<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + 'a,
    {
        Predicate::Text(Box::new(f))
    }

    /// The column type this predicate accepts.
    pub fn input_type(&self) -> DataType {
        match self {
            Predicate::Int64(_) => DataType::Int64,
            Predicate::Text(_) => DataType::Text,
        }
    }

    /// Applies the predicate to a cell.
    ///
    /// A value of the other kind never matches.
    pub fn test(&self, value: &Value) -> bool {
        match (self, value) {
            (Predicate::Int64(f), Value::Int64(v)) => f(*v),
            (Predicate::Text(f), Value::Text(v)) => f(v),
            _ => false,
        }
    }
}

impl fmt::Debug for Predicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate<{}>", self.input_type())
    }
}
