use strum::{Display, EnumString};

/// Column types supported by the store.
///
/// A column's type is declared by name in the table's `types.csv`. Only
/// `int64` selects [`DataType::Int64`]; every other name is treated as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum DataType {
    /// 64-bit signed integer.
    #[strum(serialize = "int64")]
    Int64,

    /// UTF-8 text, stored verbatim.
    #[strum(to_string = "text", serialize = "string")]
    Text,
}

impl DataType {
    /// Resolves a declared type name from a types file.
    ///
    /// Unrecognized names fall back to [`DataType::Text`]. The second element
    /// reports whether the fallback was taken.
    pub fn from_type_name(name: &str) -> (DataType, bool) {
        match name.parse::<DataType>() {
            Ok(data_type) => (data_type, false),
            Err(_) => (DataType::Text, true),
        }
    }
}

/// A single cell value held in memory.
///
/// Values are strongly typed and correspond to [`DataType`] definitions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    /// A 64-bit signed integer value.
    Int64(i64),

    /// A UTF-8 text string.
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int64(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Value {
    /// Returns the data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int64(_) => DataType::Int64,
            Value::Text(_) => DataType::Text,
        }
    }

    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Int64(_) => None,
        }
    }

    /// Coerces a raw CSV cell into a value of the given type.
    ///
    /// Integer cells must hold plain decimal text; anything else is rejected
    /// rather than defaulted. Text cells are kept as-is.
    pub fn parse(raw: &str, data_type: DataType) -> Result<Value, std::num::ParseIntError> {
        match data_type {
            DataType::Int64 => raw.parse::<i64>().map(Value::Int64),
            DataType::Text => Ok(Value::Text(raw.to_owned())),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}
