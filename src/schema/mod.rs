//! Schema facade: the database capabilities the generator consumes.
//!
//! The engine never talks to a database client directly. It asks a
//! [`SchemaFacade`] for column listings, foreign keys, the current maximum key
//! and random rows, and hands finished batches back to it for insertion.
//!
//! Two implementations ship with the crate:
//! - [`DuckDbSchema`]: an embedded DuckDB database file
//! - [`MemorySchema`]: in-process tables, used for dry runs and tests

mod duckdb;
mod memory;

pub use self::duckdb::DuckDbSchema;
pub use memory::MemorySchema;

use rand::RngCore;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Declared storage type of a column, reduced to the categories the
/// type-based generators understand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Boolean,
    Date,
    DateTime,
    String,
    Text,
    /// Any other declared type (kept verbatim for warnings)
    Other(String),
}

impl ColumnType {
    /// Map a database type name onto a column category.
    ///
    /// Returns the category plus whether the type is an unsigned integer.
    pub fn from_sql_type(type_name: &str) -> (ColumnType, bool) {
        let upper = type_name.trim().to_uppercase();
        // Strip length/precision: VARCHAR(255), TIMESTAMP(6) ...
        let base = upper.split('(').next().unwrap_or("").trim();

        match base {
            "BIGINT" | "INT8" | "LONG" | "INTEGER" | "INT" | "INT4" | "SIGNED" | "SMALLINT"
            | "INT2" | "SHORT" | "TINYINT" | "INT1" | "HUGEINT" | "MEDIUMINT" => {
                (ColumnType::BigInt, false)
            }
            "UBIGINT" | "UINTEGER" | "USMALLINT" | "UTINYINT" | "UHUGEINT" => {
                (ColumnType::BigInt, true)
            }
            "BOOLEAN" | "BOOL" | "LOGICAL" => (ColumnType::Boolean, false),
            "DATE" => (ColumnType::Date, false),
            "VARCHAR" | "CHAR" | "BPCHAR" | "STRING" | "CHARACTER VARYING" | "NVARCHAR" => {
                (ColumnType::String, false)
            }
            "TEXT" | "CLOB" | "LONGTEXT" | "MEDIUMTEXT" => (ColumnType::Text, false),
            _ if base.starts_with("TIMESTAMP") || base == "DATETIME" => {
                (ColumnType::DateTime, false)
            }
            _ if base.ends_with("UNSIGNED") && base.contains("INT") => (ColumnType::BigInt, true),
            _ => (ColumnType::Other(type_name.trim().to_string()), false),
        }
    }

    /// Storage width in bits of an integer type name; 64 for anything else
    pub fn integer_bits(type_name: &str) -> u32 {
        let upper = type_name.trim().to_uppercase();
        let base = upper.split(['(', ' ']).next().unwrap_or("");
        match base {
            "TINYINT" | "INT1" | "UTINYINT" => 8,
            "SMALLINT" | "INT2" | "SHORT" | "USMALLINT" => 16,
            "MEDIUMINT" => 24,
            "INTEGER" | "INT" | "INT4" | "SIGNED" | "UINTEGER" => 32,
            _ => 64,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::BigInt => write!(f, "bigint"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::DateTime => write!(f, "datetime"),
            ColumnType::String => write!(f, "string"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Other(name) => write!(f, "{}", name.to_lowercase()),
        }
    }
}

/// One column of a table, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: ColumnType,
    /// Unsigned integer column (bigint values are drawn from 1..=max)
    pub unsigned: bool,
    /// Storage width of integer columns in bits
    pub bits: u32,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
            unsigned: false,
            bits: 64,
        }
    }

    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    /// Build a column from a database type name
    pub fn from_sql(name: impl Into<String>, type_name: &str) -> Self {
        let (data_type, unsigned) = ColumnType::from_sql_type(type_name);
        Self {
            name: name.into(),
            data_type,
            unsigned,
            bits: ColumnType::integer_bits(type_name),
        }
    }

    /// Smallest and largest integer the column can store, within i64
    pub fn int_bounds(&self) -> (i64, i64) {
        let bits = self.bits.clamp(8, 64);
        if self.unsigned {
            let max = if bits >= 63 { i64::MAX } else { (1i64 << bits) - 1 };
            (0, max)
        } else {
            let max = if bits >= 64 { i64::MAX } else { (1i64 << (bits - 1)) - 1 };
            (-max - 1, max)
        }
    }
}

/// A declared relationship from local columns to another table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    pub local_columns: Vec<String>,
    pub foreign_table: String,
    /// Referenced columns, paired by position with `local_columns` (may be empty)
    pub foreign_columns: Vec<String>,
}

impl ForeignKeyConstraint {
    pub fn new(local_columns: &[&str], foreign_table: &str, foreign_columns: &[&str]) -> Self {
        Self {
            local_columns: local_columns.iter().map(|c| c.to_string()).collect(),
            foreign_table: foreign_table.to_string(),
            foreign_columns: foreign_columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.local_columns.iter().any(|c| c == column)
    }

    /// Referenced column paired with `column`, if the constraint declares one
    pub fn counterpart(&self, column: &str) -> Option<&str> {
        let idx = self.local_columns.iter().position(|c| c == column)?;
        self.foreign_columns.get(idx).map(|s| s.as_str())
    }
}

/// Single-column predicate used when picking a random row
#[derive(Debug, Clone, PartialEq)]
pub enum RowFilter {
    Equals { column: String, value: Value },
    NotNull { column: String },
}

impl RowFilter {
    pub fn column(&self) -> &str {
        match self {
            RowFilter::Equals { column, .. } | RowFilter::NotNull { column } => column,
        }
    }

    pub fn matches(&self, row: &RowRecord) -> bool {
        match self {
            RowFilter::Equals { column, value } => row.get(column) == Some(value),
            RowFilter::NotNull { column } => row.get(column).is_some_and(|v| !v.is_null()),
        }
    }
}

/// A generated or fetched column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Bool(bool),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Display form used in prompts and review tables
    pub fn display(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Column name to value mapping that keeps column-declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    values: Vec<(String, Value)>,
}

impl RowRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, replacing any existing value for that column
    pub fn set(&mut self, column: &str, value: Value) {
        match self.values.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = RowRecord::new();
        for (column, value) in iter {
            row.set(&column, value);
        }
        row
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in &self.values {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Database capabilities required by the generator and the orchestrator
pub trait SchemaFacade {
    /// All table names, sorted
    fn list_tables(&self) -> anyhow::Result<Vec<String>>;

    /// Columns of `table` in declaration order
    fn list_columns(&self, table: &str) -> anyhow::Result<Vec<ColumnDefinition>>;

    /// Foreign keys declared on `table`, in declaration order
    fn list_foreign_keys(&self, table: &str) -> anyhow::Result<Vec<ForeignKeyConstraint>>;

    /// Largest integer value in `table.column`, `None` for an empty table
    fn max_value(&self, table: &str, column: &str) -> anyhow::Result<Option<i64>>;

    /// One row chosen with `rng` among those matching `filter`
    fn random_row(
        &self,
        table: &str,
        filter: &RowFilter,
        rng: &mut dyn RngCore,
    ) -> anyhow::Result<Option<RowRecord>>;

    /// `(key, display)` pairs for every row of `table`, used for parent selection
    fn key_display_pairs(
        &self,
        table: &str,
        key_column: &str,
        display_column: &str,
    ) -> anyhow::Result<Vec<(Value, String)>>;

    /// Insert the whole batch or nothing
    fn insert(&mut self, table: &str, rows: &[RowRecord]) -> anyhow::Result<()>;

    fn has_table(&self, table: &str) -> anyhow::Result<bool> {
        Ok(self.list_tables()?.iter().any(|t| t == table))
    }

    fn has_column(&self, table: &str, column: &str) -> anyhow::Result<bool> {
        Ok(self.list_columns(table)?.iter().any(|c| c.name == column))
    }
}

/// Quote an identifier for use in generated SQL
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
