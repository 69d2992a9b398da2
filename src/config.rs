//! YAML configuration for the seeder.
//!
//! Every key is optional. A missing file means built-in defaults: key column
//! `id`, no parent model, and the default type windows and word counts.

use crate::error::SeedError;
use crate::generator::types::{validate_format, RelativeTime};
use crate::generator::FakeKind;
use crate::schema::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "cli-seeder.yaml";

/// Complete YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeederConfig {
    /// Database file to seed
    pub database: Option<PathBuf>,
    /// Key column name; key-suffixed columns end in `_<primary_key>`
    pub primary_key: String,
    /// Random seed for reproducible generation
    pub seed: Option<u64>,
    /// Parent model that generated rows are linked to
    pub parent: Option<ParentConfig>,
    /// Per-data-type generator options
    pub data_types: DataTypeOptions,
    /// Extra semantic providers, consulted after the built-in name patterns
    pub providers: Vec<ProviderConfig>,
    /// Per-table, per-column value-set overrides
    pub tables: HashMap<String, HashMap<String, ColumnOverride>>,
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            database: None,
            primary_key: "id".to_string(),
            seed: None,
            parent: None,
            data_types: DataTypeOptions::default(),
            providers: Vec::new(),
            tables: HashMap::new(),
        }
    }
}

/// Parent model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentConfig {
    /// Table holding the parent records
    pub table: String,
    /// Parent key column (defaults to the top-level `primary_key`)
    #[serde(default)]
    pub primary_key: Option<String>,
    /// Column shown when choosing a parent
    #[serde(default = "default_display_name")]
    pub display_name: String,
    /// Column name child tables use to reference the parent
    #[serde(default)]
    pub foreign_key: Option<String>,
}

fn default_display_name() -> String {
    "name".to_string()
}

impl ParentConfig {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            primary_key: None,
            display_name: default_display_name(),
            foreign_key: None,
        }
    }

    pub fn key_column<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.primary_key.as_deref().unwrap_or(fallback)
    }

    /// Foreign key name, e.g. `hotels` + `id` -> `hotel_id`
    pub fn foreign_key_name(&self, fallback_key: &str) -> String {
        match &self.foreign_key {
            Some(name) => name.clone(),
            None => format!(
                "{}_{}",
                singularize(&self.table.to_lowercase()),
                self.key_column(fallback_key)
            ),
        }
    }
}

/// Naive English singular for table names
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{}y", stem)
    } else if word.ends_with("sses")
        || word.ends_with("xes")
        || word.ends_with("ches")
        || word.ends_with("shes")
    {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Options for each declared data type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTypeOptions {
    pub bigint: IntRange,
    pub date: TimeWindow,
    pub datetime: TimeWindow,
    /// Word count for `string` columns
    pub string: CountRange,
    /// Paragraph count for `text` columns
    pub text: CountRange,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// Relative window such as `-6 months` .. `+6 months`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeWindow {
    pub from: Option<String>,
    pub to: Option<String>,
    /// chrono strftime format
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CountRange {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

/// Extra semantic provider: columns containing `pattern` use `generator`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub pattern: String,
    pub generator: String,
}

/// Restrict a column to a fixed set of values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnOverride {
    pub values: Vec<ConfigValue>,
}

/// Scalar as written in YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl ConfigValue {
    pub fn to_value(&self) -> Value {
        match self {
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Int(n) => Value::Int(*n),
            ConfigValue::Text(s) => Value::Text(s.clone()),
        }
    }
}

impl SeederConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SeederConfig = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or the default file when present, or built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Check ranges, time expressions and provider names
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.primary_key.trim().is_empty() {
            return Err(SeedError::Config("primary_key cannot be empty".to_string()).into());
        }

        if let (Some(min), Some(max)) = (self.data_types.bigint.min, self.data_types.bigint.max) {
            if min > max {
                return Err(SeedError::Config(format!(
                    "data_types.bigint: min ({}) is greater than max ({})",
                    min, max
                ))
                .into());
            }
        }

        for (name, window) in [
            ("date", &self.data_types.date),
            ("datetime", &self.data_types.datetime),
        ] {
            for expr in [&window.from, &window.to].into_iter().flatten() {
                expr.parse::<RelativeTime>().map_err(|e| {
                    SeedError::Config(format!("data_types.{}: {}", name, e))
                })?;
            }
            if let Some(format) = &window.format {
                validate_format(format)
                    .map_err(|e| SeedError::Config(format!("data_types.{}: {}", name, e)))?;
            }
        }

        for (name, range) in [
            ("string", &self.data_types.string),
            ("text", &self.data_types.text),
        ] {
            let min = range.min.unwrap_or(1);
            let max = range.max.unwrap_or(3.max(min));
            if min == 0 || min > max {
                return Err(SeedError::Config(format!(
                    "data_types.{}: counts must satisfy 1 <= min <= max (got {}..{})",
                    name, min, max
                ))
                .into());
            }
        }

        for provider in &self.providers {
            if provider.pattern.is_empty() {
                return Err(SeedError::Config("provider pattern cannot be empty".to_string()).into());
            }
            provider
                .generator
                .parse::<FakeKind>()
                .map_err(SeedError::Config)?;
        }

        for (table, columns) in &self.tables {
            for (column, column_override) in columns {
                if column_override.values.is_empty() {
                    return Err(SeedError::Config(format!(
                        "tables.{}.{}: values cannot be empty",
                        table, column
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Value-set override for `table.column` (case-insensitive)
    pub fn column_override(&self, table: &str, column: &str) -> Option<&ColumnOverride> {
        let columns = self.tables.get(table).or_else(|| {
            let lower = table.to_lowercase();
            self.tables
                .iter()
                .find(|(k, _)| k.to_lowercase() == lower)
                .map(|(_, v)| v)
        })?;

        columns.get(column).or_else(|| {
            let lower = column.to_lowercase();
            columns
                .iter()
                .find(|(k, _)| k.to_lowercase() == lower)
                .map(|(_, v)| v)
        })
    }

    /// Suffix marking foreign-key columns, e.g. `_id`
    pub fn key_suffix(&self) -> String {
        format!("_{}", self.primary_key)
    }
}
