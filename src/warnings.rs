//! Non-fatal conditions raised while generating a session.
//!
//! Warnings never abort generation; they are collected and reported by the
//! caller once the batch is built.

/// Warning types that can occur during generation
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationWarning {
    /// Column type has no type-based generator; the column is set to NULL
    UnsupportedType {
        table: String,
        column: String,
        data_type: String,
    },
    /// Parent model configuration could not be used; rows are not linked to a parent
    ParentUnavailable { reason: String },
    /// Key-suffixed column had a constraint but no related row matched
    ForeignKeyUnresolved {
        table: String,
        column: String,
        foreign_table: String,
    },
}

impl std::fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationWarning::UnsupportedType {
                table,
                column,
                data_type,
            } => write!(
                f,
                "Unsupported data type: {} ({}.{}). Using value 'null'.",
                data_type, table, column
            ),
            GenerationWarning::ParentUnavailable { reason } => {
                write!(f, "The parent model configuration is invalid: {}", reason)
            }
            GenerationWarning::ForeignKeyUnresolved {
                table,
                column,
                foreign_table,
            } => write!(
                f,
                "No related row in {} for {}.{}; generated a value from the column type",
                foreign_table, table, column
            ),
        }
    }
}

/// Collects warnings during a generation session
#[derive(Debug)]
pub struct WarningCollector {
    warnings: Vec<GenerationWarning>,
    max_warnings: usize,
}

impl Default for WarningCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl WarningCollector {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            max_warnings: 100,
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            warnings: Vec::new(),
            max_warnings: limit,
        }
    }

    /// Add a warning; repeats for the same column are dropped
    pub fn add(&mut self, warning: GenerationWarning) {
        if self.warnings.len() < self.max_warnings
            && !self.warnings.iter().any(|w| Self::is_similar(w, &warning))
        {
            self.warnings.push(warning);
        }
    }

    fn is_similar(a: &GenerationWarning, b: &GenerationWarning) -> bool {
        match (a, b) {
            (
                GenerationWarning::UnsupportedType {
                    table: t1,
                    column: c1,
                    ..
                },
                GenerationWarning::UnsupportedType {
                    table: t2,
                    column: c2,
                    ..
                },
            )
            | (
                GenerationWarning::ForeignKeyUnresolved {
                    table: t1,
                    column: c1,
                    ..
                },
                GenerationWarning::ForeignKeyUnresolved {
                    table: t2,
                    column: c2,
                    ..
                },
            ) => t1 == t2 && c1 == c2,
            _ => a == b,
        }
    }

    pub fn warnings(&self) -> &[GenerationWarning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    /// Print all warnings to stderr
    pub fn print_summary(&self) {
        for warning in &self.warnings {
            eprintln!("Warning: {}", warning);
        }
    }
}
