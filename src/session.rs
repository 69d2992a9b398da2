//! Generation sessions and the row-building loop.

use crate::config::SeederConfig;
use crate::error::SeedError;
use crate::generator::{GenerationContext, ValueRegistry};
use crate::schema::{ColumnDefinition, RowRecord, SchemaFacade, Value};
use crate::warnings::WarningCollector;
use anyhow::Result;
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Owner record that generated rows are linked to
#[derive(Debug, Clone, PartialEq)]
pub struct ParentContext {
    pub primary_key: Value,
    /// Column that child tables use to reference the parent, e.g. `hotel_id`
    pub foreign_key_name: String,
    pub display_value: String,
}

/// Parse a user-entered row count; only integers above zero are accepted
pub fn parse_row_count(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    match trimmed.parse::<i64>().map(usize::try_from) {
        Ok(Ok(n)) if n > 0 => Ok(n),
        _ => Err(SeedError::InvalidRowCount(trimmed.to_string()).into()),
    }
}

/// State of one generate invocation
#[derive(Debug)]
pub struct GenerationSession {
    pub table: String,
    pub columns: Vec<ColumnDefinition>,
    pub parent: Option<ParentContext>,
    pub row_count: usize,
    pub rows: Vec<RowRecord>,
    /// Key column as declared on the table, matched case-insensitively
    pub key_column: Option<String>,
    /// Highest key assigned so far, seeded from the table's current maximum
    pub running_max_id: i64,
    pub warnings: WarningCollector,
}

impl GenerationSession {
    /// Validate the request and read the table's columns and current maximum key
    pub fn start(
        schema: &dyn SchemaFacade,
        config: &SeederConfig,
        table: &str,
        parent: Option<ParentContext>,
        row_count: i64,
    ) -> Result<Self> {
        let row_count = match usize::try_from(row_count) {
            Ok(n) if n > 0 => n,
            _ => return Err(SeedError::InvalidRowCount(row_count.to_string()).into()),
        };
        if !schema.has_table(table)? {
            return Err(SeedError::InvalidTable(table.to_string()).into());
        }

        let columns = schema.list_columns(table)?;
        let key_column = columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(&config.primary_key))
            .map(|c| c.name.clone());
        let running_max_id = match &key_column {
            Some(key) => schema.max_value(table, key)?.unwrap_or(0),
            None => 0,
        };

        Ok(Self {
            table: table.to_string(),
            columns,
            parent,
            row_count,
            rows: Vec::new(),
            key_column,
            running_max_id,
            warnings: WarningCollector::new(),
        })
    }
}

/// Builds the rows of a session, one column at a time in declaration order
pub struct RowBuilder<'a> {
    schema: &'a dyn SchemaFacade,
    config: &'a SeederConfig,
    registry: ValueRegistry,
    rng: StdRng,
    now: NaiveDateTime,
    verbose: bool,
}

impl<'a> RowBuilder<'a> {
    pub fn new(schema: &'a dyn SchemaFacade, config: &'a SeederConfig) -> Result<Self> {
        Ok(Self {
            schema,
            config,
            registry: ValueRegistry::from_config(config)?,
            rng: Self::rng_for(config.seed),
            now: chrono::Local::now().naive_local(),
            verbose: false,
        })
    }

    /// Fixed seed for reproducible output (`None` seeds from the OS)
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.rng = Self::rng_for(seed);
        self
    }

    /// Reference instant for relative date windows
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// Print which rule produced each value of the first row
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn rng_for(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Fill `session.rows` up to `session.row_count`
    pub fn generate<'s>(&mut self, session: &'s mut GenerationSession) -> Result<&'s [RowRecord]> {
        while session.rows.len() < session.row_count {
            let trace = self.verbose && session.rows.is_empty();
            if trace {
                eprintln!("Resolving columns of {}:", session.table);
            }

            let mut row = RowRecord::new();
            for column in &session.columns {
                let mut ctx = GenerationContext {
                    table: &session.table,
                    parent: session.parent.as_ref(),
                    running_max_id: &mut session.running_max_id,
                    schema: self.schema,
                    config: self.config,
                    rng: &mut self.rng,
                    warnings: &mut session.warnings,
                    now: self.now,
                };
                let selection = self.registry.select(column, &mut ctx)?;
                if trace {
                    eprintln!(
                        "  {:<24} {:<16} {}",
                        column.name,
                        selection.rule,
                        selection.value.display()
                    );
                }
                row.set(&column.name, selection.value);
            }
            session.rows.push(row);
        }

        Ok(&session.rows)
    }
}
