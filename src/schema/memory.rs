//! In-process schema facade.
//!
//! Holds table definitions and rows in memory. Used as the fixture backend
//! in tests and for driving the engine without a database file.

use super::{ColumnDefinition, ForeignKeyConstraint, RowFilter, RowRecord, SchemaFacade, Value};
use crate::error::SeedError;
use anyhow::Result;
use rand::seq::IndexedRandom;
use rand::RngCore;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    columns: Vec<ColumnDefinition>,
    foreign_keys: Vec<ForeignKeyConstraint>,
    rows: Vec<RowRecord>,
}

/// Schema facade backed by in-memory tables
#[derive(Debug, Clone, Default)]
pub struct MemorySchema {
    tables: BTreeMap<String, MemoryTable>,
    reject_inserts: bool,
}

impl MemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table with its columns
    pub fn add_table(&mut self, name: &str, columns: Vec<ColumnDefinition>) -> &mut Self {
        self.tables.entry(name.to_string()).or_default().columns = columns;
        self
    }

    /// Declare a foreign key on `table`
    pub fn add_foreign_key(&mut self, table: &str, constraint: ForeignKeyConstraint) -> &mut Self {
        self.tables
            .entry(table.to_string())
            .or_default()
            .foreign_keys
            .push(constraint);
        self
    }

    /// Append a row without any validation
    pub fn push_row(&mut self, table: &str, row: RowRecord) -> &mut Self {
        self.tables.entry(table.to_string()).or_default().rows.push(row);
        self
    }

    /// Make every subsequent insert fail (simulates a write error)
    pub fn reject_inserts(&mut self, reject: bool) -> &mut Self {
        self.reject_inserts = reject;
        self
    }

    /// Rows currently stored in `table`
    pub fn rows(&self, table: &str) -> &[RowRecord] {
        self.tables
            .get(table)
            .map(|t| t.rows.as_slice())
            .unwrap_or(&[])
    }

    fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Table does not exist: {}", name))
    }
}

impl SchemaFacade for MemorySchema {
    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn list_columns(&self, table: &str) -> Result<Vec<ColumnDefinition>> {
        Ok(self.table(table)?.columns.clone())
    }

    fn list_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyConstraint>> {
        Ok(self.table(table)?.foreign_keys.clone())
    }

    fn max_value(&self, table: &str, column: &str) -> Result<Option<i64>> {
        Ok(self
            .table(table)?
            .rows
            .iter()
            .filter_map(|r| r.get(column).and_then(Value::as_int))
            .max())
    }

    fn random_row(
        &self,
        table: &str,
        filter: &RowFilter,
        rng: &mut dyn RngCore,
    ) -> Result<Option<RowRecord>> {
        let table = self.table(table)?;
        let candidates: Vec<&RowRecord> = table.rows.iter().filter(|r| filter.matches(r)).collect();
        Ok(candidates.choose(rng).map(|r| (*r).clone()))
    }

    fn key_display_pairs(
        &self,
        table: &str,
        key_column: &str,
        display_column: &str,
    ) -> Result<Vec<(Value, String)>> {
        Ok(self
            .table(table)?
            .rows
            .iter()
            .filter_map(|r| {
                let key = r.get(key_column)?.clone();
                let display = r.get(display_column)?.display();
                Some((key, display))
            })
            .collect())
    }

    fn insert(&mut self, table: &str, rows: &[RowRecord]) -> Result<()> {
        if self.reject_inserts {
            return Err(SeedError::Persistence {
                table: table.to_string(),
                message: "insert rejected".to_string(),
            }
            .into());
        }

        let target = self
            .tables
            .get_mut(table)
            .ok_or_else(|| anyhow::anyhow!("Table does not exist: {}", table))?;

        // Validate the whole batch before touching stored rows
        for row in rows {
            if let Some(unknown) = row
                .columns()
                .find(|c| !target.columns.iter().any(|d| d.name == *c))
            {
                return Err(SeedError::Persistence {
                    table: table.to_string(),
                    message: format!("column \"{}\" does not exist", unknown),
                }
                .into());
            }
        }

        target.rows.extend(rows.iter().cloned());
        Ok(())
    }
}
