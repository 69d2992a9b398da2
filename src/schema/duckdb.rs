//! DuckDB-backed schema facade.

use super::{
    quote_ident, ColumnDefinition, ForeignKeyConstraint, RowFilter, RowRecord, SchemaFacade, Value,
};
use crate::error::SeedError;
use anyhow::{Context, Result};
use duckdb::types::{ToSql, ValueRef};
use duckdb::{params, params_from_iter, Connection};
use rand::{Rng, RngCore};
use std::path::Path;

/// Schema facade over an embedded DuckDB database
pub struct DuckDbSchema {
    conn: Connection,
}

impl DuckDbSchema {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open DuckDB database: {}", path.display()))?;
        Ok(Self { conn })
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to create in-memory DuckDB database")?;
        Ok(Self { conn })
    }

    /// Run one or more statements that return no rows (DDL, fixtures)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .with_context(|| format!("Failed to execute: {}", sql))
    }

    /// Get the underlying DuckDB connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run a query and collect rows as records, keyed by result column name
    fn query_rows(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<RowRecord>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .with_context(|| format!("Failed to prepare query: {}", sql))?;

        let mut rows_result = stmt
            .query(params)
            .with_context(|| format!("Failed to execute query: {}", sql))?;

        let mut raw_rows: Vec<Vec<Value>> = Vec::new();
        let mut column_count = 0;

        while let Some(row) = rows_result.next()? {
            if column_count == 0 {
                column_count = row.as_ref().column_count();
            }

            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(value_from_ref(row.get_ref(i)?));
            }
            raw_rows.push(values);
        }

        // Release the borrow on the statement before reading column names
        drop(rows_result);

        let columns: Vec<String> = (0..stmt.column_count())
            .map(|i| {
                stmt.column_name(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| format!("col{}", i))
            })
            .collect();

        Ok(raw_rows
            .into_iter()
            .map(|values| columns.iter().cloned().zip(values).collect())
            .collect())
    }
}

/// Convert a DuckDB cell into a generator value
fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Int(n as i64),
        ValueRef::SmallInt(n) => Value::Int(n as i64),
        ValueRef::Int(n) => Value::Int(n as i64),
        ValueRef::BigInt(n) => Value::Int(n),
        ValueRef::UTinyInt(n) => Value::Int(n as i64),
        ValueRef::USmallInt(n) => Value::Int(n as i64),
        ValueRef::UInt(n) => Value::Int(n as i64),
        ValueRef::UBigInt(n) => match i64::try_from(n) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Text(n.to_string()),
        },
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Text(n.to_string()),
        },
        ValueRef::Float(f) => Value::Text(f.to_string()),
        ValueRef::Double(f) => Value::Text(f.to_string()),
        ValueRef::Decimal(d) => Value::Text(d.to_string()),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).to_string()),
        ValueRef::Timestamp(_, ts) => {
            // Microseconds since epoch
            let secs = ts.div_euclid(1_000_000);
            let nanos = (ts.rem_euclid(1_000_000) * 1000) as u32;
            match chrono::DateTime::from_timestamp(secs, nanos) {
                Some(dt) => Value::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => Value::Text(ts.to_string()),
            }
        }
        ValueRef::Date32(days) => {
            // 719163 = days from 0001-01-01 to 1970-01-01
            match chrono::NaiveDate::from_num_days_from_ce_opt(719163 + days) {
                Some(date) => Value::Text(date.format("%Y-%m-%d").to_string()),
                None => Value::Text(days.to_string()),
            }
        }
        other => Value::Text(format!("{:?}", other)),
    }
}

/// Convert a generator value into a DuckDB parameter
fn value_to_param(value: &Value) -> duckdb::types::Value {
    match value {
        Value::Null => duckdb::types::Value::Null,
        Value::Int(n) => duckdb::types::Value::BigInt(*n),
        Value::Bool(b) => duckdb::types::Value::Boolean(*b),
        Value::Text(s) => duckdb::types::Value::Text(s.clone()),
    }
}

impl SchemaFacade for DuckDbSchema {
    fn list_tables(&self) -> Result<Vec<String>> {
        let rows = self.query_rows(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' ORDER BY table_name",
            &[],
        )?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get("table_name").map(Value::display))
            .collect())
    }

    fn list_columns(&self, table: &str) -> Result<Vec<ColumnDefinition>> {
        let rows = self.query_rows(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_schema = 'main' AND table_name = ? ORDER BY ordinal_position",
            params![table],
        )?;

        Ok(rows
            .iter()
            .filter_map(|r| {
                let name = r.get("column_name")?.display();
                let data_type = r.get("data_type")?.display();
                Some(ColumnDefinition::from_sql(name, &data_type))
            })
            .collect())
    }

    fn list_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyConstraint>> {
        // One row per (constraint, local column); referenced columns are unnested in parallel
        let rows = self.query_rows(
            "SELECT constraint_index, \
                    unnest(constraint_column_names) AS local_column, \
                    unnest(referenced_column_names) AS foreign_column, \
                    referenced_table \
             FROM duckdb_constraints() \
             WHERE schema_name = 'main' AND table_name = ? AND constraint_type = 'FOREIGN KEY' \
             ORDER BY constraint_index",
            params![table],
        )?;

        let mut constraints: Vec<(i64, ForeignKeyConstraint)> = Vec::new();
        for row in &rows {
            let index = row.get("constraint_index").and_then(Value::as_int).unwrap_or(0);
            let local = row.get("local_column").map(Value::display).unwrap_or_default();
            let foreign_table = row
                .get("referenced_table")
                .map(Value::display)
                .unwrap_or_default();
            let foreign_column = row.get("foreign_column").filter(|v| !v.is_null());

            match constraints.last_mut() {
                Some((last, fk)) if *last == index => {
                    fk.local_columns.push(local);
                    if let Some(col) = foreign_column {
                        fk.foreign_columns.push(col.display());
                    }
                }
                _ => constraints.push((
                    index,
                    ForeignKeyConstraint {
                        local_columns: vec![local],
                        foreign_table,
                        foreign_columns: foreign_column.map(|c| vec![c.display()]).unwrap_or_default(),
                    },
                )),
            }
        }

        Ok(constraints.into_iter().map(|(_, fk)| fk).collect())
    }

    fn max_value(&self, table: &str, column: &str) -> Result<Option<i64>> {
        let sql = format!(
            "SELECT CAST(MAX({}) AS BIGINT) AS max_value FROM {}",
            quote_ident(column),
            quote_ident(table)
        );
        let rows = self.query_rows(&sql, &[])?;
        Ok(rows
            .first()
            .and_then(|r| r.get("max_value"))
            .and_then(Value::as_int))
    }

    fn random_row(
        &self,
        table: &str,
        filter: &RowFilter,
        rng: &mut dyn RngCore,
    ) -> Result<Option<RowRecord>> {
        let column = quote_ident(filter.column());
        let table = quote_ident(table);

        let (predicate, param) = match filter {
            RowFilter::Equals { value, .. } => {
                (format!("{} = ?", column), Some(value_to_param(value)))
            }
            RowFilter::NotNull { .. } => (format!("{} IS NOT NULL", column), None),
        };
        let params: Vec<&dyn ToSql> = param.iter().map(|p| p as &dyn ToSql).collect();

        // Pick the offset with the caller's rng so seeded runs repeat
        let count_sql = format!(
            "SELECT COUNT(*) AS matches FROM {} WHERE {}",
            table, predicate
        );
        let matches = self
            .query_rows(&count_sql, &params)?
            .first()
            .and_then(|r| r.get("matches"))
            .and_then(Value::as_int)
            .unwrap_or(0);
        if matches <= 0 {
            return Ok(None);
        }

        let sql = format!(
            "SELECT * FROM {} WHERE {} ORDER BY rowid LIMIT 1 OFFSET {}",
            table,
            predicate,
            rng.random_range(0..matches)
        );
        Ok(self.query_rows(&sql, &params)?.into_iter().next())
    }

    fn key_display_pairs(
        &self,
        table: &str,
        key_column: &str,
        display_column: &str,
    ) -> Result<Vec<(Value, String)>> {
        let sql = format!(
            "SELECT {key} AS seed_key, CAST({display} AS VARCHAR) AS seed_display FROM {table} ORDER BY {key}",
            key = quote_ident(key_column),
            display = quote_ident(display_column),
            table = quote_ident(table)
        );
        let rows = self.query_rows(&sql, &[])?;
        Ok(rows
            .into_iter()
            .filter_map(|r| {
                let key = r.get("seed_key")?.clone();
                let display = r.get("seed_display")?.display();
                Some((key, display))
            })
            .collect())
    }

    fn insert(&mut self, table: &str, rows: &[RowRecord]) -> Result<()> {
        let Some(first) = rows.first() else {
            return Ok(());
        };

        let columns: Vec<&str> = first.columns().collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
            vec!["?"; columns.len()].join(", ")
        );

        let persistence = |e: duckdb::Error| SeedError::Persistence {
            table: table.to_string(),
            message: e.to_string(),
        };

        let tx = self.conn.transaction().map_err(persistence)?;
        {
            let mut stmt = tx.prepare(&sql).map_err(persistence)?;
            for row in rows {
                let values: Vec<duckdb::types::Value> = columns
                    .iter()
                    .map(|c| row.get(c).map(value_to_param).unwrap_or(duckdb::types::Value::Null))
                    .collect();
                stmt.execute(params_from_iter(values.iter()))
                    .map_err(persistence)?;
            }
        }
        // Dropping the transaction without commit rolls back
        tx.commit().map_err(persistence)?;

        Ok(())
    }
}
