//! Foreign Key Resolver.
//!
//! Given a key-suffixed column, find the constraint that declares it and pick a
//! related row. Rows belonging to the active parent are preferred; otherwise
//! any row with a non-null referenced value will do.

use crate::schema::{ColumnDefinition, ForeignKeyConstraint, RowFilter, SchemaFacade, Value};
use crate::session::ParentContext;
use anyhow::Result;
use rand::RngCore;

/// Outcome of a foreign key lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// No constraint on the table lists the column
    NoConstraint,
    /// A constraint exists but no row satisfied the filter
    Unmatched { foreign_table: String },
    /// Referenced value of the selected row
    Found(Value),
}

pub struct ForeignKeyResolver<'a> {
    schema: &'a dyn SchemaFacade,
    /// Referenced column when a constraint does not name one
    primary_key: &'a str,
}

impl<'a> ForeignKeyResolver<'a> {
    pub fn new(schema: &'a dyn SchemaFacade, primary_key: &'a str) -> Self {
        Self {
            schema,
            primary_key,
        }
    }

    /// Related row value for `column`, or `None` when nothing can be resolved
    pub fn resolve(
        &self,
        column: &ColumnDefinition,
        table: &str,
        parent: Option<&ParentContext>,
        rng: &mut dyn RngCore,
    ) -> Result<Option<Value>> {
        match self.lookup(column, table, parent, rng)? {
            Lookup::Found(value) => Ok(Some(value)),
            Lookup::NoConstraint | Lookup::Unmatched { .. } => Ok(None),
        }
    }

    pub fn lookup(
        &self,
        column: &ColumnDefinition,
        table: &str,
        parent: Option<&ParentContext>,
        rng: &mut dyn RngCore,
    ) -> Result<Lookup> {
        let Some(constraint) = self.constraint_for(table, &column.name)? else {
            return Ok(Lookup::NoConstraint);
        };

        let counterpart = constraint
            .counterpart(&column.name)
            .unwrap_or(self.primary_key)
            .to_string();
        let foreign_table = constraint.foreign_table;

        let filter = match parent {
            Some(parent)
                if self
                    .schema
                    .has_column(&foreign_table, &parent.foreign_key_name)? =>
            {
                RowFilter::Equals {
                    column: parent.foreign_key_name.clone(),
                    value: parent.primary_key.clone(),
                }
            }
            _ => RowFilter::NotNull {
                column: counterpart.clone(),
            },
        };

        let value = self
            .schema
            .random_row(&foreign_table, &filter, rng)?
            .and_then(|row| row.get(&counterpart).cloned())
            .filter(|v| !v.is_null());

        Ok(match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::Unmatched { foreign_table },
        })
    }

    /// First constraint, in declaration order, that lists `column`
    fn constraint_for(&self, table: &str, column: &str) -> Result<Option<ForeignKeyConstraint>> {
        Ok(self
            .schema
            .list_foreign_keys(table)?
            .into_iter()
            .find(|fk| fk.contains(column)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnType, MemorySchema, RowRecord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn row(pairs: &[(&str, Value)]) -> RowRecord {
        pairs
            .iter()
            .map(|(c, v)| (c.to_string(), v.clone()))
            .collect()
    }

    fn hotel_schema() -> MemorySchema {
        let mut schema = MemorySchema::new();
        schema
            .add_table(
                "rooms",
                vec![
                    ColumnDefinition::new("id", ColumnType::BigInt),
                    ColumnDefinition::new("hotel_id", ColumnType::BigInt),
                ],
            )
            .add_table(
                "bookings",
                vec![
                    ColumnDefinition::new("id", ColumnType::BigInt),
                    ColumnDefinition::new("room_id", ColumnType::BigInt),
                    ColumnDefinition::new("agent_id", ColumnType::BigInt),
                ],
            )
            .add_foreign_key(
                "bookings",
                ForeignKeyConstraint::new(&["room_id"], "rooms", &["id"]),
            );
        for (id, hotel) in [(1, 7), (2, 7), (3, 8)] {
            schema.push_row(
                "rooms",
                row(&[("id", Value::Int(id)), ("hotel_id", Value::Int(hotel))]),
            );
        }
        schema
    }

    fn parent(id: i64) -> ParentContext {
        ParentContext {
            primary_key: Value::Int(id),
            foreign_key_name: "hotel_id".to_string(),
            display_value: format!("Hotel {}", id),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(8)
    }

    fn room_id() -> ColumnDefinition {
        ColumnDefinition::new("room_id", ColumnType::BigInt)
    }

    #[test]
    fn test_no_constraint() {
        let schema = hotel_schema();
        let resolver = ForeignKeyResolver::new(&schema, "id");
        let column = ColumnDefinition::new("agent_id", ColumnType::BigInt);
        assert_eq!(
            resolver
                .lookup(&column, "bookings", None, &mut rng())
                .unwrap(),
            Lookup::NoConstraint
        );
    }

    #[test]
    fn test_prefers_rows_of_parent() {
        let schema = hotel_schema();
        let resolver = ForeignKeyResolver::new(&schema, "id");
        let parent = parent(8);
        for _ in 0..10 {
            let value = resolver
                .resolve(&room_id(), "bookings", Some(&parent), &mut rng())
                .unwrap();
            assert_eq!(value, Some(Value::Int(3)));
        }
    }

    #[test]
    fn test_parent_without_rows_is_unmatched() {
        let schema = hotel_schema();
        let resolver = ForeignKeyResolver::new(&schema, "id");
        assert_eq!(
            resolver
                .lookup(&room_id(), "bookings", Some(&parent(99)), &mut rng())
                .unwrap(),
            Lookup::Unmatched {
                foreign_table: "rooms".to_string()
            }
        );
    }

    #[test]
    fn test_any_row_without_parent() {
        let schema = hotel_schema();
        let resolver = ForeignKeyResolver::new(&schema, "id");
        let value = resolver
            .resolve(&room_id(), "bookings", None, &mut rng())
            .unwrap();
        assert!(matches!(value, Some(Value::Int(1..=3))));
    }

    #[test]
    fn test_counterpart_defaults_to_primary_key() {
        let mut schema = hotel_schema();
        schema.add_foreign_key(
            "bookings",
            ForeignKeyConstraint::new(&["agent_id"], "rooms", &[]),
        );
        let resolver = ForeignKeyResolver::new(&schema, "id");
        let column = ColumnDefinition::new("agent_id", ColumnType::BigInt);
        let value = resolver
            .resolve(&column, "bookings", None, &mut rng())
            .unwrap();
        assert!(matches!(value, Some(Value::Int(1..=3))));
    }
}
