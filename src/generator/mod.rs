//! Value Generator Registry.
//!
//! Each column is classified by an ordered chain of rules; the first rule
//! that produces a value wins:
//! - primary key: next value of the session's running maximum
//! - parent key: the selected parent's primary key
//! - column override: random member of a configured value set
//! - foreign key: a related row found by the resolver (falls through when none)
//! - heuristic: built-in column name patterns
//! - provider: configured name patterns
//! - data type: type-based default, NULL for unsupported types

pub mod fake;
pub mod types;

pub use fake::FakeKind;

use crate::config::SeederConfig;
use crate::error::SeedError;
use crate::foreign::{ForeignKeyResolver, Lookup};
use crate::schema::{ColumnDefinition, SchemaFacade, Value};
use crate::session::ParentContext;
use crate::warnings::{GenerationWarning, WarningCollector};
use anyhow::Result;
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

/// Built-in name patterns, checked in order against the lowercased column name
const HEURISTICS: &[(&[&str], FakeKind)] = &[
    (&["facebook_id"], FakeKind::BigNumber),
    (&["guid", "uuid"], FakeKind::Uuid),
    (&["email"], FakeKind::Email),
    (&["first_name"], FakeKind::FirstName),
    (&["last_name"], FakeKind::LastName),
    (&["city"], FakeKind::City),
    (&["state"], FakeKind::State),
    (&["country"], FakeKind::Country),
    (&["zipcode", "zip_code", "postal"], FakeKind::PostCode),
    (&["company"], FakeKind::Company),
    (&["address"], FakeKind::StreetAddress),
    (&["phone"], FakeKind::Phone),
    (&["hyperlink", "url"], FakeKind::Url),
];

/// Everything a rule may read or update while producing one column value
pub struct GenerationContext<'a> {
    pub table: &'a str,
    pub parent: Option<&'a ParentContext>,
    /// Highest primary key handed out so far in this session
    pub running_max_id: &'a mut i64,
    pub schema: &'a dyn SchemaFacade,
    pub config: &'a SeederConfig,
    pub rng: &'a mut StdRng,
    pub warnings: &'a mut WarningCollector,
    pub now: NaiveDateTime,
}

/// One entry of the priority chain
pub trait ColumnRule {
    /// Short name shown in the resolution trace
    fn name(&self) -> &'static str;

    /// Whether this rule claims the column
    fn matches(&self, column: &ColumnDefinition, ctx: &GenerationContext<'_>) -> bool;

    /// Produce a value; `None` passes the column on to the next rule
    fn generate(
        &self,
        column: &ColumnDefinition,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Option<Value>>;
}

/// Value chosen for a column, with the rule that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub value: Value,
    pub rule: &'static str,
}

/// Ordered rule chain
pub struct ValueRegistry {
    rules: Vec<Box<dyn ColumnRule>>,
}

impl ValueRegistry {
    /// Build the standard chain for `config`
    pub fn from_config(config: &SeederConfig) -> Result<Self> {
        let mut providers = Vec::with_capacity(config.providers.len());
        for provider in &config.providers {
            let kind = provider
                .generator
                .parse::<FakeKind>()
                .map_err(anyhow::Error::msg)?;
            providers.push((provider.pattern.to_lowercase(), kind));
        }

        Ok(Self::with_rules(vec![
            Box::new(PrimaryKeyRule),
            Box::new(ParentKeyRule),
            Box::new(ColumnOverrideRule),
            Box::new(ForeignKeyRule),
            Box::new(HeuristicRule),
            Box::new(ProviderRule { providers }),
            Box::new(DataTypeRule),
        ]))
    }

    pub fn with_rules(rules: Vec<Box<dyn ColumnRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run the chain for one column. A chain that produces nothing yields NULL.
    pub fn select(
        &self,
        column: &ColumnDefinition,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Selection> {
        for rule in &self.rules {
            if !rule.matches(column, ctx) {
                continue;
            }
            if let Some(value) = rule.generate(column, ctx)? {
                return Ok(Selection {
                    value,
                    rule: rule.name(),
                });
            }
        }
        Ok(Selection {
            value: Value::Null,
            rule: "none",
        })
    }
}

/// Built-in semantic kind for a column name, if any pattern matches
pub fn heuristic_kind(column_name: &str) -> Option<FakeKind> {
    let lower = column_name.to_lowercase();
    HEURISTICS
        .iter()
        .find(|(patterns, _)| patterns.iter().any(|p| lower.contains(p)))
        .map(|(_, kind)| *kind)
}

struct PrimaryKeyRule;

impl ColumnRule for PrimaryKeyRule {
    fn name(&self) -> &'static str {
        "primary_key"
    }

    fn matches(&self, column: &ColumnDefinition, ctx: &GenerationContext<'_>) -> bool {
        column.name.eq_ignore_ascii_case(&ctx.config.primary_key)
    }

    fn generate(
        &self,
        column: &ColumnDefinition,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Option<Value>> {
        let last = *ctx.running_max_id;
        let next = last
            .checked_add(1)
            .filter(|n| *n <= column.int_bounds().1)
            .ok_or_else(|| SeedError::KeyExhausted {
                table: ctx.table.to_string(),
                column: column.name.clone(),
                last,
            })?;
        *ctx.running_max_id = next;
        Ok(Some(Value::Int(next)))
    }
}

struct ParentKeyRule;

impl ColumnRule for ParentKeyRule {
    fn name(&self) -> &'static str {
        "parent_key"
    }

    fn matches(&self, column: &ColumnDefinition, ctx: &GenerationContext<'_>) -> bool {
        ctx.parent
            .is_some_and(|p| column.name.eq_ignore_ascii_case(&p.foreign_key_name))
    }

    fn generate(
        &self,
        _column: &ColumnDefinition,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Option<Value>> {
        Ok(ctx.parent.map(|p| p.primary_key.clone()))
    }
}

struct ColumnOverrideRule;

impl ColumnRule for ColumnOverrideRule {
    fn name(&self) -> &'static str {
        "column_override"
    }

    fn matches(&self, column: &ColumnDefinition, ctx: &GenerationContext<'_>) -> bool {
        ctx.config.column_override(ctx.table, &column.name).is_some()
    }

    fn generate(
        &self,
        column: &ColumnDefinition,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Option<Value>> {
        Ok(ctx
            .config
            .column_override(ctx.table, &column.name)
            .and_then(|o| o.values.choose(&mut *ctx.rng))
            .map(|v| v.to_value()))
    }
}

struct ForeignKeyRule;

impl ColumnRule for ForeignKeyRule {
    fn name(&self) -> &'static str {
        "foreign_key"
    }

    fn matches(&self, column: &ColumnDefinition, ctx: &GenerationContext<'_>) -> bool {
        column
            .name
            .to_lowercase()
            .ends_with(&ctx.config.key_suffix().to_lowercase())
    }

    fn generate(
        &self,
        column: &ColumnDefinition,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Option<Value>> {
        let resolver = ForeignKeyResolver::new(ctx.schema, &ctx.config.primary_key);
        match resolver.lookup(column, ctx.table, ctx.parent, &mut *ctx.rng)? {
            Lookup::Found(value) => Ok(Some(value)),
            Lookup::NoConstraint => Ok(None),
            Lookup::Unmatched { foreign_table } => {
                ctx.warnings.add(GenerationWarning::ForeignKeyUnresolved {
                    table: ctx.table.to_string(),
                    column: column.name.clone(),
                    foreign_table,
                });
                Ok(None)
            }
        }
    }
}

struct HeuristicRule;

impl ColumnRule for HeuristicRule {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn matches(&self, column: &ColumnDefinition, _ctx: &GenerationContext<'_>) -> bool {
        heuristic_kind(&column.name).is_some()
    }

    fn generate(
        &self,
        column: &ColumnDefinition,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Option<Value>> {
        Ok(heuristic_kind(&column.name).map(|kind| kind.generate(&mut *ctx.rng)))
    }
}

struct ProviderRule {
    /// (lowercased pattern, generator) in configuration order
    providers: Vec<(String, FakeKind)>,
}

impl ProviderRule {
    fn find(&self, column_name: &str) -> Option<FakeKind> {
        let lower = column_name.to_lowercase();
        self.providers
            .iter()
            .find(|(pattern, _)| lower.contains(pattern.as_str()))
            .map(|(_, kind)| *kind)
    }
}

impl ColumnRule for ProviderRule {
    fn name(&self) -> &'static str {
        "provider"
    }

    fn matches(&self, column: &ColumnDefinition, _ctx: &GenerationContext<'_>) -> bool {
        self.find(&column.name).is_some()
    }

    fn generate(
        &self,
        column: &ColumnDefinition,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Option<Value>> {
        Ok(self.find(&column.name).map(|kind| kind.generate(&mut *ctx.rng)))
    }
}

struct DataTypeRule;

impl ColumnRule for DataTypeRule {
    fn name(&self) -> &'static str {
        "data_type"
    }

    fn matches(&self, _column: &ColumnDefinition, _ctx: &GenerationContext<'_>) -> bool {
        true
    }

    fn generate(
        &self,
        column: &ColumnDefinition,
        ctx: &mut GenerationContext<'_>,
    ) -> Result<Option<Value>> {
        let generated =
            types::generate_for_type(column, &ctx.config.data_types, ctx.now, &mut *ctx.rng);
        match generated {
            Some(value) => Ok(Some(value)),
            None => {
                ctx.warnings.add(GenerationWarning::UnsupportedType {
                    table: ctx.table.to_string(),
                    column: column.name.clone(),
                    data_type: column.data_type.to_string(),
                });
                Ok(Some(Value::Null))
            }
        }
    }
}
