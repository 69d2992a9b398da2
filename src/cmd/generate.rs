//! The interactive generate flow: parent, table, row count, generate, then
//! insert, review, discard or print.

use super::prompt::{LinePrompter, Prompter};
use super::review;
use crate::config::{ParentConfig, SeederConfig};
use crate::error::SeedError;
use crate::schema::{DuckDbSchema, SchemaFacade};
use crate::session::{parse_row_count, GenerationSession, ParentContext, RowBuilder};
use crate::warnings::GenerationWarning;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;

const INSERT_NOW: &str = "Insert Now";
const REVIEW_AND_EDIT: &str = "Review and Edit";
const DISCARD_AND_EXIT: &str = "Discard and Exit";

/// What to do with the generated batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PostAction {
    /// Insert the rows in one transaction
    Insert,
    /// Edit rows before choosing again
    Review,
    /// Drop the rows
    Discard,
    /// Print the rows as JSON without inserting
    Print,
}

/// Answers given up front on the command line
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub parent: Option<String>,
    pub table: Option<String>,
    pub rows: Option<String>,
    pub action: Option<PostAction>,
    pub seed: Option<u64>,
    pub verbose: bool,
    /// Continue without a parent when its configuration is unusable
    pub assume_yes: bool,
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Inserted { table: String, rows: usize },
    Discarded,
    Printed,
}

pub fn run(
    database: Option<PathBuf>,
    config_path: Option<PathBuf>,
    options: GenerateOptions,
) -> Result<()> {
    let config = SeederConfig::load_or_default(config_path.as_deref())?;
    let mut schema = open_database(database, &config)?;
    let mut prompter = LinePrompter::new()?;

    run_session(&mut schema, &config, &mut prompter, &options)?;
    Ok(())
}

/// Open the database named on the command line or in the configuration
pub fn open_database(database: Option<PathBuf>, config: &SeederConfig) -> Result<DuckDbSchema> {
    let path = database.or_else(|| config.database.clone()).ok_or_else(|| {
        SeedError::Config("no database given; pass --database or set `database`".to_string())
    })?;
    if !path.exists() {
        anyhow::bail!("Database file does not exist: {}", path.display());
    }
    DuckDbSchema::open(&path)
        .with_context(|| format!("Failed to open database: {}", path.display()))
}

/// Drive one session against `schema`, taking answers from `options` first
/// and from `prompter` otherwise
pub fn run_session(
    schema: &mut dyn SchemaFacade,
    config: &SeederConfig,
    prompter: &mut dyn Prompter,
    options: &GenerateOptions,
) -> Result<SessionOutcome> {
    let parent = select_parent(schema, config, prompter, options)?;

    let tables = schema.list_tables()?;
    let table = match &options.table {
        Some(table) => table.clone(),
        None => prompter.ask("Which table do you want to add data to?", &tables)?,
    };
    if !tables.contains(&table) {
        return Err(SeedError::InvalidTable(table).into());
    }

    let rows_answer = match &options.rows {
        Some(rows) => rows.clone(),
        None => prompter.ask("How many rows do you want to add?", &[])?,
    };
    let row_count = parse_row_count(&rows_answer)?;

    let parent_display = parent.as_ref().map(|p| p.display_value.clone());
    let mut session =
        GenerationSession::start(&*schema, config, &table, parent, row_count as i64)?;
    {
        let mut builder = RowBuilder::new(&*schema, config)?
            .with_seed(options.seed.or(config.seed))
            .verbose(options.verbose);
        builder.generate(&mut session)?;
    }
    session.warnings.print_summary();
    let key_column = session.key_column.clone();

    let mut pending = options.action;
    loop {
        let action = match pending.take() {
            Some(action) => action,
            None => {
                let choice = prompter.choose(
                    "What do you want to do with the generated data?",
                    &[INSERT_NOW, REVIEW_AND_EDIT, DISCARD_AND_EXIT],
                )?;
                match choice.as_str() {
                    INSERT_NOW => PostAction::Insert,
                    REVIEW_AND_EDIT => PostAction::Review,
                    _ => PostAction::Discard,
                }
            }
        };

        match action {
            PostAction::Insert => {
                schema.insert(&session.table, &session.rows)?;
                match &parent_display {
                    Some(display) => println!(
                        "Added {} rows to {} for parent {}.",
                        session.rows.len(),
                        session.table,
                        display
                    ),
                    None => println!("Added {} rows to {}.", session.rows.len(), session.table),
                }
                return Ok(SessionOutcome::Inserted {
                    table: session.table,
                    rows: session.rows.len(),
                });
            }
            PostAction::Review => review::review_rows(&mut session, key_column.as_deref(), prompter)?,
            PostAction::Discard => {
                println!("Discarded all data. No records added.");
                return Ok(SessionOutcome::Discarded);
            }
            PostAction::Print => {
                println!("{}", serde_json::to_string_pretty(&session.rows)?);
                return Ok(SessionOutcome::Printed);
            }
        }
    }
}

/// Resolve the parent record, degrading to no parent when the
/// configuration cannot be used and the user agrees
fn select_parent(
    schema: &dyn SchemaFacade,
    config: &SeederConfig,
    prompter: &mut dyn Prompter,
    options: &GenerateOptions,
) -> Result<Option<ParentContext>> {
    let Some(parent_config) = &config.parent else {
        return Ok(None);
    };

    let candidates = match parent_candidates(schema, config, parent_config) {
        Ok(candidates) => candidates,
        Err(reason) => {
            eprintln!("Warning: {}", GenerationWarning::ParentUnavailable { reason });
            let proceed = options.assume_yes
                || prompter.confirm("Continue without linking rows to a parent?", false)?;
            if !proceed {
                return Err(SeedError::Aborted.into());
            }
            return Ok(None);
        }
    };

    let displays: Vec<String> = candidates.iter().map(|(_, d)| d.clone()).collect();
    let answer = match &options.parent {
        Some(parent) => parent.clone(),
        None => prompter.ask(
            &format!("Select the {} to add data for", parent_config.table),
            &displays,
        )?,
    };

    let chosen = candidates
        .iter()
        .find(|(_, display)| display == &answer)
        .or_else(|| candidates.iter().find(|(key, _)| key.display() == answer))
        .or_else(|| {
            candidates
                .iter()
                .find(|(_, display)| display.eq_ignore_ascii_case(&answer))
        });

    match chosen {
        Some((key, display)) => Ok(Some(ParentContext {
            primary_key: key.clone(),
            foreign_key_name: parent_config.foreign_key_name(&config.primary_key),
            display_value: display.clone(),
        })),
        None => Err(SeedError::InvalidParent(answer).into()),
    }
}

/// `(key, display)` pairs of the parent table, or why they are unavailable
fn parent_candidates(
    schema: &dyn SchemaFacade,
    config: &SeederConfig,
    parent: &ParentConfig,
) -> std::result::Result<Vec<(crate::schema::Value, String)>, String> {
    let key = parent.key_column(&config.primary_key);
    let check = |column: &str| match schema.has_column(&parent.table, column) {
        Ok(true) => Ok(()),
        Ok(false) => Err(format!("{}.{} does not exist", parent.table, column)),
        Err(e) => Err(e.to_string()),
    };

    match schema.has_table(&parent.table) {
        Ok(true) => {}
        Ok(false) => return Err(format!("table {} does not exist", parent.table)),
        Err(e) => return Err(e.to_string()),
    }
    check(key)?;
    check(&parent.display_name)?;

    let pairs = schema
        .key_display_pairs(&parent.table, key, &parent.display_name)
        .map_err(|e| e.to_string())?;
    if pairs.is_empty() {
        return Err(format!("table {} has no rows", parent.table));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDefinition, ColumnType, MemorySchema, RowRecord, Value};

    struct NoPrompts;

    impl Prompter for NoPrompts {
        fn ask(&mut self, question: &str, _suggestions: &[String]) -> Result<String> {
            panic!("unexpected prompt: {}", question)
        }
        fn choose(&mut self, question: &str, _options: &[&str]) -> Result<String> {
            panic!("unexpected prompt: {}", question)
        }
        fn confirm(&mut self, question: &str, _default: bool) -> Result<bool> {
            panic!("unexpected prompt: {}", question)
        }
    }

    fn schema() -> MemorySchema {
        let mut schema = MemorySchema::new();
        schema
            .add_table(
                "hotels",
                vec![
                    ColumnDefinition::new("id", ColumnType::BigInt),
                    ColumnDefinition::new("name", ColumnType::String),
                ],
            )
            .add_table(
                "rooms",
                vec![
                    ColumnDefinition::new("id", ColumnType::BigInt),
                    ColumnDefinition::new("hotel_id", ColumnType::BigInt),
                ],
            );
        let hotel: RowRecord = vec![
            ("id".to_string(), Value::Int(7)),
            ("name".to_string(), Value::Text("Grand".to_string())),
        ]
        .into_iter()
        .collect();
        schema.push_row("hotels", hotel);
        schema
    }

    fn config() -> SeederConfig {
        SeederConfig {
            parent: Some(ParentConfig::new("hotels")),
            ..Default::default()
        }
    }

    #[test]
    fn test_parent_by_display_or_key() {
        let schema = schema();
        let config = config();
        for answer in ["Grand", "7", "grand"] {
            let options = GenerateOptions {
                parent: Some(answer.to_string()),
                ..Default::default()
            };
            let parent = select_parent(&schema, &config, &mut NoPrompts, &options)
                .unwrap()
                .unwrap();
            assert_eq!(parent.primary_key, Value::Int(7));
            assert_eq!(parent.foreign_key_name, "hotel_id");
            assert_eq!(parent.display_value, "Grand");
        }
    }

    #[test]
    fn test_unknown_parent_is_fatal() {
        let options = GenerateOptions {
            parent: Some("Ritz".to_string()),
            ..Default::default()
        };
        let err = select_parent(&schema(), &config(), &mut NoPrompts, &options).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SeedError>(),
            Some(SeedError::InvalidParent(_))
        ));
    }

    #[test]
    fn test_missing_parent_table_degrades_with_yes() {
        let config = SeederConfig {
            parent: Some(ParentConfig::new("resorts")),
            ..Default::default()
        };
        let options = GenerateOptions {
            assume_yes: true,
            ..Default::default()
        };
        let parent = select_parent(&schema(), &config, &mut NoPrompts, &options).unwrap();
        assert!(parent.is_none());
    }

    #[test]
    fn test_missing_display_column_is_unavailable() {
        let mut parent = ParentConfig::new("hotels");
        parent.display_name = "title".to_string();
        let config = SeederConfig {
            parent: Some(parent.clone()),
            ..Default::default()
        };
        let reason = parent_candidates(&schema(), &config, &parent).unwrap_err();
        assert_eq!(reason, "hotels.title does not exist");
    }

    #[test]
    fn test_flags_answer_every_prompt() {
        let mut schema = schema();
        let options = GenerateOptions {
            parent: Some("Grand".to_string()),
            table: Some("rooms".to_string()),
            rows: Some("2".to_string()),
            action: Some(PostAction::Insert),
            seed: Some(1),
            ..Default::default()
        };
        let outcome = run_session(&mut schema, &config(), &mut NoPrompts, &options).unwrap();
        assert_eq!(
            outcome,
            SessionOutcome::Inserted {
                table: "rooms".to_string(),
                rows: 2
            }
        );
        assert!(schema
            .rows("rooms")
            .iter()
            .all(|r| r.get("hotel_id") == Some(&Value::Int(7))));
    }
}
