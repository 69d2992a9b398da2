use super::generate::open_database;
use crate::config::SeederConfig;
use crate::schema::SchemaFacade;
use anyhow::Result;
use std::path::PathBuf;

pub fn run(database: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = SeederConfig::load_or_default(config_path.as_deref())?;
    let schema = open_database(database, &config)?;

    let tables = schema.list_tables()?;
    if tables.is_empty() {
        eprintln!("Warning: the database has no tables");
        return Ok(());
    }

    for table in &tables {
        let columns = schema.list_columns(table)?;
        let foreign_keys = schema.list_foreign_keys(table)?;
        println!(
            "{:<30} {:>3} columns {:>3} foreign keys",
            table,
            columns.len(),
            foreign_keys.len()
        );
    }

    Ok(())
}
