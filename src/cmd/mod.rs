pub mod generate;
pub mod prompt;
pub mod review;
mod tables;

pub use generate::{run_session, GenerateOptions, PostAction, SessionOutcome};
pub use prompt::{LinePrompter, Prompter};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate as generate_completions, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cli-seeder")]
#[command(version)]
#[command(
    about = "Seed a database table with plausible fake rows linked to a parent record",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate rows for a table, then insert, review, discard or print them
    Generate {
        /// Database file (overrides `database` in the config)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// YAML config file (default: ./cli-seeder.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Parent record, by display value or key (skips the prompt)
        #[arg(short, long)]
        parent: Option<String>,

        /// Target table (skips the prompt)
        #[arg(short, long)]
        table: Option<String>,

        /// Number of rows to generate (skips the prompt)
        #[arg(short, long)]
        rows: Option<String>,

        /// What to do with the generated rows (skips the menu)
        #[arg(short, long, value_enum)]
        action: Option<PostAction>,

        /// Random seed for reproducible rows
        #[arg(long)]
        seed: Option<u64>,

        /// Show which rule produced each value of the first row
        #[arg(short, long)]
        verbose: bool,

        /// Continue without a parent when the parent configuration is unusable
        #[arg(short, long)]
        yes: bool,
    },

    /// List the tables of a database
    Tables {
        /// Database file (overrides `database` in the config)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// YAML config file (default: ./cli-seeder.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            database,
            config,
            parent,
            table,
            rows,
            action,
            seed,
            verbose,
            yes,
        } => generate::run(
            database,
            config,
            GenerateOptions {
                parent,
                table,
                rows,
                action,
                seed,
                verbose,
                assume_yes: yes,
            },
        ),
        Commands::Tables { database, config } => tables::run(database, config),
        Commands::Completions { shell } => {
            generate_completions(
                shell,
                &mut Cli::command(),
                "cli-seeder",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
