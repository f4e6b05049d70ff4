//! Schoolplanner CLI - inspect and maintain a planner database

use clap::{Parser, Subcommand};
use crossbeam::channel::{bounded, Receiver};
use serde::Serialize;
use std::path::{Path, PathBuf};
use schoolplanner::config::{self, PlannerConfig};
use schoolplanner::import::ImportDocument;
use schoolplanner::storage::ResetConfirmation;
use schoolplanner::ui::{self, Icons};
use schoolplanner::{
    seed, ConfirmDelete, Decision, DeleteOutcome, DeleteRequest, EntityKind, Exam, Grade, Homework, Lesson, Period,
    Record, Schedule, SqliteStore, Subject, Teacher, Weekday,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "schoolplanner")]
#[command(version)]
#[command(about = "Storage core of a school planner: teachers, subjects, homework, exams, grades and timetables")]
#[command(long_about = r#"
Schoolplanner keeps a school planner's data in SQLite with enforced references:
  • Inserts create missing teachers, subjects and periods on the fly
  • Deletes report how many dependent rows go with them and ask first

Example usage:
  schoolplanner init
  schoolplanner seed
  schoolplanner impact teacher 1
  schoolplanner delete subject 2
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema (safe to run repeatedly)
    Init {
        /// Also write a config file pointing at the database
        #[arg(long)]
        write_config: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Drop and recreate every table, discarding all data
    Reset {
        /// Confirm that all data should be discarded
        #[arg(long)]
        yes: bool,
    },

    /// Insert the example data set
    Seed {
        /// Print the example data as an import document instead of inserting it
        #[arg(long)]
        json: bool,
    },

    /// Show row counts per table
    Stats,

    /// Dump raw rows of one table or all of them
    Dump {
        /// Table to dump
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Print one entity as JSON
    Show { kind: String, id: i64 },

    /// List the ids stored for a kind
    List { kind: String },

    /// Count the rows a delete would remove along with the target
    Impact { kind: String, id: i64 },

    /// Delete an entity, asking first if other rows depend on it
    Delete {
        kind: String,
        id: i64,

        /// Accept the delete without prompting
        #[arg(short, long)]
        yes: bool,
    },

    /// Insert entities from a JSON import document
    Import { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let planner_config = config::load_config(Some(config_path.as_path()))?.unwrap_or_default();
    let database = match &cli.database {
        Some(path) => path.clone(),
        None => planner_config.database_path_in(&std::env::current_dir()?),
    };

    if let Commands::Seed { json: true } = cli.command {
        println!("{}", seed::example_data().to_json()?);
        return Ok(());
    }

    let mut store = open_store(&database, &planner_config)?;

    match cli.command {
        Commands::Init { write_config, force } => {
            ui::header("Schoolplanner");
            ui::status(Icons::DATABASE, "Database", &database.display().to_string());
            if write_config {
                let config = PlannerConfig {
                    database: Some(database.display().to_string()),
                    busy_timeout_ms: Some(planner_config.busy_timeout().as_millis() as u64),
                };
                config::write_config(&config_path, &config, force)?;
                ui::status(Icons::NEW, "Config", &config_path.display().to_string());
            }
            ui::success("Schema ready");
        }

        Commands::Reset { yes } => {
            if !yes {
                ui::error("Reset discards every row. Re-run with --yes to proceed.");
                anyhow::bail!("reset not confirmed");
            }
            store.reset(ResetConfirmation::discard_all_data())?;
            ui::success("All tables dropped and recreated");
        }

        Commands::Seed { .. } => {
            let summary = seed::fill_with_examples(&mut store)?;
            ui::success(&format!("Inserted {} example rows", summary.total()));
            let counts: Vec<(EntityKind, u64)> = summary
                .added
                .iter()
                .map(|(kind, n)| (*kind, *n as u64))
                .collect();
            println!("{}", ui::counts_table(&counts));
        }

        Commands::Stats => {
            let stats = store.stats()?;
            ui::header(&format!("Schoolplanner Statistics ({})", database.display()));
            let counts: Vec<(EntityKind, u64)> = stats
                .counts
                .iter()
                .map(|(kind, n)| (*kind, *n as u64))
                .collect();
            println!("{}", ui::counts_table(&counts));
        }

        Commands::Dump { table } => match table {
            Some(name) => print!("{}", store.dump_table(name.parse()?)?),
            None => print!("{}", store.dump_all()?),
        },

        Commands::Show { kind, id } => {
            println!("{}", show_json(&store, kind.parse()?, id)?);
        }

        Commands::List { kind } => {
            let kind: EntityKind = kind.parse()?;
            let ids = store.ids(kind)?;
            if ids.is_empty() {
                println!("∅ No {} rows.", kind);
            } else {
                for id in ids {
                    println!("- {}", ui::entity(kind, id));
                }
            }
        }

        Commands::Impact { kind, id } => {
            let kind: EntityKind = kind.parse()?;
            if !store.exists(kind, id)? {
                anyhow::bail!("{} #{} not found", kind, id);
            }
            let report = store.impact_report(kind, id)?;
            println!(
                "{} Deleting {} also removes {}",
                Icons::DIRECT,
                ui::entity(kind, id),
                report
            );
            if report.total() > 0 {
                println!("{}", ui::counts_table(&report.entries));
            }
        }

        Commands::Delete { kind, id, yes } => {
            let kind: EntityKind = kind.parse()?;
            let outcome = if yes {
                store.delete(kind, id, &Decision::Accept)?
            } else {
                store.delete(kind, id, &TerminalConfirm)?
            };
            match outcome {
                DeleteOutcome::Deleted { impact } => ui::deleted(kind, id, impact),
                DeleteOutcome::Aborted { impact } => ui::aborted(kind, id, impact),
            }
        }

        Commands::Import { file } => {
            let document = ImportDocument::from_path(&file)?;
            if document.is_empty() {
                ui::warn("Import document has no entries");
                return Ok(());
            }
            let summary = document.apply(&mut store)?;
            ui::success(&format!(
                "Imported {} entries ({} rows including dependencies)",
                document.len(),
                summary.total()
            ));
        }
    }

    store.close()?;
    Ok(())
}

fn open_store(database: &Path, config: &PlannerConfig) -> anyhow::Result<SqliteStore> {
    config::ensure_db_dir(database)?;
    let store = SqliteStore::open_with_busy_timeout(database, config.busy_timeout())?;
    tracing::debug!("Opened {}", database.display());
    Ok(store)
}

fn show_json(store: &SqliteStore, kind: EntityKind, id: i64) -> anyhow::Result<String> {
    fn render<E: Record + Serialize>(store: &SqliteStore, id: i64) -> anyhow::Result<String> {
        let entity: E = store.get(id)?;
        Ok(serde_json::to_string_pretty(&entity)?)
    }

    match kind {
        EntityKind::Teacher => render::<Teacher>(store, id),
        EntityKind::Subject => render::<Subject>(store, id),
        EntityKind::Homework => render::<Homework>(store, id),
        EntityKind::Exam => render::<Exam>(store, id),
        EntityKind::Grade => render::<Grade>(store, id),
        EntityKind::Period => render::<Period>(store, id),
        EntityKind::Lesson => render::<Lesson>(store, id),
        EntityKind::Weekday => render::<Weekday>(store, id),
        EntityKind::Schedule => render::<Schedule>(store, id),
    }
}

/// Asks on the terminal from a helper thread. If the prompt cannot be read
/// the sender is dropped, which the coordinator treats as a decline.
struct TerminalConfirm;

impl ConfirmDelete for TerminalConfirm {
    fn request(&self, request: &DeleteRequest) -> Receiver<Decision> {
        let (tx, rx) = bounded(1);
        let prompt = format!(
            "{} Deleting {} also removes {} dependent row(s). Continue? [y/N] ",
            Icons::QUESTION,
            ui::entity(request.kind, request.id),
            request.impact
        );

        std::thread::spawn(move || {
            let term = console::Term::stderr();
            if term.write_str(&prompt).is_err() {
                return;
            }
            if let Ok(answer) = term.read_line() {
                let decision = match answer.trim().to_lowercase().as_str() {
                    "y" | "yes" => Decision::Accept,
                    _ => Decision::Cancel,
                };
                let _ = tx.send(decision);
            }
        });

        rx
    }
}
