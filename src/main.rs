use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

use flagplan::builder::CompositionList;
use flagplan::catalog::{Catalog, DrillFilter};
use flagplan::config::AppConfig;
use flagplan::export::{ExportFormat, ExportSink, FileSink, PlanDocument};
use flagplan::logging::{init_logging, LogLevel};
use flagplan::models::{BuilderEntry, DrillCategory, DrillLevel};
use flagplan::plans::{PlanStore, SaveRequest};
use flagplan::store::SqliteStore;

/// flagplan - Flag Football Training Planner
///
/// Compose drills from a catalog into ordered training sessions, persist
/// them as training plans, and export plans for the field.
#[derive(Parser)]
#[command(name = "flagplan")]
#[command(version = "0.1.0")]
#[command(about = "Flag football training planner", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage the drill catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },

    /// Build the current training session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Manage saved training plans
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },

    /// Show the active configuration
    Config,
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List catalog drills, optionally filtered
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Filter by level
        #[arg(long)]
        level: Option<String>,

        /// Case-insensitive name search
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one drill in detail
    Show {
        /// Drill id
        id: String,
    },
    /// Import a catalog file (JSON or CSV) as the active catalog
    Import {
        /// Input file path
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Add a drill to the session
    Add {
        /// Drill id from the catalog
        drill_id: String,
    },
    /// Remove the drill at a position
    Remove {
        /// Zero-based position
        index: usize,
    },
    /// Move a drill to a new position
    Move {
        /// Current zero-based position
        from: usize,
        /// Target zero-based position
        to: usize,
    },
    /// Override the allocated minutes of an entry
    Duration {
        /// Zero-based position
        index: usize,
        /// Minutes (positive)
        minutes: u32,
    },
    /// Set coach notes on an entry
    Notes {
        /// Zero-based position
        index: usize,
        /// Note text; omit to clear
        text: Option<String>,
    },
    /// Empty the session
    Clear,
    /// Show the session with totals
    Show,
    /// Save the session as a training plan and clear it
    Save {
        /// Plan name
        name: String,

        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// List saved plans, newest first
    List,
    /// Show one plan resolved against the catalog
    Show {
        /// Plan id
        id: String,
    },
    /// Delete a plan
    Delete {
        /// Plan id
        id: String,
    },
    /// Export a plan document
    Export {
        /// Plan id
        id: String,

        /// Export format (text, json)
        #[arg(short = 'f', long, default_value = "text")]
        format: String,

        /// Output directory (defaults to the configured export dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Tabled)]
struct DrillRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Min")]
    duration: u32,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Drills")]
    drills: usize,
    #[tabled(rename = "Total Min")]
    total_duration: u32,
    #[tabled(rename = "Created")]
    created_at: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load_or_default(&config_path)?;

    if cli.verbose > 0 {
        config.logging.level = LogLevel::from_verbosity(cli.verbose);
    }
    init_logging(&config.logging)?;

    std::fs::create_dir_all(&config.settings.data_dir).with_context(|| {
        format!(
            "Failed to create data dir: {}",
            config.settings.data_dir.display()
        )
    })?;

    match cli.command {
        Commands::Catalog { command } => run_catalog(command, &config),
        Commands::Session { command } => run_session(command, &config),
        Commands::Plan { command } => run_plan(command, &config),
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_catalog(config: &AppConfig) -> Result<Catalog> {
    let path = &config.settings.catalog_path;
    if !path.exists() {
        bail!(
            "No drill catalog at {}. Import one with `flagplan catalog import <file>`.",
            path.display()
        );
    }
    Catalog::load_json(path)
}

fn open_plans(config: &AppConfig) -> Result<PlanStore<SqliteStore>> {
    let store = SqliteStore::open(&config.settings.database_path)?;
    Ok(PlanStore::new(store))
}

fn session_path(config: &AppConfig) -> PathBuf {
    config.settings.data_dir.join("session.json")
}

fn load_session(path: &Path) -> Result<CompositionList> {
    if !path.exists() {
        return Ok(CompositionList::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;
    let entries: Vec<BuilderEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session file: {}", path.display()))?;
    Ok(CompositionList::from_entries(entries))
}

fn save_session(path: &Path, list: &CompositionList) -> Result<()> {
    let content = serde_json::to_string_pretty(list.entries())?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write session file: {}", path.display()))
}

fn run_catalog(command: CatalogCommands, config: &AppConfig) -> Result<()> {
    match command {
        CatalogCommands::List {
            category,
            level,
            search,
        } => {
            let catalog = load_catalog(config)?;
            let locale = config.settings.locale;

            let drills: Vec<_> = if let Some(query) = search {
                catalog.search(&query)
            } else {
                let filter = DrillFilter {
                    category: category
                        .map(|c| DrillCategory::from_str(&c).map_err(anyhow::Error::msg))
                        .transpose()?,
                    level: level
                        .map(|l| DrillLevel::from_str(&l).map_err(anyhow::Error::msg))
                        .transpose()?,
                };
                catalog.filter(&filter)
            };

            let rows: Vec<DrillRow> = drills
                .iter()
                .map(|d| DrillRow {
                    id: d.id.clone(),
                    name: d.name.resolve(locale).to_string(),
                    category: d.category.to_string(),
                    level: d.level.to_string(),
                    duration: d.duration,
                })
                .collect();
            println!("{}", Table::new(rows));
        }

        CatalogCommands::Show { id } => {
            let catalog = load_catalog(config)?;
            let locale = config.settings.locale;
            let Some(drill) = catalog.get_by_id(&id) else {
                println!("{}", format!("Drill not found: {}", id).yellow());
                return Ok(());
            };
            println!("{}", drill.name.resolve(locale).bold());
            println!(
                "  {} | {} | {} min",
                drill.category, drill.level, drill.duration
            );
            let description = drill.description.resolve(locale);
            if !description.is_empty() {
                println!("  {}", description);
            }
            let instructions = drill.instructions.resolve(locale);
            if !instructions.is_empty() {
                println!("  Instructions: {}", instructions);
            }
            let tips = drill.tips.resolve(locale);
            if !tips.is_empty() {
                println!("  Tips: {}", tips);
            }
        }

        CatalogCommands::Import { file } => {
            let catalog = match file.extension().and_then(|e| e.to_str()) {
                Some("csv") => Catalog::load_csv(&file)?,
                _ => Catalog::load_json(&file)?,
            };
            if let Some(parent) = config.settings.catalog_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(catalog.list())?;
            std::fs::write(&config.settings.catalog_path, content)?;
            println!(
                "{}",
                format!("✓ Imported {} drills", catalog.len()).green()
            );
        }
    }
    Ok(())
}

fn run_session(command: SessionCommands, config: &AppConfig) -> Result<()> {
    let path = session_path(config);
    let mut list = load_session(&path)?;

    match command {
        SessionCommands::Add { drill_id } => {
            let catalog = load_catalog(config)?;
            let Some(drill) = catalog.get_by_id(&drill_id) else {
                println!("{}", format!("Drill not found: {}", drill_id).yellow());
                return Ok(());
            };
            if list.add_drill(drill).is_added() {
                save_session(&path, &list)?;
                println!("{}", format!("✓ Added {}", drill_id).green());
            } else {
                println!(
                    "{}",
                    format!("Drill already in training: {}", drill_id).yellow()
                );
            }
        }

        SessionCommands::Remove { index } => {
            if index >= list.len() {
                bail!("Index {} out of range ({} entries)", index, list.len());
            }
            let removed = list.remove_drill(index);
            save_session(&path, &list)?;
            println!("{}", format!("✓ Removed {}", removed.drill_id).green());
        }

        SessionCommands::Move { from, to } => {
            list.reorder_drills(from, to);
            save_session(&path, &list)?;
            println!("{}", "✓ Reordered".green());
        }

        SessionCommands::Duration { index, minutes } => {
            if index >= list.len() {
                bail!("Index {} out of range ({} entries)", index, list.len());
            }
            if !list.set_duration(index, minutes) {
                bail!("Duration must be a positive number of minutes");
            }
            save_session(&path, &list)?;
            println!("{}", format!("✓ Duration set to {} min", minutes).green());
        }

        SessionCommands::Notes { index, text } => {
            if index >= list.len() {
                bail!("Index {} out of range ({} entries)", index, list.len());
            }
            list.set_notes(index, text);
            save_session(&path, &list)?;
            println!("{}", "✓ Notes updated".green());
        }

        SessionCommands::Clear => {
            list.clear_all_drills();
            save_session(&path, &list)?;
            println!("{}", "✓ Session cleared".green());
        }

        SessionCommands::Show => {
            let catalog = load_catalog(config).ok();
            let locale = config.settings.locale;
            if list.is_empty() {
                println!("Session is empty.");
                return Ok(());
            }
            for entry in list.entries() {
                let name = catalog
                    .as_ref()
                    .and_then(|c| c.get_by_id(&entry.drill_id))
                    .map(|d| d.name.resolve(locale).to_string())
                    .unwrap_or_else(|| entry.drill_id.clone());
                print!("  {}. {} ({} min)", entry.order + 1, name, entry.duration);
                match &entry.notes {
                    Some(notes) => println!(" — {}", notes),
                    None => println!(),
                }
            }
            let totals = list.totals();
            println!(
                "{}",
                format!(
                    "Total: {} drills, {} min",
                    totals.count, totals.total_duration
                )
                .bold()
            );
        }

        SessionCommands::Save { name, description } => {
            if name.trim().is_empty() {
                bail!("Plan name must not be empty");
            }
            if list.is_empty() {
                bail!("Cannot save an empty session");
            }
            let plans = open_plans(config)?;
            let request = SaveRequest {
                name,
                description,
                created_by: None,
            };
            let id = plans.save(&request, &list)?;

            // Clear only after the store confirmed the write
            list.clear_all_drills();
            save_session(&path, &list)?;
            println!("{}", format!("✓ Saved plan {}", id).green());
        }
    }
    Ok(())
}

fn run_plan(command: PlanCommands, config: &AppConfig) -> Result<()> {
    let plans = open_plans(config)?;

    match command {
        PlanCommands::List => {
            let all = plans.list_all()?;
            if all.is_empty() {
                println!("No saved plans.");
                return Ok(());
            }
            let rows: Vec<PlanRow> = all
                .iter()
                .map(|p| PlanRow {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    drills: p.drills.len(),
                    total_duration: p.total_duration,
                    created_at: p.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            println!("{}", Table::new(rows));
        }

        PlanCommands::Show { id } => {
            let Some(plan) = plans.get_by_id(&id)? else {
                println!("{}", format!("Plan not found: {}", id).yellow());
                return Ok(());
            };
            let catalog = load_catalog(config)?;
            let document = PlanDocument::build(&plan, &catalog, config.settings.locale);
            let mut out = std::io::stdout();
            flagplan::export::text::write_plan_document(&document, &mut out)?;
        }

        PlanCommands::Delete { id } => {
            plans.delete(&id)?;
            println!("{}", format!("✓ Deleted plan {}", id).green());
        }

        PlanCommands::Export { id, format, output } => {
            let Some(plan) = plans.get_by_id(&id)? else {
                println!("{}", format!("Plan not found: {}", id).yellow());
                return Ok(());
            };
            let format = ExportFormat::from_str(&format)?;
            let catalog = load_catalog(config)?;
            let document = PlanDocument::build(&plan, &catalog, config.settings.locale);

            let directory = output.unwrap_or_else(|| config.settings.export_dir.clone());
            std::fs::create_dir_all(&directory)?;

            let filename = document.suggested_filename(format);
            let sink = FileSink::new(&directory, format);
            sink.export(&document, &filename)?;
            println!(
                "{}",
                format!("✓ Exported to {}", directory.join(filename).display()).green()
            );
        }
    }
    Ok(())
}
