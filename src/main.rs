//! CLI entry point for command-table
//!
//! Inspects a saved command snapshot: checks it for binding conflicts and
//! lists the resulting bindings.

use clap::{Parser, Subcommand};
use colored::*;
use command_table::config::SnapshotStore;
use command_table::core::{CommandCatalog, NoActions};
use command_table::settings::SettingsController;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "command-table")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a snapshot for binding conflicts
    Check {
        /// Path to the command snapshot
        #[arg(short, long, default_value = "~/.config/command-table/commands.json")]
        snapshot: PathBuf,
    },

    /// List all commands and their bindings
    List {
        /// Path to the command snapshot
        #[arg(short, long, default_value = "~/.config/command-table/commands.json")]
        snapshot: PathBuf,

        /// Only show commands matching this text
        #[arg(short, long)]
        filter: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check { snapshot } => check_conflicts(&snapshot)?,
        Commands::List { snapshot, filter } => list_commands(&snapshot, filter.as_deref())?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Expands `~` in a CLI path
fn expand_path(path: &Path) -> anyhow::Result<PathBuf> {
    let expanded = shellexpand::tilde(
        path.to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?,
    );
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Built-in catalog with the snapshot (if present) restored over it
fn load_catalog(snapshot: &Path) -> anyhow::Result<CommandCatalog> {
    let path = expand_path(snapshot)?;
    let mut catalog = CommandCatalog::with_builtin_commands(&NoActions)?;

    if !path.exists() {
        println!(
            "{} No snapshot at {}, using defaults",
            "→".cyan(),
            path.display()
        );
        return Ok(catalog);
    }

    println!("{} Reading snapshot: {}", "→".cyan(), path.display());
    let store = SnapshotStore::new(path)?;
    let report = catalog.restore(&store.load()?);

    println!(
        "{} Restored {} commands ({} clones)\n",
        "✓".green(),
        report.applied.len(),
        report.created_clones.len()
    );
    for name in &report.skipped {
        println!("  {} unknown command skipped: {}", "⚠".yellow(), name);
    }
    for field in &report.recovered {
        println!(
            "  {} {}: {} (field reset)",
            "⚠".yellow(),
            field.command,
            field.message
        );
    }

    Ok(catalog)
}

/// Check a snapshot for conflicting bindings
fn check_conflicts(snapshot: &Path) -> anyhow::Result<()> {
    let catalog = load_catalog(snapshot)?;
    let conflicts = catalog.conflict_index().find_conflicts();

    if conflicts.is_empty() {
        println!("{} {}", "✓".green().bold(), "No conflicts detected!".bold());
        return Ok(());
    }

    println!(
        "{} Found {} conflict{}:\n",
        "✗".red().bold(),
        conflicts.len(),
        if conflicts.len() == 1 { "" } else { "s" }
    );

    for (i, conflict) in conflicts.iter().enumerate() {
        println!(
            "{} {} {}",
            format!("Conflict {}", i + 1).yellow().bold(),
            format!("[{}]", conflict.space).dimmed(),
            conflict.gesture.to_string().cyan()
        );

        for (idx, name) in conflict.commands.iter().enumerate() {
            let text = catalog.get(name).map(|c| c.text()).unwrap_or_default();
            println!(
                "  {} {} {}",
                format!("{}.", idx + 1).dimmed(),
                name.magenta(),
                text
            );
        }
        println!();
    }

    println!("{}", "⚠ These gestures will trigger more than one command!".yellow());
    std::process::exit(1);
}

/// List commands with their bindings
fn list_commands(snapshot: &Path, filter: Option<&str>) -> anyhow::Result<()> {
    let catalog = load_catalog(snapshot)?;
    let controller = SettingsController::new(Rc::new(RefCell::new(catalog)));
    let rows = controller.filter_rows(filter.unwrap_or_default());

    let mut group = String::new();
    for row in &rows {
        if row.group != group {
            group = row.group.clone();
            println!("{}", group.bold().underline());
        }

        let mut bindings = Vec::new();
        if !row.keys.is_empty() {
            bindings.push(row.keys.cyan().to_string());
        }
        if !row.pointer.is_empty() {
            bindings.push(format!("gesture {}", row.pointer).green().to_string());
        }
        if !row.touch.is_empty() {
            bindings.push(row.touch.blue().to_string());
        }

        let marker = if row.has_conflicts() { "✗".red() } else { " ".normal() };
        println!(
            "{} {:<28} {}",
            marker,
            row.name,
            if bindings.is_empty() {
                "-".dimmed().to_string()
            } else {
                bindings.join("  ")
            }
        );
    }

    println!("\n{} Total: {} commands", "✓".green(), rows.len());

    Ok(())
}
