//! appform CLI - evaluate and check AppFormulas in a project file

use anyhow::{bail, Context, Result};
use appform::prelude::*;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::ser::{SerializeMap, Serializer};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "appform")]
#[command(
    author,
    version,
    about = "Evaluate and check AppSheet-style formulas against sample data"
)]
struct Cli {
    /// Instant used by NOW() and TODAY() (RFC 3339, default: current time)
    #[arg(long, global = true, value_parser = parse_now)]
    now: Option<DateTime<Utc>>,

    /// Nesting limit for Ref dereferences and cross-table lookups
    #[arg(long, global = true, default_value_t = appform::DEFAULT_MAX_RECURSION_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression against one sample row and print it as JSON
    Eval {
        /// Project file (JSON)
        project: PathBuf,

        /// Table id or name
        #[arg(short, long)]
        table: String,

        /// Row index (0-based)
        #[arg(short, long, default_value = "0")]
        row: usize,

        /// Formula text, e.g. "[Price] * [Quantity]"
        expression: String,
    },

    /// Compute every sample row of a table and print the rows as JSON
    Compute {
        /// Project file (JSON)
        project: PathBuf,

        /// Table id or name
        #[arg(short, long)]
        table: String,
    },

    /// Check the project structure and every AppFormula for unknown names
    /// and syntax problems
    Check {
        /// Project file (JSON)
        project: PathBuf,
    },

    /// List tables and their columns
    Tables {
        /// Project file (JSON)
        project: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let options = ComputeOptions {
        now: cli.now,
        max_recursion_depth: cli.max_depth,
    };

    match cli.command {
        Commands::Eval {
            project,
            table,
            row,
            expression,
        } => eval(&project, &table, row, &expression, &options),
        Commands::Compute { project, table } => compute(&project, &table, &options),
        Commands::Check { project } => check(&project),
        Commands::Tables { project } => list_tables(&project),
    }
}

fn parse_now(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn open(path: &Path) -> Result<Project> {
    tracing::debug!(path = %path.display(), "opening project");
    Project::open(path).with_context(|| format!("Failed to open '{}'", path.display()))
}

fn eval(
    path: &Path,
    table: &str,
    row: usize,
    expression: &str,
    options: &ComputeOptions,
) -> Result<()> {
    let project = open(path)?;
    let value = project
        .evaluate_with_options(table, row, expression, options)
        .with_context(|| format!("Failed to evaluate against {} row {}", table, row))?;

    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

fn compute(path: &Path, table_ref: &str, options: &ComputeOptions) -> Result<()> {
    let project = open(path)?;
    let table = project.resolve_table(table_ref)?;
    let rows = project
        .compute_table_with_options(&table.id, options)
        .with_context(|| format!("Failed to compute table '{}'", table_ref))?;

    let ordered: Vec<OrderedRow<'_>> = rows.iter().map(|row| OrderedRow { table, row }).collect();
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &ordered).context("Failed to write to stdout")?;
    writeln!(stdout).context("Failed to write to stdout")?;
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let project = open(path)?;
    let structure = project.validate().err();
    let findings = project.check_formulas();

    let formula_count: usize = project
        .tables
        .iter()
        .map(|t| t.formula_columns().count())
        .sum();

    if structure.is_none() && findings.is_empty() {
        println!("{} formulas checked, no problems found", formula_count);
        return Ok(());
    }

    if let Some(error) = &structure {
        println!("project: {}", error);
    }
    for finding in &findings {
        println!("{}", finding);
        println!("    = {}", finding.formula);
    }
    bail!(
        "{} problem(s) found in {} formulas",
        findings.len() + usize::from(structure.is_some()),
        formula_count
    );
}

fn list_tables(path: &Path) -> Result<()> {
    let project = open(path)?;

    println!("File: {}", path.display());
    println!("Tables: {}", project.tables.len());
    println!();

    for table in &project.tables {
        println!(
            "{} ({}): {} rows",
            table.name,
            table.id,
            project.rows(&table.id).len()
        );

        for column in &table.columns {
            let mut flags = Vec::new();
            if column.is_key {
                flags.push("key");
            }
            if column.is_label {
                flags.push("label");
            }
            if column.is_virtual {
                flags.push("virtual");
            }

            let mut line = format!("  - {} [{}]", column.name, column.column_type);
            if let Some(target) = column.ref_table_id() {
                line.push_str(&format!(" -> {}", target));
            }
            if !flags.is_empty() {
                line.push_str(&format!(" ({})", flags.join(", ")));
            }
            println!("{}", line);

            if let Some(formula) = column.app_formula() {
                println!("      = {}", formula);
            }
        }
    }

    Ok(())
}

/// A computed row serialized with its columns in table order; values stored
/// under ids the table does not declare follow, sorted by id
struct OrderedRow<'a> {
    table: &'a Table,
    row: &'a Row,
}

impl serde::Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut extra: Vec<&String> = self
            .row
            .keys()
            .filter(|id| self.table.column(id).is_none())
            .collect();
        extra.sort();

        let mut map = serializer.serialize_map(Some(self.row.len()))?;
        for column in &self.table.columns {
            if let Some(value) = self.row.get(&column.id) {
                map.serialize_entry(&column.id, value)?;
            }
        }
        for id in extra {
            map.serialize_entry(id, &self.row[id])?;
        }
        map.end()
    }
}
