//! Version, pending and status reporting.
//!
//! `version` and `pending` print bare values so scripts can consume them.

use anyhow::Result;
use colored::*;
use serde_json::json;

use super::CliMigrator;

pub async fn print_version(migrator: &CliMigrator) -> Result<()> {
    println!("{}", migrator.version().await?);
    Ok(())
}

pub async fn print_pending(migrator: &CliMigrator) -> Result<()> {
    println!("{}", migrator.has_pending().await?);
    Ok(())
}

/// Show every migration on disk and whether it is applied.
pub async fn migrate_status(migrator: &CliMigrator, as_json: bool) -> Result<()> {
    let version = migrator.version().await?;
    let migrations = migrator.status().await?;

    if as_json {
        let report = json!({
            "version": version,
            "latest": migrations.len(),
            "migrations": migrations,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "📋 Migration Status".cyan().bold());
    println!();
    println!("  Directory: {}", migrator.source().dir().display().to_string().yellow());
    println!("  Table:     {}", migrator.store().table().green());
    println!("  Version:   {}", version.to_string().cyan());
    println!();

    if migrations.is_empty() {
        println!("  {} No migrations found", "○".dimmed());
        println!();
        println!("  Run {} to add one", "sqlmigrate create <name>".cyan());
        return Ok(());
    }

    let width = migrations.iter().map(|m| m.name.len()).max().unwrap_or(0);
    for m in &migrations {
        let state = if m.applied {
            format!("{} applied", "✓".green())
        } else {
            format!("{} pending", "○".dimmed())
        };
        println!("  {:04}  {:<width$}  {}", m.version, m.name, state, width = width);
    }

    let pending = migrations.iter().filter(|m| !m.applied).count();
    println!();
    if pending == 0 {
        println!("  {} Up to date", "✓".green());
    } else {
        println!(
            "  {} migration(s) pending. Run {} to apply",
            pending.to_string().yellow(),
            "sqlmigrate latest".cyan()
        );
    }

    Ok(())
}
