//! Migrate to a version, to latest, or preview the plan.

use anyhow::Result;
use colored::*;
use sqlmigrate::{Direction, Step, Transition};

use super::CliMigrator;

/// Migrate up or down to `version`.
pub async fn migrate_to(migrator: &CliMigrator, version: i64) -> Result<()> {
    println!("{} {}", "Migrating to version".cyan().bold(), version.to_string().yellow());
    let transition = migrator.migrate_to(version).await?;
    print_transition(&transition);
    Ok(())
}

/// Migrate up to the newest migration on disk.
pub async fn migrate_latest(migrator: &CliMigrator) -> Result<()> {
    println!("{}", "Migrating to latest".cyan().bold());
    let transition = migrator.migrate_latest().await?;
    print_transition(&transition);
    Ok(())
}

/// Print the steps a migration to `version` would run.
pub async fn migrate_plan(migrator: &CliMigrator, version: i64) -> Result<()> {
    let current = migrator.version().await?;
    let steps = migrator.plan(version).await?;

    println!(
        "{} {} → {}",
        "Plan:".cyan().bold(),
        current,
        version.to_string().yellow()
    );
    if steps.is_empty() {
        println!("  {}", "Nothing to do.".green());
        return Ok(());
    }

    for step in &steps {
        println!("  {}", step_line(step));
    }
    println!();
    println!(
        "  {} step(s). Run {} to apply.",
        steps.len(),
        format!("sqlmigrate to {}", version).cyan()
    );
    Ok(())
}

fn print_transition(transition: &Transition) {
    if transition.is_noop() {
        println!(
            "  {} Already at version {}",
            "✓".green(),
            transition.to.to_string().yellow()
        );
        return;
    }

    for step in &transition.steps {
        println!("  {} {}", "✓".green(), step_line(step));
    }
    println!();
    println!(
        "{} {} → {} ({} step(s), {:.2?})",
        "✓ Migrated".green().bold(),
        transition.from,
        transition.to.to_string().yellow(),
        transition.steps.len(),
        transition.elapsed
    );
}

fn step_line(step: &Step) -> String {
    match step.direction {
        Direction::Up => format!("{} {}", "+".green(), step.filename()),
        Direction::Down => format!("{} {}", "-".red(), step.filename()),
    }
}
