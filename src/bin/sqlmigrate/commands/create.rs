//! Migration creation

use anyhow::Result;
use colored::*;

use super::CliMigrator;

/// Create an empty up/down pair for the next version.
pub async fn migrate_create(migrator: &CliMigrator, name: &str) -> Result<()> {
    println!("{}", "📝 Creating Migration".cyan().bold());
    println!();

    let created = migrator.create(name).await?;

    println!("  {} {}", "✓ Created:".green(), created.up.display());
    println!("  {} {}", "✓ Created:".green(), created.down.display());
    println!();
    println!("  Version: {}", created.migration.version.to_string().cyan());
    println!();
    println!("  Write the SQL for both directions, then run:");
    println!("    {}", "sqlmigrate latest".cyan());

    Ok(())
}
