//! Command handlers for the sqlmigrate CLI.
//!
//! - `migrate`: to, latest, plan
//! - `create`: new up/down pair
//! - `status`: version, pending, status

mod create;
mod migrate;
mod status;

pub use create::migrate_create;
pub use migrate::{migrate_latest, migrate_plan, migrate_to};
pub use status::{migrate_status, print_pending, print_version};

use sqlmigrate::{DirSource, Migrator, SqlVersionStore};

pub type CliMigrator = Migrator<SqlVersionStore, DirSource>;
