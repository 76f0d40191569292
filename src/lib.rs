//! sqlmigrate - numbered up/down SQL migrations.
//!
//! A migration directory holds pairs of plain SQL files:
//!
//! ```text
//! migrations/
//!   0001_create_users.up.sql
//!   0001_create_users.down.sql
//!   0002_add_email.up.sql
//!   0002_add_email.down.sql
//! ```
//!
//! The [`Migrator`] resolves that directory into a validated [`Catalog`],
//! cross-checks it against the bookkeeping table, and walks the database one
//! version at a time towards the requested target.
//!
//! # Example
//! ```no_run
//! use sqlmigrate::{DirSource, Migrator, MigratorConfig, ParamType, SqlVersionStore};
//! use sqlx::any::AnyPoolOptions;
//!
//! async fn example() -> sqlmigrate::Result<()> {
//!     sqlx::any::install_default_drivers();
//!     let pool = AnyPoolOptions::new()
//!         .max_connections(1)
//!         .connect("postgres://localhost/app")
//!         .await?;
//!
//!     let config = MigratorConfig::new(ParamType::DollarSign);
//!     let store = SqlVersionStore::new(pool, &config)?;
//!     let migrator = Migrator::new(store, DirSource::new("migrations"), config);
//!
//!     let transition = migrator.migrate_latest().await?;
//!     println!("now at version {}", transition.to);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod migration;
pub mod migrator;
pub mod params;
pub mod source;
pub mod sql_store;
pub mod store;
pub mod transition;

pub use catalog::Catalog;
pub use config::{FileConfig, MigratorConfig, DEFAULT_TABLE};
pub use error::{FilenameProblem, MigrateError, Result};
pub use migration::{Direction, Migration, NO_TRANSACTION_PREFIX};
pub use migrator::{Created, MigrationStatus, Migrator, Transition};
pub use params::{ParamType, Placeholders};
pub use source::{DirSource, MigrationSource};
pub use sql_store::SqlVersionStore;
pub use store::{AppliedRecord, VersionStore};
pub use transition::Step;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        Catalog, Direction, DirSource, MigrateError, Migration, MigrationSource, Migrator,
        MigratorConfig, ParamType, SqlVersionStore, VersionStore,
    };
}
