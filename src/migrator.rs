//! The migrator facade.
//!
//! Every operation rebuilds the catalog from scratch: the directory and
//! the bookkeeping table can change between calls, so nothing is cached.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::MigratorConfig;
use crate::error::{FilenameProblem, MigrateError, Result};
use crate::migration::{Direction, Migration, NO_TRANSACTION_PREFIX};
use crate::source::MigrationSource;
use crate::store::VersionStore;
use crate::transition::{self, Step};

/// Outcome of a successful `migrate_to` / `migrate_latest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: i64,
    pub to: i64,
    /// Steps applied, in order.
    pub steps: Vec<Step>,
    pub elapsed: Duration,
}

impl Transition {
    fn unchanged(version: i64) -> Self {
        Self {
            from: version,
            to: version,
            steps: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Files written by `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub migration: Migration,
    pub up: PathBuf,
    pub down: PathBuf,
}

/// One catalog entry and whether it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub version: i64,
    pub name: String,
    pub applied: bool,
}

/// Resolves migrations and moves the database between versions.
pub struct Migrator<S, F> {
    store: S,
    source: F,
    config: MigratorConfig,
}

impl<S: VersionStore, F: MigrationSource> Migrator<S, F> {
    pub fn new(store: S, source: F, config: MigratorConfig) -> Self {
        Self {
            store,
            source,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Resolve the migration directory and reconcile it with the database.
    pub async fn catalog(&self) -> Result<Catalog> {
        self.store.ensure_schema().await?;
        let filenames = self.source.list()?;
        let applied = self.store.list_applied().await?;
        Catalog::resolve(filenames, &applied)
    }

    /// Current schema version (`0` when nothing is applied).
    pub async fn version(&self) -> Result<i64> {
        self.store.ensure_schema().await?;
        self.store.current_version().await
    }

    /// True when the database is not at the latest version on disk.
    pub async fn has_pending(&self) -> Result<bool> {
        let version = self.version().await?;
        let catalog = self.catalog().await?;
        Ok(version != catalog.latest_version())
    }

    /// Migrate up or down to `target`, one version at a time.
    ///
    /// Stops at the first failing step; everything applied before it stays
    /// applied, so calling again with the same target resumes.
    pub async fn migrate_to(&self, target: i64) -> Result<Transition> {
        let catalog = self.catalog().await?;
        self.transition(&catalog, target).await
    }

    /// Migrate up to the highest version on disk.
    pub async fn migrate_latest(&self) -> Result<Transition> {
        let catalog = self.catalog().await?;
        if catalog.is_empty() {
            return Ok(Transition::unchanged(0));
        }
        self.transition(&catalog, catalog.latest_version()).await
    }

    /// Steps `migrate_to(target)` would apply, without applying them.
    pub async fn plan(&self, target: i64) -> Result<Vec<Step>> {
        let catalog = self.catalog().await?;
        let current = self.version().await?;
        transition::plan(current, target, &catalog)
    }

    /// Every migration on disk with its applied flag.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>> {
        let catalog = self.catalog().await?;
        let current = self.version().await?;
        Ok(catalog
            .iter()
            .map(|m| MigrationStatus {
                version: m.version,
                name: m.name.clone(),
                applied: m.version <= current,
            })
            .collect())
    }

    /// Create empty up and down scripts for the next version.
    pub async fn create(&self, name: &str) -> Result<Created> {
        if let Some(problem) = invalid_name(name) {
            return Err(MigrateError::BadMigrationFilename {
                filename: name.to_string(),
                problem,
            });
        }

        let catalog = self.catalog().await?;
        let migration = Migration::new(catalog.latest_version() + 1, name);

        if migration.version == 1 {
            self.source.ensure_dir()?;
        }

        let up = self.source.create_empty(&migration, Direction::Up)?;
        let down = self.source.create_empty(&migration, Direction::Down)?;
        info!(version = migration.version, name = %migration.name, "created migration");

        Ok(Created {
            migration,
            up,
            down,
        })
    }

    async fn transition(&self, catalog: &Catalog, target: i64) -> Result<Transition> {
        let from = self.version().await?;
        let steps = transition::plan(from, target, catalog)?;
        if steps.is_empty() {
            debug!(version = from, "already at target version");
            return Ok(Transition::unchanged(from));
        }

        info!(from, to = target, "migrating");
        let start = Instant::now();
        for step in &steps {
            self.apply_step(step).await?;
        }
        let elapsed = start.elapsed();
        info!(from, to = target, ?elapsed, "finished migrating");

        Ok(Transition {
            from,
            to: target,
            steps,
            elapsed,
        })
    }

    async fn apply_step(&self, step: &Step) -> Result<()> {
        let filename = step.filename();
        info!("{} {}", step.direction.sign(), filename);

        let script = self.source.read(&filename)?;
        let use_tx = self.use_transaction(&script);
        self.store
            .apply(use_tx, step.direction, &step.migration, &script)
            .await
    }

    fn use_transaction(&self, script: &str) -> bool {
        !self.config.disable_transactions && !script.starts_with(NO_TRANSACTION_PREFIX)
    }
}

fn invalid_name(name: &str) -> Option<FilenameProblem> {
    if name.is_empty() {
        Some(FilenameProblem::EmptyName)
    } else if name.contains(['/', '\\']) {
        Some(FilenameProblem::InvalidName)
    } else {
        None
    }
}
