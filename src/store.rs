//! Bookkeeping table access.
//!
//! The [`VersionStore`] trait is the database seam of the migrator: the
//! SQL implementation lives in [`crate::sql_store`], tests substitute an
//! in-memory double.

use crate::error::Result;
use crate::migration::{Direction, Migration};

/// A `(version, name)` row of the bookkeeping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRecord {
    pub version: i64,
    pub name: String,
}

impl AppliedRecord {
    pub fn new(version: i64, name: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
        }
    }
}

impl From<&Migration> for AppliedRecord {
    fn from(migration: &Migration) -> Self {
        Self::new(migration.version, migration.name.clone())
    }
}

/// Persisted migration history.
#[allow(async_fn_in_trait)]
pub trait VersionStore {
    /// Create the bookkeeping table if it does not exist. Idempotent.
    async fn ensure_schema(&self) -> Result<()>;

    /// All applied records, ascending by version.
    async fn list_applied(&self) -> Result<Vec<AppliedRecord>>;

    /// Highest applied version, or `0` when nothing has run.
    async fn current_version(&self) -> Result<i64>;

    /// Run `script`, then insert (up) or delete (down) the matching record.
    ///
    /// With `use_tx` both statements share one transaction. Without it they
    /// run independently, and a failure between them leaves the script
    /// applied but unrecorded.
    async fn apply(
        &self,
        use_tx: bool,
        direction: Direction,
        migration: &Migration,
        script: &str,
    ) -> Result<()>;
}
