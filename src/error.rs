//! Error types for migration resolution and execution.

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::migration::Direction;

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

/// Every failure the migrator can report.
///
/// Catalog and version-range errors are raised before any statement runs,
/// so they are always safe to retry once the cause is fixed.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A `.up.sql` / `.down.sql` file whose name could not be parsed,
    /// or an unusable name passed to `create`.
    #[error("bad migration filename: {filename:?} (should be 0001_migration_name.up.sql): {problem}")]
    BadMigrationFilename {
        filename: String,
        problem: FilenameProblem,
    },

    /// Gap in the up or down sequence. `number` is the first missing version.
    #[error("missing {direction} migration {number}")]
    MissingMigration { number: i64, direction: Direction },

    /// Up and down files disagree on the name of a version.
    #[error("migration {version} name mismatch: up is {up_name:?}, down is {down_name:?}")]
    MigrationNameMismatch {
        version: i64,
        up_name: String,
        down_name: String,
    },

    /// The database has run a migration that is no longer on disk.
    #[error("database has migration {version}, which is missing from the filesystem")]
    FilesystemMissingDbMigration { version: i64 },

    /// The database and the filesystem disagree on a version's name.
    #[error("database migration {version} ({db_name}) doesn't match filesystem ({filesystem_name})")]
    FilesystemMigrationMismatch {
        version: i64,
        db_name: String,
        filesystem_name: String,
    },

    /// Applied history is not a gapless prefix: `version` is absent while a
    /// later version is recorded.
    #[error("database history is missing migration {version} although later migrations are applied")]
    AppliedHistoryGap { version: i64 },

    /// Requested target outside `0..=catalog length`.
    #[error("bad migration version ({version}): {problem}")]
    BadVersion { version: i64, problem: String },

    /// The migration directory path is occupied by something else.
    #[error("migration path {} exists, but is not a directory", path.display())]
    BadMigrationPath { path: PathBuf },

    /// Placeholder style not recognized.
    #[error("unknown param type: {value:?} (expected dollar-sign or question-mark)")]
    UnknownParamType { value: String },

    /// Table or schema name that cannot be used unquoted in SQL.
    #[error("invalid {kind} name {value:?}: only letters, digits and '_' are allowed")]
    InvalidIdentifier { kind: &'static str, value: String },

    /// A migration script or its bookkeeping statement failed.
    #[error("running {direction} migration {version} ({name})")]
    MigrationExecution {
        version: i64,
        name: String,
        direction: Direction,
        #[source]
        source: sqlx::Error,
    },

    /// Bookkeeping DDL or query failure outside of a migration step.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration directory or file access failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file exists but is not valid TOML for [`crate::FileConfig`].
    #[error("invalid config file {}: {source}", path.display())]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Why a migration filename was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameProblem {
    #[error("version prefix is not a number ({0})")]
    InvalidVersion(#[from] ParseIntError),
    #[error("migration name is empty")]
    EmptyName,
    #[error("migration name contains a path separator")]
    InvalidName,
    #[error("not in canonical form, expected {expected:?}")]
    NonCanonical { expected: String },
    #[error("filename is not valid UTF-8")]
    NotUtf8,
}

impl MigrateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MigrateError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_migration_display() {
        let err = MigrateError::MissingMigration {
            number: 2,
            direction: Direction::Down,
        };
        assert_eq!(err.to_string(), "missing down migration 2");
    }

    #[test]
    fn test_bad_filename_display_includes_cause() {
        let cause = "x1".parse::<u32>().unwrap_err();
        let err = MigrateError::BadMigrationFilename {
            filename: "x1_foo.up.sql".to_string(),
            problem: FilenameProblem::InvalidVersion(cause),
        };
        let msg = err.to_string();
        assert!(msg.contains("x1_foo.up.sql"));
        assert!(msg.contains("not a number"));
    }

    #[test]
    fn test_bad_migration_path_display() {
        let err = MigrateError::BadMigrationPath {
            path: PathBuf::from("migrations"),
        };
        assert_eq!(
            err.to_string(),
            "migration path migrations exists, but is not a directory"
        );
    }
}
