//! Catalog resolution.
//!
//! Turns a raw directory listing into an ordered, validated list of
//! migrations and checks it against the applied history:
//!
//! 1. keep `*.up.sql` / `*.down.sql`, ignore everything else
//! 2. parse `<version>_<name>` and split into up and down lists
//! 3. both lists must be exactly `1..=N`, with matching names per version
//! 4. every applied record must exist on disk under the same name, and the
//!    applied versions must form a gapless prefix
//!
//! Filesystem validation runs first: a malformed directory is a bug no
//! matter what the database says.

use tracing::debug;

use crate::error::{FilenameProblem, MigrateError, Result};
use crate::migration::{Direction, Migration};
use crate::store::AppliedRecord;

/// Validated migration sequence; entry `i` holds version `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    migrations: Vec<Migration>,
}

impl Catalog {
    /// Resolve a listing and reconcile it with the applied history.
    pub fn resolve<I, S>(filenames: I, applied: &[AppliedRecord]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let catalog = Self::from_filenames(filenames)?;
        catalog.reconcile(applied)?;
        Ok(catalog)
    }

    /// Parse and validate a listing without looking at the database.
    pub fn from_filenames<I, S>(filenames: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut up = Vec::new();
        let mut down = Vec::new();

        for filename in filenames {
            match parse_filename(filename.as_ref())? {
                Some((Direction::Up, migration)) => up.push(migration),
                Some((Direction::Down, migration)) => down.push(migration),
                None => {}
            }
        }

        up.sort_by_key(|m| m.version);
        down.sort_by_key(|m| m.version);

        check_sequence(Direction::Up, &up)?;
        check_sequence(Direction::Down, &down)?;
        check_pairs(&up, &down)?;

        debug!(migrations = up.len(), "resolved migration catalog");
        Ok(Self { migrations: up })
    }

    /// Check the applied history against this catalog.
    pub fn reconcile(&self, applied: &[AppliedRecord]) -> Result<()> {
        for (i, record) in applied.iter().enumerate() {
            let Some(migration) = self.get(record.version) else {
                return Err(MigrateError::FilesystemMissingDbMigration {
                    version: record.version,
                });
            };

            if migration.name != record.name {
                return Err(MigrateError::FilesystemMigrationMismatch {
                    version: record.version,
                    db_name: record.name.clone(),
                    filesystem_name: migration.name.clone(),
                });
            }

            let expected = i as i64 + 1;
            if record.version != expected {
                return Err(MigrateError::AppliedHistoryGap { version: expected });
            }
        }

        Ok(())
    }

    /// Migration for `version`, if it is in range.
    pub fn get(&self, version: i64) -> Option<&Migration> {
        if version < 1 {
            return None;
        }
        self.migrations.get(version as usize - 1)
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Highest version on disk (`0` for an empty catalog).
    pub fn latest_version(&self) -> i64 {
        self.migrations.len() as i64
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Migration> {
        self.migrations.iter()
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Migration;
    type IntoIter = std::slice::Iter<'a, Migration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Split `0001_name.up.sql` into its direction and migration.
///
/// Returns `None` for files that are not migration scripts.
fn parse_filename(filename: &str) -> Result<Option<(Direction, Migration)>> {
    let (direction, stem) = if let Some(stem) = filename.strip_suffix(".up.sql") {
        (Direction::Up, stem)
    } else if let Some(stem) = filename.strip_suffix(".down.sql") {
        (Direction::Down, stem)
    } else {
        return Ok(None);
    };

    let bad = |problem| MigrateError::BadMigrationFilename {
        filename: filename.to_string(),
        problem,
    };

    let (prefix, name) = stem.split_once('_').unwrap_or((stem, ""));
    let version: u32 = prefix
        .parse()
        .map_err(|e| bad(FilenameProblem::InvalidVersion(e)))?;
    if name.is_empty() {
        return Err(bad(FilenameProblem::EmptyName));
    }

    // Scripts are read back by their canonical name.
    let migration = Migration::new(version.into(), name);
    let expected = migration.filename(direction);
    if expected != filename {
        return Err(bad(FilenameProblem::NonCanonical { expected }));
    }

    Ok(Some((direction, migration)))
}

/// `list` must be exactly `1..=len`.
fn check_sequence(direction: Direction, list: &[Migration]) -> Result<()> {
    for (i, migration) in list.iter().enumerate() {
        let expected = i as i64 + 1;
        if migration.version != expected {
            return Err(MigrateError::MissingMigration {
                number: expected,
                direction,
            });
        }
    }

    Ok(())
}

/// Both lists must be equally long and agree on every name.
///
/// The shorter list is missing the version right after its last entry.
fn check_pairs(up: &[Migration], down: &[Migration]) -> Result<()> {
    if up.len() != down.len() {
        let (direction, shorter) = if up.len() < down.len() {
            (Direction::Up, up.len())
        } else {
            (Direction::Down, down.len())
        };
        return Err(MigrateError::MissingMigration {
            number: shorter as i64 + 1,
            direction,
        });
    }

    for (up, down) in up.iter().zip(down) {
        if up.name != down.name {
            return Err(MigrateError::MigrationNameMismatch {
                version: up.version,
                up_name: up.name.clone(),
                down_name: down.name.clone(),
            });
        }
    }

    Ok(())
}
