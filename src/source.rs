//! Migration file access.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FilenameProblem, MigrateError, Result};
use crate::migration::{Direction, Migration};

/// Where migration scripts come from.
pub trait MigrationSource {
    /// Names of all entries in the migration directory; empty if it is absent.
    fn list(&self) -> Result<Vec<String>>;

    /// Raw text of one script.
    fn read(&self, filename: &str) -> Result<String>;

    /// Create an empty script for `migration`, returning its path.
    fn create_empty(&self, migration: &Migration, direction: Direction) -> Result<PathBuf>;

    /// Create the migration directory if it does not exist yet.
    fn ensure_dir(&self) -> Result<()>;
}

/// Migrations stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MigrationSource for DirSource {
    fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MigrateError::io(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MigrateError::io(&self.dir, e))?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    let lossy = raw.to_string_lossy();
                    if lossy.ends_with(".up.sql") || lossy.ends_with(".down.sql") {
                        return Err(MigrateError::BadMigrationFilename {
                            filename: lossy.into_owned(),
                            problem: FilenameProblem::NotUtf8,
                        });
                    }
                    debug!(entry = %lossy, "skipping non UTF-8 entry");
                }
            }
        }
        Ok(names)
    }

    fn read(&self, filename: &str) -> Result<String> {
        let path = self.dir.join(filename);
        fs::read_to_string(&path).map_err(|e| MigrateError::io(path, e))
    }

    fn create_empty(&self, migration: &Migration, direction: Direction) -> Result<PathBuf> {
        let path = self.dir.join(migration.filename(direction));
        // Never clobber an existing script.
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| MigrateError::io(&path, e))?;
        Ok(path)
    }

    fn ensure_dir(&self) -> Result<()> {
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(MigrateError::BadMigrationPath {
                path: self.dir.clone(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir).map_err(|e| MigrateError::io(&self.dir, e))
            }
            Err(e) => Err(MigrateError::io(&self.dir, e)),
        }
    }
}
