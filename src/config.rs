//! Migrator configuration.
//!
//! [`MigratorConfig`] is what the engine is constructed with. [`FileConfig`]
//! is the optional `migrate.toml` the CLI reads beneath its flags and
//! environment variables.
//!
//! ```toml
//! conn_str = "postgres://app@localhost/app"
//! migrations_path = "db/migrations"
//! schema = "public"
//! table = "migration_version"
//! param_type = "dollar-sign"
//! no_transaction = false
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MigrateError, Result};
use crate::params::ParamType;

/// Default bookkeeping table name.
pub const DEFAULT_TABLE: &str = "migration_version";

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = "migrate.toml";

/// Engine settings fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    /// Bookkeeping table name.
    pub table: String,
    /// Schema holding the bookkeeping table; `None` uses the connection default.
    pub schema: Option<String>,
    pub param_type: ParamType,
    /// Run every script outside a transaction.
    pub disable_transactions: bool,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            schema: None,
            param_type: ParamType::default(),
            disable_transactions: false,
        }
    }
}

impl MigratorConfig {
    pub fn new(param_type: ParamType) -> Self {
        Self {
            param_type,
            ..Self::default()
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn without_transactions(mut self) -> Self {
        self.disable_transactions = true;
        self
    }

    /// `schema.table` (or just `table`), after validating both names.
    pub fn qualified_table(&self) -> Result<String> {
        validate_identifier("table", &self.table)?;
        match &self.schema {
            Some(schema) => {
                validate_identifier("schema", schema)?;
                Ok(format!("{}.{}", schema, self.table))
            }
            None => Ok(self.table.clone()),
        }
    }
}

/// Names are spliced into SQL unquoted, so keep them to plain identifiers.
fn validate_identifier(kind: &'static str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(MigrateError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

/// Settings read from a TOML config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub conn_str: Option<String>,
    pub migrations_path: Option<PathBuf>,
    pub schema: Option<String>,
    pub table: Option<String>,
    pub param_type: Option<String>,
    pub no_transaction: Option<bool>,
}

impl FileConfig {
    /// Parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| MigrateError::io(path, e))?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| MigrateError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find and load the config file.
    ///
    /// An explicit path must exist. Otherwise `./migrate.toml` and then
    /// `<config dir>/sqlmigrate/config.toml` are tried; finding neither is
    /// not an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<(PathBuf, Self)>> {
        if let Some(path) = explicit {
            return Ok(Some((path.to_path_buf(), Self::load(path)?)));
        }

        let candidates = [Some(PathBuf::from(CONFIG_FILE)), user_config_path()];
        for path in candidates.into_iter().flatten() {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    let config = Self::parse(&path, &content)?;
                    return Ok(Some((path, config)));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(MigrateError::io(path, e)),
            }
        }

        Ok(None)
    }

    /// Placeholder style from the file, if set.
    pub fn param_type(&self) -> Result<Option<ParamType>> {
        self.param_type
            .as_deref()
            .map(str::parse::<ParamType>)
            .transpose()
    }
}

/// `~/.config/sqlmigrate/config.toml` or the platform equivalent.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqlmigrate").join("config.toml"))
}
