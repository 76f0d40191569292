//! Settings resolution: flag > environment > config file > default.
//!
//! clap already folds the environment into the flag values, so only the
//! config file and the defaults are layered here.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use sqlmigrate::{FileConfig, MigratorConfig, ParamType};
use tracing::debug;

use crate::ConnectionArgs;

const DEFAULT_MIGRATIONS_PATH: &str = "migrations";

#[derive(Debug)]
pub struct Settings {
    conn_str: Option<String>,
    pub migrations_path: PathBuf,
    pub config: MigratorConfig,
}

impl Settings {
    pub fn resolve(args: &ConnectionArgs) -> Result<Self> {
        let file = match FileConfig::discover(args.config.as_deref())? {
            Some((path, file)) => {
                debug!(path = %path.display(), "loaded config file");
                file
            }
            None => FileConfig::default(),
        };
        Self::layer(args, file)
    }

    fn layer(args: &ConnectionArgs, file: FileConfig) -> Result<Self> {
        let conn_str = args.conn_str.clone().or(file.conn_str.clone());

        let param_type = match &args.param_type {
            Some(value) => Some(value.parse::<ParamType>()?),
            None => file.param_type()?,
        };
        let param_type = param_type
            .or_else(|| conn_str.as_deref().and_then(ParamType::for_url))
            .unwrap_or_default();

        let mut config = MigratorConfig::new(param_type);
        if let Some(table) = args.table.clone().or(file.table) {
            config = config.with_table(table);
        }
        if let Some(schema) = args.schema.clone().or(file.schema) {
            config = config.with_schema(schema);
        }
        if args.no_transaction || file.no_transaction.unwrap_or(false) {
            config = config.without_transactions();
        }
        config
            .qualified_table()
            .context("invalid bookkeeping table")?;

        let migrations_path = args
            .migrations_path
            .clone()
            .or(file.migrations_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MIGRATIONS_PATH));

        Ok(Self {
            conn_str,
            migrations_path,
            config,
        })
    }

    pub fn conn_str(&self) -> Result<&str> {
        self.conn_str.as_deref().ok_or_else(|| {
            anyhow!("no connection string: pass --conn-str or set MIGRATIONS_CONN_STR")
        })
    }
}
