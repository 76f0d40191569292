//! SQL bookkeeping table over sqlx's `Any` driver.
//!
//! The same code serves PostgreSQL, MySQL and SQLite; only the placeholder
//! style of the bookkeeping statements differs between them.

use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::{Any, AnyPool, Executor, Row};
use tracing::{debug, warn};

use crate::config::MigratorConfig;
use crate::error::{MigrateError, Result};
use crate::migration::{Direction, Migration};
use crate::params::ParamType;
use crate::store::{AppliedRecord, VersionStore};

/// [`VersionStore`] backed by a database table.
#[derive(Debug, Clone)]
pub struct SqlVersionStore {
    pool: AnyPool,
    table: String,
    param_type: ParamType,
}

impl SqlVersionStore {
    /// Wrap an existing pool. Fails if the table or schema name is invalid.
    pub fn new(pool: AnyPool, config: &MigratorConfig) -> Result<Self> {
        Ok(Self {
            pool,
            table: config.qualified_table()?,
            param_type: config.param_type,
        })
    }

    /// Open a single-connection pool for `url`.
    ///
    /// One connection keeps every statement in the same session, so a
    /// no-transaction script and its bookkeeping row see the same state.
    pub async fn connect(url: &str, config: &MigratorConfig) -> Result<Self> {
        install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        Self::new(pool, config)
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Qualified bookkeeping table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (version integer PRIMARY KEY NOT NULL, name text NOT NULL)",
            self.table
        )
    }

    pub fn list_applied_sql(&self) -> String {
        format!("SELECT version, name FROM {} ORDER BY version ASC", self.table)
    }

    pub fn current_version_sql(&self) -> String {
        format!("SELECT COALESCE(MAX(version), 0) FROM {}", self.table)
    }

    /// INSERT (up) or DELETE (down) of one bookkeeping row.
    pub fn record_sql(&self, direction: Direction) -> String {
        let mut params = self.param_type.placeholders();
        match direction {
            Direction::Up => format!(
                "INSERT INTO {} (version, name) VALUES ({}, {})",
                self.table,
                params.next_placeholder(),
                params.next_placeholder()
            ),
            Direction::Down => format!(
                "DELETE FROM {} WHERE version = {} AND name = {}",
                self.table,
                params.next_placeholder(),
                params.next_placeholder()
            ),
        }
    }

    async fn record<'e, E>(
        &self,
        executor: E,
        direction: Direction,
        migration: &Migration,
    ) -> std::result::Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Any>,
    {
        let sql = self.record_sql(direction);
        debug!(%sql, version = migration.version, "recording migration");
        sqlx::query(&sql)
            .bind(migration.version)
            .bind(migration.name.clone())
            .execute(executor)
            .await?;
        Ok(())
    }

    async fn apply_in_transaction(
        &self,
        direction: Direction,
        migration: &Migration,
        script: &str,
    ) -> std::result::Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let result = match (&mut *tx).execute(script).await {
            Ok(_) => self.record(&mut *tx, direction, migration).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => tx.commit().await,
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn apply_without_transaction(
        &self,
        direction: Direction,
        migration: &Migration,
        script: &str,
    ) -> std::result::Result<(), sqlx::Error> {
        warn!(
            version = migration.version,
            name = %migration.name,
            "applying migration outside a transaction"
        );
        self.pool.execute(script).await?;
        self.record(&self.pool, direction, migration).await
    }
}

impl VersionStore for SqlVersionStore {
    async fn ensure_schema(&self) -> Result<()> {
        let sql = self.create_table_sql();
        debug!(%sql, "ensuring bookkeeping table");
        self.pool.execute(sql.as_str()).await?;
        Ok(())
    }

    async fn list_applied(&self) -> Result<Vec<AppliedRecord>> {
        let rows = sqlx::query(&self.list_applied_sql())
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let version: i64 = row.try_get(0)?;
            let name: String = row.try_get(1)?;
            records.push(AppliedRecord { version, name });
        }
        Ok(records)
    }

    async fn current_version(&self) -> Result<i64> {
        let row = sqlx::query(&self.current_version_sql())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn apply(
        &self,
        use_tx: bool,
        direction: Direction,
        migration: &Migration,
        script: &str,
    ) -> Result<()> {
        let result = if use_tx {
            self.apply_in_transaction(direction, migration, script).await
        } else {
            self.apply_without_transaction(direction, migration, script).await
        };

        result.map_err(|source| MigrateError::MigrationExecution {
            version: migration.version,
            name: migration.name.clone(),
            direction,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store(config: &MigratorConfig) -> SqlVersionStore {
        install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect_lazy("sqlite::memory:")
            .unwrap();
        SqlVersionStore::new(pool, config).unwrap()
    }

    #[tokio::test]
    async fn test_record_sql_dollar_sign() {
        let store = store(&MigratorConfig::new(ParamType::DollarSign).with_schema("public")).await;
        assert_eq!(
            store.record_sql(Direction::Up),
            "INSERT INTO public.migration_version (version, name) VALUES ($1, $2)"
        );
        assert_eq!(
            store.record_sql(Direction::Down),
            "DELETE FROM public.migration_version WHERE version = $1 AND name = $2"
        );
    }

    #[tokio::test]
    async fn test_record_sql_question_mark() {
        let store = store(&MigratorConfig::new(ParamType::QuestionMark)).await;
        assert_eq!(
            store.record_sql(Direction::Up),
            "INSERT INTO migration_version (version, name) VALUES (?, ?)"
        );
        assert_eq!(
            store.record_sql(Direction::Down),
            "DELETE FROM migration_version WHERE version = ? AND name = ?"
        );
    }

    #[tokio::test]
    async fn test_bookkeeping_queries() {
        let store = store(&MigratorConfig::default().with_table("versions")).await;
        assert_eq!(
            store.create_table_sql(),
            "CREATE TABLE IF NOT EXISTS versions (version integer PRIMARY KEY NOT NULL, name text NOT NULL)"
        );
        assert_eq!(
            store.list_applied_sql(),
            "SELECT version, name FROM versions ORDER BY version ASC"
        );
        assert_eq!(
            store.current_version_sql(),
            "SELECT COALESCE(MAX(version), 0) FROM versions"
        );
    }

    #[tokio::test]
    async fn test_rejects_invalid_table() {
        install_default_drivers();
        let pool = AnyPoolOptions::new()
            .connect_lazy("sqlite::memory:")
            .unwrap();
        let err = SqlVersionStore::new(pool, &MigratorConfig::default().with_table("a b"))
            .unwrap_err();
        assert!(matches!(err, MigrateError::InvalidIdentifier { .. }));
    }
}
