//! Helper functions could be used in api/, front/, webhook/ and the scripts

use crate::{config::AppConfig, repo};
use anyhow::Context;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use std::str::FromStr;

/// Builds the pool for `db_host`. Connections are opened lazily so the
/// server can start while the database is unreachable.
pub fn setup_sqlite_db_pool(app_config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let db_host = app_config
        .db_host
        .as_deref()
        .context("DB_HOST is not set")?;

    let options = SqliteConnectOptions::from_str(db_host)?
        .create_if_missing(true)
        .pragma("foreign_keys", "ON");

    if app_config.is_prod() {
        let db_pass = app_config
            .db_pass_encrypt
            .as_deref()
            .context("DB_PASS_ENCRYPT is not set")?;

        return Ok(SqlitePool::connect_lazy_with(
            options
                .pragma("key", db_pass.to_string())
                .pragma("cipher_page_size", "1024")
                .pragma("kdf_iter", "64000")
                .pragma("cipher_hmac_algorithm", "HMAC_SHA1")
                .pragma("cipher_kdf_algorithm", "PBKDF2_HMAC_SHA1")
                .journal_mode(SqliteJournalMode::Delete),
        ));
    }

    Ok(SqlitePool::connect_lazy_with(options))
}

/// Repository for the configured backing store, or one that fails every
/// call when the storage variables are missing.
pub fn build_repo(app_config: &AppConfig) -> anyhow::Result<repo::RepoHandle> {
    let missing_vars = app_config.missing_storage_vars();
    if !missing_vars.is_empty() {
        logfire::error!(
            "storage is not configured, missing: {missing}",
            missing = missing_vars.join(", ")
        );
        return Ok(repo::RepoHandle::Unconfigured(
            repo::unconfigured::UnconfiguredRepo { missing_vars },
        ));
    }

    Ok(repo::RepoHandle::Sqlite(repo::sqlite::SqlxSqliteRepo {
        db_pool: setup_sqlite_db_pool(app_config)?,
    }))
}

/// Runs every statement of `sql` against the pool
pub async fn run_migrations(db_pool: &SqlitePool, sql: &str) -> anyhow::Result<()> {
    sqlx::raw_sql(sql).execute(db_pool).await?;
    Ok(())
}
