pub mod mapping;
pub mod sqlite;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use reminder_core::config::DatabaseConfig;
use reminder_core::ReminderResult;

/// 创建SQLite连接池，数据库文件不存在时自动创建
pub async fn create_pool(config: &DatabaseConfig) -> ReminderResult<SqlitePool> {
    debug!("连接数据库: {}", config.url);

    let connect_options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .connect_with(connect_options)
        .await?;

    Ok(pool)
}
