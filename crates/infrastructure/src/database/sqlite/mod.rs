pub mod sqlite_schedule_repository;
pub mod sqlite_task_repository;

pub use sqlite_schedule_repository::SqliteScheduleRepository;
pub use sqlite_task_repository::SqliteTaskRepository;

use sqlx::SqlitePool;
use tracing::debug;

use reminder_core::ReminderResult;

/// 运行数据库迁移
///
/// schedules 对 tasks 是弱引用：不建外键，提醒计划可以在任务
/// 删除后继续存在和查询。
pub async fn run_migrations(pool: &SqlitePool) -> ReminderResult<()> {
    debug!("运行SQLite数据库迁移");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            start_time TEXT NOT NULL,
            end_time TEXT,
            repeat_interval TEXT,
            repeat_days TEXT NOT NULL DEFAULT '[]',
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'CREATED',
            notify_at TEXT NOT NULL,
            notify_at_utc TEXT NOT NULL,
            done_at DATETIME,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_tasks_name ON tasks(name)",
        "CREATE INDEX IF NOT EXISTS idx_schedules_task_id ON schedules(task_id)",
        "CREATE INDEX IF NOT EXISTS idx_schedules_status ON schedules(status)",
        "CREATE INDEX IF NOT EXISTS idx_schedules_notify_at_utc ON schedules(notify_at_utc)",
    ];
    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    debug!("SQLite数据库迁移完成");
    Ok(())
}
