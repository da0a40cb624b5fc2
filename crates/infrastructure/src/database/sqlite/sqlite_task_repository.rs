use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use reminder_core::models::Task;
use reminder_core::traits::TaskRepository;
use reminder_core::{ReminderError, ReminderResult};

use crate::database::mapping;

const TASK_COLUMNS: &str =
    "id, name, description, start_time, end_time, repeat_interval, repeat_days, created_at, updated_at";

pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> ReminderResult<Task> {
        let start_time: String = row.try_get("start_time")?;
        let end_time: Option<String> = row.try_get("end_time")?;
        let repeat_days: String = row.try_get("repeat_days")?;

        Task::restore(
            row.try_get("id")?,
            row.try_get("name")?,
            row.try_get("description")?,
            mapping::parse_timestamp("start_time", &start_time)?,
            mapping::parse_optional_timestamp("end_time", end_time.as_deref())?,
            row.try_get("repeat_interval")?,
            mapping::parse_weekdays("repeat_days", &repeat_days)?,
            row.try_get("created_at")?,
            row.try_get("updated_at")?,
        )
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    #[instrument(skip(self, task), fields(task_name = %task.name))]
    async fn create(&self, task: &Task) -> ReminderResult<Task> {
        let repeat_days_json = serde_json::to_string(&task.repeat_days)
            .map_err(|e| ReminderError::Internal(format!("序列化星期列表失败: {e}")))?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO tasks (name, description, start_time, end_time, repeat_interval, repeat_days)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.start_time.to_rfc3339())
        .bind(task.end_time.map(|t| t.to_rfc3339()))
        .bind(&task.repeat_interval)
        .bind(repeat_days_json)
        .fetch_one(&self.pool)
        .await?;

        let created = Self::row_to_task(&row)?;
        debug!("创建任务成功: ID {}, 名称: {}", created.id, created.name);
        Ok(created)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn get_by_id(&self, id: i64) -> ReminderResult<Option<Task>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_task).transpose()
    }

    async fn list(&self) -> ReminderResult<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let tasks: ReminderResult<Vec<Task>> = rows.iter().map(Self::row_to_task).collect();
        let tasks = tasks?;
        debug!("查询任务列表成功，返回 {} 个任务", tasks.len());
        Ok(tasks)
    }

    #[instrument(skip(self, task), fields(task_id = %task.id, task_name = %task.name))]
    async fn update(&self, task: &Task) -> ReminderResult<()> {
        let repeat_days_json = serde_json::to_string(&task.repeat_days)
            .map_err(|e| ReminderError::Internal(format!("序列化星期列表失败: {e}")))?;

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET name = $2, description = $3, start_time = $4, end_time = $5,
                repeat_interval = $6, repeat_days = $7, updated_at = datetime('now')
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.start_time.to_rfc3339())
        .bind(task.end_time.map(|t| t.to_rfc3339()))
        .bind(&task.repeat_interval)
        .bind(repeat_days_json)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ReminderError::task_not_found(task.id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn delete(&self, id: i64) -> ReminderResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ReminderError::task_not_found(id));
        }
        debug!("删除任务成功: ID {id}");
        Ok(())
    }
}
