use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use reminder_core::models::{Schedule, ScheduleStatus};
use reminder_core::traits::ScheduleRepository;
use reminder_core::{ReminderError, ReminderResult};

use crate::database::mapping;

const SCHEDULE_COLUMNS: &str =
    "id, task_id, status, notify_at, done_at, created_at, updated_at";

pub struct SqliteScheduleRepository {
    pool: SqlitePool,
}

impl SqliteScheduleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_schedule(row: &sqlx::sqlite::SqliteRow) -> ReminderResult<Schedule> {
        let notify_at: String = row.try_get("notify_at")?;

        Ok(Schedule {
            id: row.try_get("id")?,
            task_id: row.try_get("task_id")?,
            status: row.try_get("status")?,
            notify_at: mapping::parse_timestamp("notify_at", &notify_at)?,
            done_at: row.try_get("done_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// 归一化到UTC的定宽文本，保证到期查询按字典序即按时间序
    fn to_utc_text(timestamp: DateTime<Utc>) -> String {
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepository {
    #[instrument(skip(self, schedule), fields(task_id = %schedule.task_id))]
    async fn create(&self, schedule: &Schedule) -> ReminderResult<Schedule> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO schedules (task_id, status, notify_at, notify_at_utc)
            VALUES ($1, $2, $3, $4)
            RETURNING {SCHEDULE_COLUMNS}
            "#,
        ))
        .bind(schedule.task_id)
        .bind(schedule.status)
        .bind(schedule.notify_at.to_rfc3339())
        .bind(Self::to_utc_text(schedule.notify_at.with_timezone(&Utc)))
        .fetch_one(&self.pool)
        .await?;

        let created = Self::row_to_schedule(&row)?;
        debug!(
            "创建提醒计划成功: ID {}, 任务 {}, 提醒时间 {}",
            created.id, created.task_id, created.notify_at
        );
        Ok(created)
    }

    #[instrument(skip(self), fields(schedule_id = %id))]
    async fn get_by_id(&self, id: i64) -> ReminderResult<Option<Schedule>> {
        let row = sqlx::query(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_schedule).transpose()
    }

    async fn get_by_task_id(&self, task_id: i64) -> ReminderResult<Vec<Schedule>> {
        let rows = sqlx::query(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE task_id = $1 ORDER BY notify_at_utc ASC, id ASC"
        ))
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_schedule).collect()
    }

    async fn get_due(
        &self,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> ReminderResult<Vec<Schedule>> {
        // LIMIT -1 在SQLite中表示不限制
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SCHEDULE_COLUMNS} FROM schedules
            WHERE status = $1 AND notify_at_utc <= $2
            ORDER BY notify_at_utc ASC, id ASC
            LIMIT $3
            "#,
        ))
        .bind(ScheduleStatus::Created)
        .bind(Self::to_utc_text(now))
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_schedule).collect()
    }

    #[instrument(skip(self), fields(schedule_id = %id, from = %from, to = %to))]
    async fn update_status(
        &self,
        id: i64,
        from: ScheduleStatus,
        to: ScheduleStatus,
        done_at: Option<DateTime<Utc>>,
    ) -> ReminderResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE schedules
            SET status = $3, done_at = COALESCE($4, done_at), updated_at = datetime('now')
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(done_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // 区分记录不存在与状态不匹配，两种情况下记录都未被改动
            return match self.get_by_id(id).await? {
                None => Err(ReminderError::schedule_not_found(id)),
                Some(current) => Err(ReminderError::InvalidState {
                    from: current.status,
                    to,
                }),
            };
        }

        debug!("提醒计划 {id} 状态流转: {from} -> {to}");
        Ok(())
    }
}
