use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::models::{Schedule, Task};
use crate::traits::{ScheduleRepository, TaskRepository};
use crate::{ReminderError, ReminderResult};

/// 任务创建参数
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskParams {
    pub name: String,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub repeat_interval: Option<String>,
    #[serde(default)]
    pub repeat_days: Vec<i64>,
}

/// 任务更新参数，未提供的字段保持原值
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub repeat_interval: Option<String>,
    pub repeat_days: Option<Vec<i64>>,
}

/// 任务管理服务
///
/// 创建任务时同时生成首条提醒计划：首次提醒即任务开始时间，
/// 后续提醒由执行器通过重复规则推进。
pub struct TaskService {
    task_repo: Arc<dyn TaskRepository>,
    schedule_repo: Arc<dyn ScheduleRepository>,
}

impl TaskService {
    pub fn new(task_repo: Arc<dyn TaskRepository>, schedule_repo: Arc<dyn ScheduleRepository>) -> Self {
        Self {
            task_repo,
            schedule_repo,
        }
    }

    #[instrument(skip(self, params), fields(task_name = %params.name))]
    pub async fn create_task(&self, params: CreateTaskParams) -> ReminderResult<Task> {
        let task = Task::new(
            &params.name,
            params.description.as_deref(),
            &params.start_time,
            params.end_time.as_deref(),
            params.repeat_interval.as_deref(),
            &params.repeat_days,
        )?;

        let task = self.task_repo.create(&task).await?;
        self.schedule_repo
            .create(&Schedule::new(task.id, task.start_time))
            .await?;

        info!("创建任务成功: {} (ID: {})", task.name, task.id);
        Ok(task)
    }

    pub async fn get_task(&self, id: i64) -> ReminderResult<Task> {
        self.task_repo
            .get_by_id(id)
            .await?
            .ok_or(ReminderError::TaskNotFound { id })
    }

    pub async fn list_tasks(&self) -> ReminderResult<Vec<Task>> {
        self.task_repo.list().await
    }

    /// 更新任务
    ///
    /// 合并后的字段整体重新校验，校验失败时任务保持原样。
    #[instrument(skip(self, params), fields(task_id = %id))]
    pub async fn update_task(&self, id: i64, params: UpdateTaskParams) -> ReminderResult<Task> {
        let current = self.get_task(id).await?;

        let name = params.name.unwrap_or(current.name);
        let description = params.description.or(current.description);
        let start_time = params
            .start_time
            .unwrap_or_else(|| current.start_time.to_rfc3339());
        let end_time = params
            .end_time
            .or_else(|| current.end_time.map(|t| t.to_rfc3339()));
        let repeat_interval = params.repeat_interval.or(current.repeat_interval);
        let repeat_days: Vec<i64> = params
            .repeat_days
            .unwrap_or_else(|| current.repeat_days.iter().map(|&d| i64::from(d)).collect());

        let validated = Task::new(
            &name,
            description.as_deref(),
            &start_time,
            end_time.as_deref(),
            repeat_interval.as_deref(),
            &repeat_days,
        )?;
        let task = Task::restore(
            id,
            validated.name,
            validated.description,
            validated.start_time,
            validated.end_time,
            validated.repeat_interval,
            validated.repeat_days,
            current.created_at,
            Utc::now(),
        )?;

        self.task_repo.update(&task).await?;
        info!("更新任务成功: {} (ID: {})", task.name, task.id);
        Ok(task)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: i64) -> ReminderResult<()> {
        self.task_repo.delete(id).await
    }

    /// 查询任务的全部提醒计划
    pub async fn list_schedules(&self, task_id: i64) -> ReminderResult<Vec<Schedule>> {
        // 先确认任务存在，区分"无计划"和"任务不存在"
        self.get_task(task_id).await?;
        self.schedule_repo.get_by_task_id(task_id).await
    }
}
