use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};

use crate::models::{Schedule, ScheduleStatus};
use crate::traits::{Notifier, ScheduleRepository, TaskRepository};
use crate::{ReminderError, ReminderResult};

/// 单次投递批量上限
const DEFAULT_BATCH_SIZE: i64 = 100;

/// 提醒投递服务
///
/// 由外部显式触发，对到期的提醒计划各执行一次投递尝试并推进状态机，
/// 随后按重复规则生成下一条提醒计划。本服务不含定时循环，也不重试：
/// 失败的投递如需重试，由外部策略生成新的提醒计划。
pub struct NotifyService {
    task_repo: Arc<dyn TaskRepository>,
    schedule_repo: Arc<dyn ScheduleRepository>,
    notifier: Arc<dyn Notifier>,
}

impl NotifyService {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        schedule_repo: Arc<dyn ScheduleRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            task_repo,
            schedule_repo,
            notifier,
        }
    }

    /// 处理当前所有到期的提醒计划，返回完成投递尝试的数量
    #[instrument(skip(self))]
    pub async fn run_due(&self, now: DateTime<Utc>) -> ReminderResult<usize> {
        let due = self
            .schedule_repo
            .get_due(now, Some(DEFAULT_BATCH_SIZE))
            .await?;

        let mut attempted = 0;
        for schedule in due {
            match self.deliver(&schedule).await {
                Ok(()) => attempted += 1,
                // 已被其他执行者接手的记录直接跳过
                Err(ReminderError::InvalidState { .. }) => continue,
                Err(e) => error!("提醒计划 {} 投递处理失败: {e}", schedule.id),
            }
        }

        if attempted > 0 {
            info!("本轮完成 {attempted} 次投递尝试");
        }
        Ok(attempted)
    }

    /// 对单条提醒计划执行一次投递
    async fn deliver(&self, schedule: &Schedule) -> ReminderResult<()> {
        self.schedule_repo
            .update_status(
                schedule.id,
                ScheduleStatus::Created,
                ScheduleStatus::Sending,
                None,
            )
            .await?;

        let task = match self.task_repo.get_by_id(schedule.task_id).await? {
            Some(task) => task,
            None => {
                // 任务已被删除，按失败落账，避免记录停留在 Sending
                self.schedule_repo
                    .update_status(
                        schedule.id,
                        ScheduleStatus::Sending,
                        ScheduleStatus::Failed,
                        Some(Utc::now()),
                    )
                    .await?;
                return Err(ReminderError::task_not_found(schedule.task_id));
            }
        };

        let status = match self.notifier.notify(&task, schedule).await {
            Ok(()) => ScheduleStatus::Succeeded,
            Err(e) => {
                warn!("任务 {} 的提醒 {} 通知失败: {e}", task.id, schedule.id);
                ScheduleStatus::Failed
            }
        };
        self.schedule_repo
            .update_status(schedule.id, ScheduleStatus::Sending, status, Some(Utc::now()))
            .await?;

        // 以本次提醒时间为基准推进重复规则，生成下一条提醒计划
        if let Some(next) = task.next_run_at(Some(schedule.notify_at)) {
            self.schedule_repo
                .create(&Schedule::new(task.id, next))
                .await?;
        }
        Ok(())
    }

    /// 取消尚未开始投递的提醒计划
    #[instrument(skip(self), fields(schedule_id = %id))]
    pub async fn cancel(&self, id: i64) -> ReminderResult<()> {
        self.schedule_repo
            .update_status(
                id,
                ScheduleStatus::Created,
                ScheduleStatus::Canceled,
                Some(Utc::now()),
            )
            .await
    }

    pub async fn get_schedule(&self, id: i64) -> ReminderResult<Schedule> {
        self.schedule_repo
            .get_by_id(id)
            .await?
            .ok_or(ReminderError::ScheduleNotFound { id })
    }
}
