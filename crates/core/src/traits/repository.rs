//! 数据仓储层接口定义
//!
//! 任务与提醒计划的持久化抽象。所有操作异步，返回统一的
//! `ReminderResult<T>`，实现必须 `Send + Sync` 以支持并发访问。
//! 接口与具体实现分离，当前提供 SQLite 实现，测试中使用内存实现。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Schedule, ScheduleStatus, Task};
use crate::ReminderResult;

/// 任务仓储接口
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 持久化新任务，返回包含数据库生成ID的任务
    async fn create(&self, task: &Task) -> ReminderResult<Task>;

    /// 根据ID查询任务，不存在时返回 `None`
    async fn get_by_id(&self, id: i64) -> ReminderResult<Option<Task>>;

    /// 按创建时间倒序返回所有任务
    async fn list(&self) -> ReminderResult<Vec<Task>>;

    /// 更新任务，任务不存在时返回 `TaskNotFound`
    async fn update(&self, task: &Task) -> ReminderResult<()>;

    /// 删除任务，任务不存在时返回 `TaskNotFound`
    async fn delete(&self, id: i64) -> ReminderResult<()>;
}

/// 提醒计划仓储接口
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// 持久化新提醒计划，返回包含数据库生成ID的记录
    async fn create(&self, schedule: &Schedule) -> ReminderResult<Schedule>;

    /// 根据ID查询提醒计划，不存在时返回 `None`
    async fn get_by_id(&self, id: i64) -> ReminderResult<Option<Schedule>>;

    /// 查询任务的全部提醒计划，按提醒时间排序
    async fn get_by_task_id(&self, task_id: i64) -> ReminderResult<Vec<Schedule>>;

    /// 查询到期且仍处于 Created 状态的提醒计划
    async fn get_due(
        &self,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> ReminderResult<Vec<Schedule>>;

    /// 以比较并交换的方式推进状态
    ///
    /// 仅当记录当前状态等于 `from` 时更新为 `to`，保证同一记录
    /// 同一时刻至多一个执行者完成流转。状态不匹配时返回
    /// `InvalidState`，记录不存在时返回 `ScheduleNotFound`，
    /// 两种情况下记录均保持不变。
    async fn update_status(
        &self,
        id: i64,
        from: ScheduleStatus,
        to: ScheduleStatus,
        done_at: Option<DateTime<Utc>>,
    ) -> ReminderResult<()>;
}
