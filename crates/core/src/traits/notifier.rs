use async_trait::async_trait;

use crate::models::{Schedule, Task};
use crate::ReminderResult;

/// 通知发送接口
///
/// 执行器将提醒计划推进到 Sending 后调用一次，调用结果决定
/// Succeeded / Failed 流转。实现自身不做重试。
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, task: &Task, schedule: &Schedule) -> ReminderResult<()>;
}
