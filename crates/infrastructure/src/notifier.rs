use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use reminder_core::config::NotifierConfig;
use reminder_core::models::{Schedule, Task};
use reminder_core::traits::Notifier;
use reminder_core::{ReminderError, ReminderResult};

/// Webhook通知器
///
/// 将提醒内容以JSON POST到配置的回调地址，非2xx响应视为投递失败。
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> ReminderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReminderError::Notification(format!("创建HTTP客户端失败: {e}")))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, task: &Task, schedule: &Schedule) -> ReminderResult<()> {
        let payload = json!({
            "task_id": task.id,
            "task_name": task.name,
            "description": task.description,
            "schedule_id": schedule.id,
            "notify_at": schedule.notify_at.to_rfc3339(),
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ReminderError::Notification(format!("请求回调地址失败: {e}")))?;

        if !response.status().is_success() {
            return Err(ReminderError::Notification(format!(
                "回调地址返回 {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// 未配置回调地址时的替代实现，仅记录日志
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, task: &Task, schedule: &Schedule) -> ReminderResult<()> {
        info!(
            "提醒任务 {} ({}): 计划时间 {}",
            task.id,
            task.name,
            schedule.notify_at.to_rfc3339()
        );
        Ok(())
    }
}

/// 按配置选择通知器实现
pub fn build_notifier(config: &NotifierConfig) -> ReminderResult<Arc<dyn Notifier>> {
    match &config.webhook_url {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(
            url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}
