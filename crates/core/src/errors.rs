use thiserror::Error;

use crate::models::ScheduleStatus;

/// 调度器统一错误类型
#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),

    #[error("任务未找到: {id}")]
    TaskNotFound { id: i64 },

    #[error("提醒计划未找到: {id}")]
    ScheduleNotFound { id: i64 },

    #[error("无效的输入: {0}")]
    InvalidInput(String),

    #[error("非法的状态流转: {from} -> {to}")]
    InvalidState {
        from: ScheduleStatus,
        to: ScheduleStatus,
    },

    #[error("通知发送失败: {0}")]
    Notification(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type ReminderResult<T> = std::result::Result<T, ReminderError>;

impl ReminderError {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn task_not_found(id: i64) -> Self {
        Self::TaskNotFound { id }
    }

    pub fn schedule_not_found(id: i64) -> Self {
        Self::ScheduleNotFound { id }
    }

    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }

    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}
