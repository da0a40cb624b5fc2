use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ReminderError, ReminderResult};

/// 提醒计划
///
/// 任务的一次具体提醒，记录该次提醒的投递生命周期。
/// `task_id` 是对任务的弱引用，提醒计划可以独立于任务查询和存续。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub task_id: i64,
    pub status: ScheduleStatus,
    /// 计划提醒时间，保留任务原始时区偏移
    pub notify_at: DateTime<FixedOffset>,
    /// 进入终态的时间，未结束前为空
    pub done_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 提醒计划状态
///
/// 状态机: `Created → Sending → {Succeeded, Failed}`，
/// `Created → Canceled`。三个终态不再流转。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScheduleStatus {
    #[serde(rename = "CREATED")]
    Created,
    #[serde(rename = "SENDING")]
    Sending,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "SUCCEEDED")]
    Succeeded,
    #[serde(rename = "CANCELED")]
    Canceled,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Created => "CREATED",
            ScheduleStatus::Sending => "SENDING",
            ScheduleStatus::Failed => "FAILED",
            ScheduleStatus::Succeeded => "SUCCEEDED",
            ScheduleStatus::Canceled => "CANCELED",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScheduleStatus::Failed | ScheduleStatus::Succeeded | ScheduleStatus::Canceled
        )
    }

    /// 状态机中允许的流转
    pub fn can_transition_to(&self, next: ScheduleStatus) -> bool {
        matches!(
            (*self, next),
            (ScheduleStatus::Created, ScheduleStatus::Sending)
                | (ScheduleStatus::Created, ScheduleStatus::Canceled)
                | (ScheduleStatus::Sending, ScheduleStatus::Succeeded)
                | (ScheduleStatus::Sending, ScheduleStatus::Failed)
        )
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl sqlx::Type<sqlx::Sqlite> for ScheduleStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for ScheduleStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "CREATED" => Ok(ScheduleStatus::Created),
            "SENDING" => Ok(ScheduleStatus::Sending),
            "FAILED" => Ok(ScheduleStatus::Failed),
            "SUCCEEDED" => Ok(ScheduleStatus::Succeeded),
            "CANCELED" => Ok(ScheduleStatus::Canceled),
            _ => Err(format!("Invalid schedule status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for ScheduleStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

impl Schedule {
    /// 为计算出的提醒时间创建新的提醒计划，初始状态为 Created
    pub fn new(task_id: i64, notify_at: DateTime<FixedOffset>) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // 由数据库生成
            task_id,
            status: ScheduleStatus::Created,
            notify_at,
            done_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// 推进状态机
    ///
    /// 非法流转返回 [`ReminderError::InvalidState`]，记录保持不变；
    /// 进入终态时记录 `done_at`。
    pub fn transition_to(&mut self, next: ScheduleStatus) -> ReminderResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(ReminderError::InvalidState {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = Utc::now();
        if next.is_terminal() && self.done_at.is_none() {
            self.done_at = Some(self.updated_at);
        }
        Ok(())
    }
}
