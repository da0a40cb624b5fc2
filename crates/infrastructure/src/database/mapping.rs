//! 行映射辅助函数
//!
//! 任务和提醒计划中与用户相关的时间戳以 RFC 3339 文本落库，
//! 读取时在这里解析并保留原始时区偏移。

use chrono::{DateTime, FixedOffset};

use reminder_core::{ReminderError, ReminderResult};

pub fn parse_timestamp(column: &str, value: &str) -> ReminderResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| ReminderError::database_error(format!("列 {column} 的时间戳无效: {e}")))
}

pub fn parse_optional_timestamp(
    column: &str,
    value: Option<&str>,
) -> ReminderResult<Option<DateTime<FixedOffset>>> {
    value.map(|text| parse_timestamp(column, text)).transpose()
}

/// 解析存储为JSON数组的星期列表
pub fn parse_weekdays(column: &str, value: &str) -> ReminderResult<Vec<u8>> {
    serde_json::from_str(value)
        .map_err(|e| ReminderError::database_error(format!("列 {column} 的星期列表无效: {e}")))
}
