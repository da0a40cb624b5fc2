use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ReminderError, ReminderResult};

/// 任务定义
///
/// 表示一条可重复提醒的任务，包含完整的重复规则配置。
/// 通过 [`Task::new`] 校验构造，构造成功后字段不再变更；
/// 校验失败时不会产生任何部分构造的对象。
///
/// # 字段说明
///
/// - `start_time`: 首次提醒时间，RFC 3339 格式，保留原始时区偏移
/// - `end_time`: 可选的结束时间，必须不早于开始时间
/// - `repeat_interval`: 原始的重复间隔文本，如 "20m"、"2h"
/// - `repeat_days`: 每周重复的星期列表，0=周日..6=周六，构造时升序排序
/// - `is_recurring`: 派生字段，任一重复机制配置后为 true
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: Option<DateTime<FixedOffset>>,
    pub repeat_interval: Option<String>,
    pub repeat_days: Vec<u8>,
    pub is_recurring: bool,
    /// 解析后的重复间隔，构造时从 repeat_interval 派生
    #[serde(skip)]
    interval: Option<Duration>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// 校验并创建新任务
    ///
    /// 所有时间参数以 RFC 3339 文本传入（如 `2025-07-20T10:38:23+07:00`），
    /// 重复间隔为紧凑时长文本（如 `20m`、`2h`）。任一校验失败返回
    /// [`ReminderError::InvalidInput`]，不产生部分构造的任务。
    pub fn new(
        name: &str,
        description: Option<&str>,
        start_time: &str,
        end_time: Option<&str>,
        repeat_interval: Option<&str>,
        repeat_days: &[i64],
    ) -> ReminderResult<Self> {
        if start_time.is_empty() {
            return Err(ReminderError::invalid_input("开始时间不能为空"));
        }

        let start = DateTime::parse_from_rfc3339(start_time)
            .map_err(|e| ReminderError::invalid_input(format!("开始时间格式无效: {e}")))?;

        let end = match end_time.filter(|s| !s.is_empty()) {
            Some(text) => Some(
                DateTime::parse_from_rfc3339(text)
                    .map_err(|e| ReminderError::invalid_input(format!("结束时间格式无效: {e}")))?,
            ),
            None => None,
        };

        let now = Utc::now();
        Self::build(
            0,
            name.to_string(),
            description.filter(|s| !s.is_empty()).map(str::to_string),
            start,
            end,
            repeat_interval
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            repeat_days.to_vec(),
            now,
            now,
        )
    }

    /// 从持久化字段重建任务
    ///
    /// 重新执行与 [`Task::new`] 相同的派生和校验，对合法数据幂等。
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: i64,
        name: String,
        description: Option<String>,
        start_time: DateTime<FixedOffset>,
        end_time: Option<DateTime<FixedOffset>>,
        repeat_interval: Option<String>,
        repeat_days: Vec<u8>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> ReminderResult<Self> {
        Self::build(
            id,
            name,
            description,
            start_time,
            end_time,
            repeat_interval,
            repeat_days.into_iter().map(i64::from).collect(),
            created_at,
            updated_at,
        )
    }

    /// 解析后的重复间隔
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        id: i64,
        name: String,
        description: Option<String>,
        start_time: DateTime<FixedOffset>,
        end_time: Option<DateTime<FixedOffset>>,
        repeat_interval: Option<String>,
        repeat_days: Vec<i64>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> ReminderResult<Self> {
        if name.is_empty() {
            return Err(ReminderError::invalid_input("任务名称不能为空"));
        }

        if let Some(end) = end_time {
            if start_time > end {
                return Err(ReminderError::invalid_input(
                    "任务开始时间不能晚于结束时间",
                ));
            }
        }

        let mut interval = None;
        let mut is_recurring = false;

        if let Some(text) = repeat_interval.as_deref() {
            let parsed = parse_interval(text)?;
            // 首次重复必须落在结束时间之内
            if let Some(end) = end_time {
                if start_time + parsed > end {
                    return Err(ReminderError::invalid_input("重复间隔不能超出结束时间"));
                }
            }
            interval = Some(parsed);
            is_recurring = true;
        }

        let mut days = Vec::with_capacity(repeat_days.len());
        for &day in &repeat_days {
            if !(0..=6).contains(&day) {
                return Err(ReminderError::invalid_input(format!(
                    "无效的星期值: {day}，必须在 0(周日) 到 6(周六) 之间"
                )));
            }
            days.push(day as u8);
        }
        if !days.is_empty() {
            days.sort_unstable();
            is_recurring = true;
        }

        Ok(Self {
            id,
            name,
            description,
            start_time,
            end_time,
            repeat_interval,
            repeat_days: days,
            is_recurring,
            interval,
            created_at,
            updated_at,
        })
    }
}

/// 解析紧凑时长文本（如 "20m"、"2h"），必须严格为正
fn parse_interval(text: &str) -> ReminderResult<Duration> {
    let parsed = humantime::parse_duration(text)
        .map_err(|e| ReminderError::invalid_input(format!("重复间隔格式无效: {e}")))?;

    if parsed.is_zero() {
        return Err(ReminderError::invalid_input("重复间隔必须大于 0"));
    }

    Duration::from_std(parsed)
        .map_err(|_| ReminderError::invalid_input("重复间隔超出可表示范围"))
}
